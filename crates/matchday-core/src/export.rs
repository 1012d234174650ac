// CSV export of the standings table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::standings::StandingsRow;

/// One CSV record. Field order is the column order.
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    rank: usize,
    team: &'a str,
    short: &'a str,
    played: u32,
    won: u32,
    drawn: u32,
    lost: u32,
    goals_for: u64,
    goals_against: u64,
    goal_diff: i64,
    points: u32,
}

/// Write `rows` as CSV with a header line. Rank is the 1-based row position.
pub fn write_standings_csv<W: Write>(rows: &[StandingsRow], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (idx, row) in rows.iter().enumerate() {
        wtr.serialize(CsvRecord {
            rank: idx + 1,
            team: &row.name,
            short: &row.short_code,
            played: row.played,
            won: row.won,
            drawn: row.drawn,
            lost: row.lost,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_diff: row.goal_diff,
            points: row.points,
        })
        .context("failed to write standings row")?;
    }
    wtr.flush().context("failed to flush standings CSV")?;
    Ok(())
}

/// Write the standings table to a CSV file at `path`, replacing it.
pub fn export_standings_csv(rows: &[StandingsRow], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_standings_csv(rows, file)
}
