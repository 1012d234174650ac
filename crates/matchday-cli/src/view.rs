// Plain-text rendering of league views for the terminal.

use std::fmt::Write;

use chrono::NaiveDateTime;

use matchday_core::league::{LeagueState, Match};
use matchday_core::standings::StandingsRow;

const NAME_WIDTH: usize = 22;

fn date(dt: &NaiveDateTime) -> String {
    dt.format("%d.%m.%Y").to_string()
}

fn date_time(dt: &NaiveDateTime) -> String {
    dt.format("%d.%m.%Y %H:%M").to_string()
}

/// The standings table with a header row. Rank is the row position.
pub fn standings_table(rows: &[StandingsRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<w$} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts",
        w = NAME_WIDTH
    );
    for (idx, r) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<w$} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+4} {:>4}",
            idx + 1,
            r.name,
            r.played,
            r.won,
            r.drawn,
            r.lost,
            r.goals_for,
            r.goals_against,
            r.goal_diff,
            r.points,
            w = NAME_WIDTH
        );
    }
    if rows.is_empty() {
        out.push_str("  No teams registered.\n");
    }
    out
}

/// Scheduled matches, earliest first.
pub fn fixtures(state: &LeagueState) -> String {
    let upcoming = state.upcoming();
    if upcoming.is_empty() {
        return "No scheduled matches.\n".to_string();
    }
    let mut out = String::new();
    for m in upcoming {
        let _ = writeln!(
            out,
            "[{}] {}  {} vs {}",
            m.id,
            date_time(&m.scheduled_at),
            state.team_name(&m.home_team_id),
            state.team_name(&m.away_team_id)
        );
    }
    out
}

/// Finished matches, most recent first.
pub fn results(state: &LeagueState) -> String {
    let played = state.played();
    if played.is_empty() {
        return "No finished matches yet.\n".to_string();
    }
    let mut out = String::new();
    for m in played {
        let _ = writeln!(
            out,
            "[{}] {}  {} {} : {} {}",
            m.id,
            date(&m.scheduled_at),
            state.team_name(&m.home_team_id),
            m.home_goals,
            m.away_goals,
            state.team_name(&m.away_team_id)
        );
    }
    out
}

/// Registered teams in insertion order. Admins also see which teams are
/// locked by existing matches.
pub fn teams(state: &LeagueState, show_usage: bool) -> String {
    let teams = state.list_teams();
    if teams.is_empty() {
        return "No teams registered.\n".to_string();
    }
    let mut out = String::new();
    for t in teams {
        let _ = write!(out, "[{}] {} ({})", t.id, t.name, t.short_code);
        if show_usage && state.team_in_use(&t.id) {
            out.push_str("  - has matches, cannot be removed");
        }
        out.push('\n');
    }
    out
}

/// Scoreboard for the match being followed live.
pub fn live(state: &LeagueState, m: &Match, admin: bool) -> String {
    let home = state.team_name(&m.home_team_id);
    let away = state.team_name(&m.away_team_id);
    let mut out = String::new();
    let _ = writeln!(out, "Live [{}] {}", m.id, date_time(&m.scheduled_at));
    let _ = writeln!(out, "  {:<w$}  {:^9}  {}", "Home", "", "Away", w = NAME_WIDTH);
    let _ = writeln!(
        out,
        "  {:<w$}  {:^9}  {}",
        home,
        format!("{} : {}", m.home_goals, m.away_goals),
        away,
        w = NAME_WIDTH
    );
    if !admin {
        out.push_str("Log in as admin to control the live score.\n");
    }
    out
}
