// Standings table: per-team aggregates derived from finished matches.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::league::{Match, Team, TeamId};

/// Points awarded for a win.
pub const WIN_POINTS: u32 = 3;
/// Points awarded to each side for a draw.
pub const DRAW_POINTS: u32 = 1;

/// One team's line in the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsRow {
    pub team_id: TeamId,
    pub name: String,
    pub short_code: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u64,
    pub goals_against: u64,
    pub goal_diff: i64,
    pub points: u32,
}

impl StandingsRow {
    fn new(team: &Team) -> Self {
        StandingsRow {
            team_id: team.id.clone(),
            name: team.name.clone(),
            short_code: team.short_code.clone(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_diff: 0,
            points: 0,
        }
    }

    /// Fold one finished result into this row from the team's own
    /// perspective.
    /// Totals saturate rather than wrap.
    fn record(&mut self, scored: u32, conceded: u32) {
        self.played = self.played.saturating_add(1);
        self.goals_for = self.goals_for.saturating_add(u64::from(scored));
        self.goals_against = self.goals_against.saturating_add(u64::from(conceded));
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won = self.won.saturating_add(1);
                self.points = self.points.saturating_add(WIN_POINTS);
            }
            Ordering::Less => self.lost = self.lost.saturating_add(1),
            Ordering::Equal => {
                self.drawn = self.drawn.saturating_add(1);
                self.points = self.points.saturating_add(DRAW_POINTS);
            }
        }
    }
}

/// Build the standings table from the league's teams and matches.
///
/// Only finished matches count. Rows are ordered by points, goal difference
/// and goals scored (all descending), then by name. Teams still level keep
/// the order they were registered in, so the order is total and repeatable.
pub fn compute_standings(teams: &[Team], matches: &[Match]) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = teams.iter().map(StandingsRow::new).collect();
    let index: HashMap<&TeamId, usize> = teams
        .iter()
        .enumerate()
        .map(|(i, t)| (&t.id, i))
        .collect();

    for m in matches.iter().filter(|m| m.is_finished()) {
        let (Some(&home), Some(&away)) = (index.get(&m.home_team_id), index.get(&m.away_team_id))
        else {
            warn!(
                "Skipping match {} in standings: unknown team ({} vs {})",
                m.id, m.home_team_id, m.away_team_id
            );
            continue;
        };
        rows[home].record(m.home_goals, m.away_goals);
        rows[away].record(m.away_goals, m.home_goals);
    }

    for row in &mut rows {
        row.goal_diff = to_i64(row.goals_for).saturating_sub(to_i64(row.goals_against));
    }

    // Stable sort: rows start in registration order, which breaks any tie
    // left after the name.
    rows.sort_by(compare_rows);
    rows
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn compare_rows(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_diff.cmp(&a.goal_diff))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::fixture::parse_local_datetime;
    use crate::league::{LeagueState, MatchId};

    fn play(state: &mut LeagueState, home: &TeamId, away: &TeamId, hg: i64, ag: i64) -> MatchId {
        let at = parse_local_datetime("2025-06-01T10:00").unwrap();
        let id = state.schedule_match(home, away, at).unwrap().id;
        state.set_score(&id, hg, ag).unwrap();
        state.finish(&id).unwrap();
        id
    }

    fn names(rows: &[StandingsRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn no_matches_orders_by_name() {
        let mut state = LeagueState::new();
        state.add_team("C", "").unwrap();
        state.add_team("A", "").unwrap();
        state.add_team("B", "").unwrap();

        let rows = state.standings();
        assert_eq!(names(&rows), vec!["A", "B", "C"]);
        assert!(rows.iter().all(|r| r.played == 0 && r.points == 0 && r.goal_diff == 0));
    }

    #[test]
    fn single_result_ranks_winner_first() {
        let mut state = LeagueState::new();
        let a = state.add_team("A", "").unwrap().id;
        let b = state.add_team("B", "").unwrap().id;
        state.add_team("C", "").unwrap();
        play(&mut state, &a, &b, 3, 1);

        let rows = state.standings();
        assert_eq!(names(&rows), vec!["A", "C", "B"]);

        let winner = &rows[0];
        assert_eq!(
            (winner.played, winner.won, winner.points, winner.goal_diff),
            (1, 1, 3, 2)
        );
        assert_eq!((winner.goals_for, winner.goals_against), (3, 1));

        // C (0 pts, GD 0) sits above B (0 pts, GD -2).
        let loser = &rows[2];
        assert_eq!(
            (loser.played, loser.lost, loser.points, loser.goal_diff),
            (1, 1, 0, -2)
        );
        assert_eq!(rows[1].points, 0);
        assert_eq!(rows[1].played, 0);
    }

    #[test]
    fn draw_gives_one_point_each() {
        let mut state = LeagueState::new();
        let a = state.add_team("A", "").unwrap().id;
        let b = state.add_team("B", "").unwrap().id;
        play(&mut state, &a, &b, 2, 2);

        for row in state.standings() {
            assert_eq!((row.played, row.drawn, row.points), (1, 1, 1));
            assert_eq!((row.goals_for, row.goals_against), (2, 2));
        }
    }

    #[test]
    fn away_win_scores_for_away_side() {
        let mut state = LeagueState::new();
        let a = state.add_team("A", "").unwrap().id;
        let b = state.add_team("B", "").unwrap().id;
        play(&mut state, &a, &b, 0, 1);

        let rows = state.standings();
        assert_eq!(rows[0].team_id, b);
        assert_eq!((rows[0].won, rows[0].points), (1, 3));
        assert_eq!((rows[1].lost, rows[1].points), (1, 0));
    }

    #[test]
    fn unfinished_matches_do_not_count() {
        let mut state = LeagueState::new();
        let a = state.add_team("A", "").unwrap().id;
        let b = state.add_team("B", "").unwrap().id;
        let at = parse_local_datetime("2025-06-01T10:00").unwrap();
        let id = state.schedule_match(&a, &b, at).unwrap().id;
        state.set_score(&id, 5, 0).unwrap();

        assert!(state.standings().iter().all(|r| r.played == 0 && r.points == 0));
    }

    #[test]
    fn tie_breaks_by_goals_for_then_name() {
        let mut state = LeagueState::new();
        let zed = state.add_team("Zed", "").unwrap().id;
        let amy = state.add_team("Amy", "").unwrap().id;
        let bob = state.add_team("Bob", "").unwrap().id;
        let foil = state.add_team("Foil", "").unwrap().id;

        // Zed and Amy: 3 pts, GD +1, but Zed scored more.
        play(&mut state, &zed, &foil, 3, 2);
        play(&mut state, &amy, &foil, 1, 0);
        // Bob: 3 pts, GD +1, same GF as Amy; name decides.
        play(&mut state, &bob, &foil, 1, 0);

        let rows = state.standings();
        assert_eq!(names(&rows), vec!["Zed", "Amy", "Bob", "Foil"]);
        assert_eq!(rows, state.standings());
    }

    #[test]
    fn name_comparison_is_case_sensitive() {
        let mut state = LeagueState::new();
        state.add_team("alpha", "").unwrap();
        state.add_team("Beta", "").unwrap();
        assert_eq!(names(&state.standings()), vec!["Beta", "alpha"]);
    }

    #[test]
    fn identical_names_keep_registration_order() {
        let mut state = LeagueState::new();
        for name in ["A", "B", "C", "D", "E", "F", "G", "H"] {
            state.add_team(name, "").unwrap();
        }
        let ninth = state.add_team("Twin", "").unwrap().id;
        let tenth = state.add_team("Twin", "").unwrap().id;
        // "t10" < "t9" as strings; registration order must still win.
        assert_eq!((ninth.as_str(), tenth.as_str()), ("t9", "t10"));

        let rows = state.standings();
        assert_eq!(rows[8].team_id, ninth);
        assert_eq!(rows[9].team_id, tenth);
        assert_eq!(rows, state.standings());
    }

    #[test]
    fn huge_scores_saturate_instead_of_overflowing() {
        let mut state = LeagueState::new();
        let a = state.add_team("A", "").unwrap().id;
        let b = state.add_team("B", "").unwrap().id;
        play(&mut state, &a, &b, 3_000_000_000, 0);
        play(&mut state, &a, &b, 3_000_000_000, 0);

        let rows = state.standings();
        assert_eq!(rows[0].team_id, a);
        assert_eq!(rows[0].goals_for, 6_000_000_000);
        assert_eq!(rows[0].goal_diff, 6_000_000_000);
        assert_eq!(rows[1].goal_diff, -6_000_000_000);
        assert_eq!(rows[0].points, 6);
    }

    #[test]
    fn matches_with_unknown_teams_are_skipped() {
        let teams = vec![Team {
            id: TeamId::from("a"),
            name: "A".into(),
            short_code: "A".into(),
        }];
        let raw = serde_json::json!([{
            "id": "m1", "homeId": "a", "awayId": "ghost",
            "dateISO": "2025-06-01T10:00", "played": true,
            "goalsHome": 4, "goalsAway": 0
        }]);
        let matches: Vec<Match> = serde_json::from_value(raw).unwrap();

        let rows = compute_standings(&teams, &matches);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].played, 0);
    }

    #[test]
    fn season_totals_accumulate() {
        let mut state = LeagueState::new();
        let a = state.add_team("A", "").unwrap().id;
        let b = state.add_team("B", "").unwrap().id;
        let c = state.add_team("C", "").unwrap().id;
        play(&mut state, &a, &b, 2, 0);
        play(&mut state, &b, &c, 1, 1);
        play(&mut state, &c, &a, 3, 1);

        let rows = state.standings();
        // A: W1 L1 GF3 GA3 -> 3 pts, C: W1 D1 GF4 GA2 -> 4 pts, B: D1 L1 -> 1 pt
        assert_eq!(names(&rows), vec!["C", "A", "B"]);
        assert_eq!(rows[0].points, 4);
        assert_eq!(rows[0].goal_diff, 2);
        assert_eq!(rows[1].points, 3);
        assert_eq!(rows[1].goal_diff, 0);
        assert_eq!(rows[2].points, 1);
        assert_eq!(rows[2].goal_diff, -2);

        let total_played: u32 = rows.iter().map(|r| r.played).sum();
        assert_eq!(total_played, 6);
    }
}
