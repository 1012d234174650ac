// Integration tests for the league engine.
//
// These drive the public API the way the CLI does: seed a league, run a
// season of fixtures through the score controller, and check that standings
// and persistence agree with each other.

use matchday_core::db::Database;
use matchday_core::error::LeagueError;
use matchday_core::export::write_standings_csv;
use matchday_core::league::fixture::parse_local_datetime;
use matchday_core::league::state::parse_goals;
use matchday_core::league::{LeagueState, MatchId, TeamId};
use matchday_core::store::{load_or_seed, JsonFileStore, SnapshotStore};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Four-team league with a full single round-robin scheduled.
fn league_with_round() -> (LeagueState, Vec<TeamId>, Vec<MatchId>) {
    let mut state = LeagueState::new();
    let teams: Vec<TeamId> = ["Sloga", "Borac", "Mladost", "Jedinstvo"]
        .iter()
        .map(|name| state.add_team(name, "").unwrap().id)
        .collect();

    let pairs = [(0, 1), (2, 3), (0, 2), (1, 3), (3, 0), (1, 2)];
    let matches = pairs
        .iter()
        .enumerate()
        .map(|(day, &(h, a))| {
            let at = parse_local_datetime(&format!("2025-05-{:02}T17:00", day + 1)).unwrap();
            state.schedule_match(&teams[h], &teams[a], at).unwrap().id
        })
        .collect();

    (state, teams, matches)
}

// ===========================================================================
// Season flow
// ===========================================================================

#[test]
fn full_round_produces_expected_table() {
    let (mut state, teams, matches) = league_with_round();
    let results = [(2, 0), (1, 1), (0, 3), (2, 2), (1, 0), (4, 1)];

    for (id, &(h, a)) in matches.iter().zip(results.iter()) {
        state.set_score(id, h, a).unwrap();
        state.finish(id).unwrap();
        state.check_invariants().unwrap();
    }

    // Sloga:     W(2-0 Borac), L(0-3 Mladost), L(0-1 Jedinstvo) -> 3 pts, GF 2 GA 4
    // Borac:     L, D(2-2 Jedinstvo), W(4-1 Mladost)            -> 4 pts, GF 6 GA 5
    // Mladost:   D(1-1), W(3-0), L(1-4)                         -> 4 pts, GF 5 GA 5
    // Jedinstvo: D(1-1), D(2-2), W(1-0)                         -> 5 pts, GF 4 GA 3
    let rows = state.standings();
    let order: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["Jedinstvo", "Borac", "Mladost", "Sloga"]);

    assert_eq!(rows[0].points, 5);
    assert_eq!(rows[1].goal_diff, 1);
    assert_eq!(rows[2].goal_diff, 0);
    assert_eq!(rows[3].team_id, teams[0]);

    assert!(state.upcoming().is_empty());
    assert_eq!(state.played().len(), 6);
    assert_eq!(state.played()[0].id, matches[5]);
}

#[test]
fn live_scoring_then_correction_after_finish() {
    let (mut state, teams, matches) = league_with_round();
    let live = state.live_candidates()[0].id.clone();
    assert_eq!(live, matches[0]);

    state.adjust_score(&live, 1, 0).unwrap();
    state.adjust_score(&live, 1, 0).unwrap();
    state.adjust_score(&live, 0, 1).unwrap();
    state.adjust_score(&live, 0, -1).unwrap();
    state.adjust_score(&live, 0, -1).unwrap();
    state.finish(&live).unwrap();

    let top = &state.standings()[0];
    assert_eq!(top.team_id, teams[0]);
    assert_eq!((top.goals_for, top.goals_against), (2, 0));

    // Typed correction: "1" for home, "x" (unparseable) for away.
    state
        .set_score(&live, parse_goals("1"), parse_goals("x"))
        .unwrap();
    let top = &state.standings()[0];
    assert_eq!((top.goals_for, top.goals_against), (1, 0));
    assert_eq!(state.live_candidates().len(), 5);
}

#[test]
fn referenced_teams_cannot_be_removed() {
    let (mut state, teams, matches) = league_with_round();
    for team in &teams {
        assert!(matches!(
            state.remove_team(team),
            Err(LeagueError::Conflict { matches: 3, .. })
        ));
    }
    for m in &matches {
        state.remove_match(m).unwrap();
    }
    for team in &teams {
        state.remove_team(team).unwrap();
    }
    assert!(state.list_teams().is_empty());
}

// ===========================================================================
// Persistence
// ===========================================================================

#[test]
fn sqlite_and_json_stores_agree() {
    let (mut state, _, matches) = league_with_round();
    state.set_score(&matches[1], 3, 3).unwrap();
    state.finish(&matches[1]).unwrap();

    let db = Database::open(":memory:").unwrap();
    db.save(&state).unwrap();

    let path = std::env::temp_dir().join("matchday_it_backup.json");
    let _ = std::fs::remove_file(&path);
    let file = JsonFileStore::new(&path);
    file.save(&state).unwrap();

    let from_db = load_or_seed(&db, LeagueState::default_seed);
    let from_file = load_or_seed(&file, LeagueState::default_seed);
    assert_eq!(from_db, state);
    assert_eq!(from_file, state);
    assert_eq!(from_db.standings(), state.standings());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn reloaded_state_keeps_minting_fresh_ids() {
    let (mut state, teams, _) = league_with_round();
    let db = Database::open(":memory:").unwrap();
    db.save(&state).unwrap();
    let mut reloaded = db.load().unwrap().unwrap();

    let original = state.add_team("Novi", "").unwrap().id;
    let after_reload = reloaded.add_team("Novi", "").unwrap().id;
    assert_eq!(original, after_reload);
    assert!(!teams.contains(&after_reload));
}

#[test]
fn csv_export_matches_standings_order() {
    let (mut state, _, matches) = league_with_round();
    state.set_score(&matches[0], 0, 1).unwrap();
    state.finish(&matches[0]).unwrap();

    let mut out = Vec::new();
    write_standings_csv(&state.standings(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let second_line = text.lines().nth(1).unwrap();
    assert!(second_line.starts_with("1,Borac,BOR,1,1,0,0,1,0,1,3"));
}
