// League state: teams, matches, and the mutations that keep them consistent.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::fixture::{Match, MatchId, MatchStatus};
use super::team::{derive_short_code, normalize_name, Team, TeamId};
use crate::error::{Entity, LeagueError, Result};
use crate::standings::{compute_standings, StandingsRow};

/// Teams a brand-new league starts with.
pub const DEFAULT_SEED_TEAMS: &[(&str, &str)] = &[("Tim Alpha", "ALP"), ("Tim Beta", "BET")];

/// Shown in place of a team name when a match references an unknown id.
pub const UNKNOWN_TEAM_NAME: &str = "?";

/// The complete state of the league.
///
/// Fields are private: the methods below are the only way to change them, and
/// each one validates its input before touching anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueState {
    /// Registered teams in insertion order.
    teams: Vec<Team>,
    /// All matches, scheduled and finished, in insertion order.
    matches: Vec<Match>,
    /// Last sequence number handed out by the id minter. Never decreases, so
    /// a removed team's id is not reused.
    #[serde(default)]
    id_seq: u64,
}

impl LeagueState {
    /// An empty league with no teams.
    pub fn new() -> Self {
        Self::default()
    }

    /// A league pre-populated with `(name, short_code)` teams.
    ///
    /// Entries that fail validation are skipped with a warning.
    pub fn seeded<'a, I>(teams: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut state = Self::new();
        for (name, short_code) in teams {
            if let Err(e) = state.add_team(name, short_code) {
                warn!("Skipping seed team {:?}: {}", name, e);
            }
        }
        state
    }

    /// The two example teams used when nothing has been saved yet.
    pub fn default_seed() -> Self {
        Self::seeded(DEFAULT_SEED_TEAMS.iter().copied())
    }

    // ------------------------------------------------------------------
    // Team registry
    // ------------------------------------------------------------------

    /// Register a new team.
    ///
    /// The short code is derived from `short_code`, or from the name when the
    /// code is blank (see [`derive_short_code`]).
    pub fn add_team(&mut self, name: &str, short_code: &str) -> Result<Team> {
        let name = normalize_name(name)?;
        let short_code = derive_short_code(short_code, &name);
        let id = self.mint_team_id();

        let team = Team {
            id,
            name,
            short_code,
        };
        info!("Added team '{}' ({}) as {}", team.name, team.short_code, team.id);
        self.teams.push(team.clone());
        Ok(team)
    }

    /// Replace a team's name and short code. The id is preserved.
    pub fn rename_team(&mut self, id: &TeamId, name: &str, short_code: &str) -> Result<Team> {
        let name = normalize_name(name)?;
        let short_code = derive_short_code(short_code, &name);
        let team = self
            .teams
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| LeagueError::not_found(Entity::Team, id))?;

        info!("Renamed team {} from '{}' to '{}'", id, team.name, name);
        team.name = name;
        team.short_code = short_code;
        Ok(team.clone())
    }

    /// Remove a team that no match references.
    pub fn remove_team(&mut self, id: &TeamId) -> Result<()> {
        let idx = self
            .teams
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| LeagueError::not_found(Entity::Team, id))?;

        let matches = self.matches.iter().filter(|m| m.involves(id)).count();
        if matches > 0 {
            return Err(LeagueError::Conflict {
                team_id: id.to_string(),
                matches,
            });
        }

        let team = self.teams.remove(idx);
        info!("Removed team '{}' ({})", team.name, team.id);
        Ok(())
    }

    /// All teams in insertion order.
    pub fn list_teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn find_team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| &t.id == id)
    }

    /// Display name for a team id, or `"?"` if the id is unknown.
    pub fn team_name(&self, id: &TeamId) -> &str {
        self.find_team(id)
            .map(|t| t.name.as_str())
            .unwrap_or(UNKNOWN_TEAM_NAME)
    }

    /// Whether any match references the team.
    pub fn team_in_use(&self, id: &TeamId) -> bool {
        self.matches.iter().any(|m| m.involves(id))
    }

    // ------------------------------------------------------------------
    // Match scheduler
    // ------------------------------------------------------------------

    /// Schedule a fixture between two distinct, registered teams.
    pub fn schedule_match(
        &mut self,
        home: &TeamId,
        away: &TeamId,
        scheduled_at: NaiveDateTime,
    ) -> Result<Match> {
        if home == away {
            return Err(LeagueError::validation(
                "away_team_id",
                "home and away teams must be different",
            ));
        }
        if self.find_team(home).is_none() {
            return Err(LeagueError::validation(
                "home_team_id",
                format!("unknown team {home}"),
            ));
        }
        if self.find_team(away).is_none() {
            return Err(LeagueError::validation(
                "away_team_id",
                format!("unknown team {away}"),
            ));
        }

        let m = Match {
            id: self.mint_match_id(),
            home_team_id: home.clone(),
            away_team_id: away.clone(),
            scheduled_at,
            status: MatchStatus::Scheduled,
            home_goals: 0,
            away_goals: 0,
        };
        info!(
            "Scheduled {}: {} vs {} at {}",
            m.id,
            self.team_name(home),
            self.team_name(away),
            m.scheduled_at
        );
        self.matches.push(m.clone());
        Ok(m)
    }

    /// Delete a match. Nothing else references matches, so this never
    /// cascades.
    pub fn remove_match(&mut self, id: &MatchId) -> Result<()> {
        let idx = self
            .matches
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| LeagueError::not_found(Entity::Match, id))?;
        self.matches.remove(idx);
        info!("Removed match {}", id);
        Ok(())
    }

    pub fn find_match(&self, id: &MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| &m.id == id)
    }

    /// All matches in insertion order.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Scheduled matches, earliest first. Matches at the same time keep their
    /// insertion order.
    pub fn upcoming(&self) -> Vec<&Match> {
        let mut upcoming: Vec<&Match> =
            self.matches.iter().filter(|m| !m.is_finished()).collect();
        upcoming.sort_by_key(|m| m.scheduled_at);
        upcoming
    }

    /// Finished matches, most recent first.
    pub fn played(&self) -> Vec<&Match> {
        let mut played: Vec<&Match> = self.matches.iter().filter(|m| m.is_finished()).collect();
        played.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        played
    }

    /// Matches that can be followed live, in insertion order. The first one
    /// is the default focus.
    pub fn live_candidates(&self) -> Vec<&Match> {
        self.matches.iter().filter(|m| !m.is_finished()).collect()
    }

    // ------------------------------------------------------------------
    // Score controller
    // ------------------------------------------------------------------

    /// Overwrite both scores. Negative inputs are clamped to 0.
    ///
    /// Finished matches can still be corrected.
    pub fn set_score(&mut self, id: &MatchId, home_goals: i64, away_goals: i64) -> Result<()> {
        let m = self.match_mut(id)?;
        m.home_goals = clamp_goals(home_goals);
        m.away_goals = clamp_goals(away_goals);
        info!("Score of {} set to {}-{}", id, m.home_goals, m.away_goals);
        Ok(())
    }

    /// Apply signed deltas to each side. Each side bottoms out at 0
    /// independently.
    pub fn adjust_score(&mut self, id: &MatchId, delta_home: i64, delta_away: i64) -> Result<()> {
        let m = self.match_mut(id)?;
        m.home_goals = clamp_goals(i64::from(m.home_goals).saturating_add(delta_home));
        m.away_goals = clamp_goals(i64::from(m.away_goals).saturating_add(delta_away));
        debug!(
            "Score of {} adjusted by ({:+}, {:+}) to {}-{}",
            id, delta_home, delta_away, m.home_goals, m.away_goals
        );
        Ok(())
    }

    /// Mark a match finished. Finishing twice is a no-op.
    pub fn finish(&mut self, id: &MatchId) -> Result<()> {
        let m = self.match_mut(id)?;
        if m.status == MatchStatus::Finished {
            debug!("Match {} already finished", id);
            return Ok(());
        }
        m.status = MatchStatus::Finished;
        info!("Finished {} at {}-{}", id, m.home_goals, m.away_goals);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// The current standings table, best team first.
    pub fn standings(&self) -> Vec<StandingsRow> {
        compute_standings(&self.teams, &self.matches)
    }

    /// Verify the referential invariants: unique ids, and every match pointing
    /// at two distinct registered teams.
    pub fn check_invariants(&self) -> Result<()> {
        let mut team_ids = HashSet::new();
        for team in &self.teams {
            if !team_ids.insert(&team.id) {
                return Err(LeagueError::validation(
                    "teams",
                    format!("duplicate team id {}", team.id),
                ));
            }
            if team.name.trim().is_empty() {
                return Err(LeagueError::validation(
                    "teams",
                    format!("team {} has an empty name", team.id),
                ));
            }
        }

        let mut match_ids = HashSet::new();
        for m in &self.matches {
            if !match_ids.insert(&m.id) {
                return Err(LeagueError::validation(
                    "matches",
                    format!("duplicate match id {}", m.id),
                ));
            }
            if m.home_team_id == m.away_team_id {
                return Err(LeagueError::validation(
                    "matches",
                    format!("match {} has the same team on both sides", m.id),
                ));
            }
            for side in [&m.home_team_id, &m.away_team_id] {
                if !team_ids.contains(side) {
                    return Err(LeagueError::validation(
                        "matches",
                        format!("match {} references unknown team {}", m.id, side),
                    ));
                }
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn match_mut(&mut self, id: &MatchId) -> Result<&mut Match> {
        self.matches
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| LeagueError::not_found(Entity::Match, id))
    }

    fn mint_team_id(&mut self) -> TeamId {
        loop {
            self.id_seq += 1;
            let candidate = TeamId::from(format!("t{}", self.id_seq));
            if self.find_team(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn mint_match_id(&mut self) -> MatchId {
        loop {
            self.id_seq += 1;
            let candidate = MatchId::from(format!("m{}", self.id_seq));
            if self.find_match(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

/// Clamp a signed goal count into the stored non-negative range.
fn clamp_goals(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Parse a score typed by a user.
///
/// Reads an optional sign and the leading decimal digits after trimming
/// whitespace, so `"2abc"` is 2. Input with no leading digits is 0.
pub fn parse_goals(input: &str) -> i64 {
    let s = input.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    if negative {
        -value
    } else {
        value
    }
}
