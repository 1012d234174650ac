// Application state and command dispatch.
//
// Owns the live league, the SQLite store and the admin session. Each command
// is handled to completion: mutations are gated on the session, applied to
// the league, and the whole snapshot is persisted before the reply is
// returned.

use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDateTime, Timelike};
use tracing::{debug, error, info};

use matchday_core::config::Config;
use matchday_core::db::Database;
use matchday_core::export::export_standings_csv;
use matchday_core::league::{LeagueState, MatchId};
use matchday_core::store::{load_or_seed, JsonFileStore, SnapshotStore, SNAPSHOT_KEY};

use crate::command::{Side, UserCommand, HELP};
use crate::session::Session;
use crate::view;

/// What the REPL should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this text and keep reading.
    Output(String),
    /// Leave the loop.
    Quit,
}

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub league: LeagueState,
    pub db: Database,
    pub session: Session,
    /// Match currently followed in the live view.
    pub live_focus: Option<MatchId>,
}

impl AppState {
    /// Create an AppState holding `league`, starting in a guest session.
    pub fn new(config: Config, league: LeagueState, db: Database) -> Self {
        let session = Session::new(config.league.admin_code.clone());
        AppState {
            config,
            league,
            db,
            session,
            live_focus: None,
        }
    }

    /// Handle one parsed command.
    pub fn handle_command(&mut self, cmd: UserCommand) -> Reply {
        debug!("Handling command: {:?}", cmd);

        if cmd == UserCommand::Quit {
            return Reply::Quit;
        }
        if cmd.requires_admin() && !self.session.is_admin() {
            return Reply::Output("Admin login required (use `login <code>`).".to_string());
        }

        let mutates = cmd.requires_admin();
        match self.dispatch(cmd) {
            Ok(text) if mutates => match self.persist() {
                Ok(()) => Reply::Output(text),
                Err(e) => {
                    error!("Failed to save league: {:#}", e);
                    Reply::Output(format!("{text}\nWarning: changes were not saved: {e:#}"))
                }
            },
            Ok(text) => Reply::Output(text),
            Err(e) => Reply::Output(format!("Error: {e:#}")),
        }
    }

    fn dispatch(&mut self, cmd: UserCommand) -> anyhow::Result<String> {
        match cmd {
            UserCommand::Help => Ok(HELP.to_string()),
            UserCommand::Quit => Ok(String::new()),
            UserCommand::WhoAmI => {
                let role = self.session.role().label();
                Ok(match self.db.updated_at(SNAPSHOT_KEY)? {
                    Some(at) => format!("You are {role}. League last saved {at}."),
                    None => format!("You are {role}."),
                })
            }
            UserCommand::Login(code) => Ok(if self.session.login(&code) {
                "Logged in as admin.".to_string()
            } else {
                "Wrong admin code.".to_string()
            }),
            UserCommand::Logout => {
                self.session.logout();
                Ok("Logged out.".to_string())
            }

            UserCommand::Table => Ok(view::standings_table(&self.league.standings())),
            UserCommand::Fixtures => Ok(view::fixtures(&self.league)),
            UserCommand::Results => Ok(view::results(&self.league)),
            UserCommand::Teams => Ok(view::teams(&self.league, self.session.is_admin())),
            UserCommand::Live(id) => self.focus_live(id),

            UserCommand::AddTeam { name, short } => {
                let team = self.league.add_team(&name, &short)?;
                Ok(format!("Added [{}] {} ({}).", team.id, team.name, team.short_code))
            }
            UserCommand::RenameTeam { id, name, short } => {
                let team = self.league.rename_team(&id, &name, &short)?;
                Ok(format!("Renamed [{}] to {} ({}).", team.id, team.name, team.short_code))
            }
            UserCommand::RemoveTeam(id) => {
                self.league.remove_team(&id)?;
                Ok(format!("Removed team {id}."))
            }
            UserCommand::Schedule { home, away, at } => {
                let at = at.unwrap_or_else(now_to_minute);
                let m = self.league.schedule_match(&home, &away, at)?;
                Ok(format!(
                    "Scheduled [{}] {} vs {}.",
                    m.id,
                    self.league.team_name(&m.home_team_id),
                    self.league.team_name(&m.away_team_id)
                ))
            }
            UserCommand::RemoveMatch(id) => {
                self.league.remove_match(&id)?;
                if self.live_focus.as_ref() == Some(&id) {
                    self.live_focus = None;
                }
                Ok(format!("Removed match {id}."))
            }
            UserCommand::Score { id, home, away } => {
                self.league.set_score(&id, home, away)?;
                Ok(self.score_line(&id))
            }
            UserCommand::Goal { id, side, delta } => {
                let id = self.target_match(id)?;
                match side {
                    Side::Home => self.league.adjust_score(&id, delta, 0)?,
                    Side::Away => self.league.adjust_score(&id, 0, delta)?,
                }
                Ok(self.score_line(&id))
            }
            UserCommand::Finish(id) => {
                let id = self.target_match(id)?;
                self.league.finish(&id)?;
                if self.live_focus.as_ref() == Some(&id) {
                    self.live_focus = None;
                }
                Ok(format!("Finished. {}", self.score_line(&id)))
            }

            UserCommand::Export(path) => {
                export_standings_csv(&self.league.standings(), &path)?;
                Ok(format!("Standings written to {}.", path.display()))
            }
            UserCommand::Backup(path) => {
                JsonFileStore::new(&path).save(&self.league)?;
                Ok(format!("League written to {}.", path.display()))
            }
            UserCommand::Import(path) => {
                let store = JsonFileStore::new(&path);
                let Some(league) = store.load()? else {
                    bail!("no backup found at {}", path.display());
                };
                league
                    .check_invariants()
                    .with_context(|| format!("backup {} is inconsistent", path.display()))?;
                info!("Imported league from {}", path.display());
                self.league = league;
                self.live_focus = None;
                Ok(format!(
                    "Imported {} teams and {} matches.",
                    self.league.list_teams().len(),
                    self.league.matches().len()
                ))
            }
        }
    }

    /// Pick (or keep) the live match and render its scoreboard.
    fn focus_live(&mut self, requested: Option<MatchId>) -> anyhow::Result<String> {
        let candidates = self.league.live_candidates();
        let chosen = match requested {
            Some(id) => candidates
                .iter()
                .find(|m| m.id == id)
                .copied()
                .ok_or_else(|| anyhow!("match {id} is not a scheduled match"))?,
            None => {
                let current = self
                    .live_focus
                    .as_ref()
                    .and_then(|id| candidates.iter().find(|m| &m.id == id).copied());
                match current.or_else(|| candidates.first().copied()) {
                    Some(m) => m,
                    None => {
                        return Ok(
                            "No matches to follow live. Schedule one first.".to_string()
                        )
                    }
                }
            }
        };

        let text = view::live(&self.league, chosen, self.session.is_admin());
        self.live_focus = Some(chosen.id.clone());
        Ok(text)
    }

    /// Resolve an optional match id against the live focus.
    fn target_match(&self, id: Option<MatchId>) -> anyhow::Result<MatchId> {
        id.or_else(|| self.live_focus.clone())
            .ok_or_else(|| anyhow!("no match given and no live match selected (use `live`)"))
    }

    fn score_line(&self, id: &MatchId) -> String {
        match self.league.find_match(id) {
            Some(m) => format!(
                "[{}] {} {} : {} {}",
                m.id,
                self.league.team_name(&m.home_team_id),
                m.home_goals,
                m.away_goals,
                self.league.team_name(&m.away_team_id)
            ),
            None => format!("[{id}] removed"),
        }
    }

    /// Write the current league to the database.
    pub fn persist(&self) -> anyhow::Result<()> {
        self.db.save(&self.league).context("failed to persist league")
    }
}

/// Current local time truncated to the minute.
fn now_to_minute() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// Load the league from the database, or seed it from config when nothing
/// usable is stored. The seed is written back so the next start finds it.
pub fn recover_from_db(config: &Config, db: &Database) -> anyhow::Result<LeagueState> {
    let had_snapshot = db.load_raw(SNAPSHOT_KEY)?.is_some();
    let league = load_or_seed(db, || config.league.seed_state());
    if !had_snapshot {
        db.save(&league).context("failed to store seed league")?;
        info!("Seeded new league with {} teams", league.list_teams().len());
    }
    Ok(league)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
