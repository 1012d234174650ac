// Line command parsing.
//
// Turns one line typed at the prompt into a `UserCommand` for the app
// orchestrator. Arguments are whitespace-separated; double quotes group words
// (`add-team "Tim Alpha" ALP`).

use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

use matchday_core::league::fixture::parse_local_datetime;
use matchday_core::league::state::parse_goals;
use matchday_core::league::{MatchId, TeamId};

/// Which side of a match a goal is credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

/// Everything the user can ask the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Help,
    Login(String),
    Logout,
    WhoAmI,
    Teams,
    AddTeam {
        name: String,
        short: String,
    },
    RenameTeam {
        id: TeamId,
        name: String,
        short: String,
    },
    RemoveTeam(TeamId),
    Schedule {
        home: TeamId,
        away: TeamId,
        /// `None` means "now".
        at: Option<NaiveDateTime>,
    },
    RemoveMatch(MatchId),
    Fixtures,
    Results,
    Table,
    /// Focus a match for live scoring; `None` keeps or picks the default.
    Live(Option<MatchId>),
    Score {
        id: MatchId,
        home: i64,
        away: i64,
    },
    /// One goal for (`delta = 1`) or taken away from (`delta = -1`) a side.
    /// `None` targets the live focus.
    Goal {
        id: Option<MatchId>,
        side: Side,
        delta: i64,
    },
    Finish(Option<MatchId>),
    Export(PathBuf),
    Backup(PathBuf),
    Import(PathBuf),
    Quit,
}

impl UserCommand {
    /// Whether the command changes league state and therefore needs an
    /// administrator session.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            UserCommand::AddTeam { .. }
                | UserCommand::RenameTeam { .. }
                | UserCommand::RemoveTeam(_)
                | UserCommand::Schedule { .. }
                | UserCommand::RemoveMatch(_)
                | UserCommand::Score { .. }
                | UserCommand::Goal { .. }
                | UserCommand::Finish(_)
                | UserCommand::Import(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid date-time {0:?} (expected YYYY-MM-DDTHH:MM)")]
    InvalidDate(String),
}

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  table                              standings
  fixtures                           upcoming matches
  results                            finished matches
  teams                              registered teams
  live [match]                       follow a scheduled match
  login <code> | logout | whoami     administrator session
  add-team <name> [short]            (admin)
  rename-team <team> <name> [short]  (admin)
  remove-team <team>                 (admin)
  schedule <home> <away> [datetime]  (admin) datetime defaults to now
  remove-match <match>               (admin)
  score <match> <home> <away>        (admin) set the score
  goal [match] home|away [+|-]       (admin) add or take back one goal
  finish [match]                     (admin) mark a match finished
  import <file.json>                 (admin) replace the league from a backup
  backup <file.json>                 write the league to a JSON file
  export <file.csv>                  write the standings as CSV
  help | quit";

/// Parse one input line.
pub fn parse_line(line: &str) -> Result<UserCommand, CommandError> {
    let tokens = tokenize(line);
    let Some((head, args)) = tokens.split_first() else {
        return Err(CommandError::Empty);
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match head.to_ascii_lowercase().as_str() {
        "help" | "?" => Ok(UserCommand::Help),
        "quit" | "exit" | "q" => Ok(UserCommand::Quit),
        "whoami" => Ok(UserCommand::WhoAmI),
        "logout" => Ok(UserCommand::Logout),
        "login" => match args.as_slice() {
            [code] => Ok(UserCommand::Login(code.to_string())),
            _ => Err(CommandError::Usage("login <code>")),
        },
        "teams" => Ok(UserCommand::Teams),
        "table" | "standings" => Ok(UserCommand::Table),
        "fixtures" | "schedule-list" => Ok(UserCommand::Fixtures),
        "results" => Ok(UserCommand::Results),
        "add-team" => match args.as_slice() {
            [name] => Ok(UserCommand::AddTeam {
                name: name.to_string(),
                short: String::new(),
            }),
            [name, short] => Ok(UserCommand::AddTeam {
                name: name.to_string(),
                short: short.to_string(),
            }),
            _ => Err(CommandError::Usage("add-team <name> [short]")),
        },
        "rename-team" => match args.as_slice() {
            [id, name] => Ok(UserCommand::RenameTeam {
                id: TeamId::from(*id),
                name: name.to_string(),
                short: String::new(),
            }),
            [id, name, short] => Ok(UserCommand::RenameTeam {
                id: TeamId::from(*id),
                name: name.to_string(),
                short: short.to_string(),
            }),
            _ => Err(CommandError::Usage("rename-team <team> <name> [short]")),
        },
        "remove-team" => match args.as_slice() {
            [id] => Ok(UserCommand::RemoveTeam(TeamId::from(*id))),
            _ => Err(CommandError::Usage("remove-team <team>")),
        },
        "schedule" => match args.as_slice() {
            [home, away] => Ok(UserCommand::Schedule {
                home: TeamId::from(*home),
                away: TeamId::from(*away),
                at: None,
            }),
            [home, away, rest @ ..] => {
                // Allow "2025-05-01 18:00" typed without quotes.
                let raw = rest.join(" ");
                let at = parse_local_datetime(&raw).ok_or(CommandError::InvalidDate(raw))?;
                Ok(UserCommand::Schedule {
                    home: TeamId::from(*home),
                    away: TeamId::from(*away),
                    at: Some(at),
                })
            }
            _ => Err(CommandError::Usage("schedule <home> <away> [datetime]")),
        },
        "remove-match" => match args.as_slice() {
            [id] => Ok(UserCommand::RemoveMatch(MatchId::from(*id))),
            _ => Err(CommandError::Usage("remove-match <match>")),
        },
        "live" => match args.as_slice() {
            [] => Ok(UserCommand::Live(None)),
            [id] => Ok(UserCommand::Live(Some(MatchId::from(*id)))),
            _ => Err(CommandError::Usage("live [match]")),
        },
        "score" => match args.as_slice() {
            [id, home, away] => Ok(UserCommand::Score {
                id: MatchId::from(*id),
                home: parse_goals(home),
                away: parse_goals(away),
            }),
            _ => Err(CommandError::Usage("score <match> <home> <away>")),
        },
        "goal" => parse_goal(&args),
        "finish" => match args.as_slice() {
            [] => Ok(UserCommand::Finish(None)),
            [id] => Ok(UserCommand::Finish(Some(MatchId::from(*id)))),
            _ => Err(CommandError::Usage("finish [match]")),
        },
        "export" => single_path(&args, "export <file.csv>").map(UserCommand::Export),
        "backup" => single_path(&args, "backup <file.json>").map(UserCommand::Backup),
        "import" => single_path(&args, "import <file.json>").map(UserCommand::Import),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

const GOAL_USAGE: &str = "goal [match] home|away [+|-]";

fn parse_goal(args: &[&str]) -> Result<UserCommand, CommandError> {
    let (id, rest) = match args.first().copied().and_then(parse_side) {
        Some(_) => (None, args),
        None => match args.split_first() {
            Some((id, rest)) => (Some(MatchId::from(*id)), rest),
            None => return Err(CommandError::Usage(GOAL_USAGE)),
        },
    };

    let (side, delta) = match rest {
        [side] => (parse_side(side), 1),
        [side, "+"] => (parse_side(side), 1),
        [side, "-"] => (parse_side(side), -1),
        _ => return Err(CommandError::Usage(GOAL_USAGE)),
    };
    let side = side.ok_or(CommandError::Usage(GOAL_USAGE))?;

    Ok(UserCommand::Goal { id, side, delta })
}

fn parse_side(s: &str) -> Option<Side> {
    match s.to_ascii_lowercase().as_str() {
        "home" | "h" => Some(Side::Home),
        "away" | "a" => Some(Side::Away),
        _ => None,
    }
}

fn single_path(args: &[&str], usage: &'static str) -> Result<PathBuf, CommandError> {
    match args {
        [path] => Ok(PathBuf::from(path)),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// Split a line into words, keeping double-quoted runs together. An
/// unterminated quote runs to the end of the line.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}
