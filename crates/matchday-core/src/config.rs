// Configuration loading and parsing (config/league.toml).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::league::LeagueState;
use crate::league::state::DEFAULT_SEED_TEAMS;

/// File name of the league configuration inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "league.toml";

/// Database file name used when `storage.db_path` is not set.
pub const DEFAULT_DB_FILE: &str = "matchday.db";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    /// Resolved path of the SQLite database.
    pub db_path: PathBuf,
    /// `tracing` filter directive, if configured.
    pub log_filter: Option<String>,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    league: LeagueConfig,
    #[serde(default)]
    storage: StorageSection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// Shared code that unlocks administrator commands.
    pub admin_code: String,
    /// Teams a new league starts with when no snapshot exists.
    #[serde(default = "default_seed_teams")]
    pub seed_teams: Vec<SeedTeam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedTeam {
    pub name: String,
    #[serde(default)]
    pub short: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StorageSection {
    db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingSection {
    filter: Option<String>,
}

fn default_seed_teams() -> Vec<SeedTeam> {
    DEFAULT_SEED_TEAMS
        .iter()
        .map(|(name, short)| SeedTeam {
            name: name.to_string(),
            short: short.to_string(),
        })
        .collect()
}

impl LeagueConfig {
    /// Build the league a fresh install starts from.
    pub fn seed_state(&self) -> LeagueState {
        LeagueState::seeded(
            self.seed_teams
                .iter()
                .map(|t| (t.name.as_str(), t.short.as_str())),
        )
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/league.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer `load_config()` which does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ConfigError::FileNotFound { path: path.clone() })?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let db_path = match file.storage.db_path {
        Some(p) if Path::new(&p).is_absolute() => PathBuf::from(p),
        Some(p) => base_dir.join(p),
        None => default_db_path(base_dir),
    };

    let config = Config {
        league: file.league,
        db_path,
        log_filter: file.logging.filter,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy any config file missing from `config/` out of `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let source = entry.path();
        if !source.is_file() {
            continue;
        }
        let Some(file_name) = source.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {}: {e}", source.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

/// Platform data directory for the database, or `base_dir` if the platform
/// has none.
fn default_db_path(base_dir: &Path) -> PathBuf {
    ProjectDirs::from("", "", "matchday")
        .map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE))
        .unwrap_or_else(|| base_dir.join(DEFAULT_DB_FILE))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }

    if config.league.admin_code.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.admin_code".into(),
            message: "must not be empty".into(),
        });
    }

    for (i, team) in config.league.seed_teams.iter().enumerate() {
        if team.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("league.seed_teams[{i}].name"),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
