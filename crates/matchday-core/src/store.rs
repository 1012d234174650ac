// Snapshot persistence contract and the JSON-file implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::league::LeagueState;

/// Key the league snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "youth-league-state-v1";

/// Somewhere a whole-league snapshot can be loaded from and saved to.
///
/// `load` returns `Ok(None)` when nothing has been saved yet. Snapshots carry
/// no schema version.
pub trait SnapshotStore {
    fn load(&self) -> Result<Option<LeagueState>>;
    fn save(&self, state: &LeagueState) -> Result<()>;
}

/// Load the stored league, falling back to `seed` when the snapshot is
/// missing, unreadable, or inconsistent. Never fails.
pub fn load_or_seed<F>(store: &dyn SnapshotStore, seed: F) -> LeagueState
where
    F: FnOnce() -> LeagueState,
{
    match store.load() {
        Ok(Some(state)) => match state.check_invariants() {
            Ok(()) => {
                info!(
                    "Loaded league snapshot: {} teams, {} matches",
                    state.list_teams().len(),
                    state.matches().len()
                );
                state
            }
            Err(e) => {
                warn!("Stored snapshot is inconsistent ({}); starting from seed", e);
                seed()
            }
        },
        Ok(None) => {
            info!("No stored snapshot; starting from seed");
            seed()
        }
        Err(e) => {
            warn!("Failed to load snapshot ({:#}); starting from seed", e);
            seed()
        }
    }
}

/// Snapshot stored as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<LeagueState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let state = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse snapshot {}", self.path.display()))?;
        Ok(Some(state))
    }

    fn save(&self, state: &LeagueState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(state).context("failed to serialize league")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
