// Domain error types for league mutations and lookups.

use std::fmt;

use thiserror::Error;

/// Which kind of entity an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Team,
    Match,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Team => write!(f, "team"),
            Entity::Match => write!(f, "match"),
        }
    }
}

/// Errors raised by league operations.
///
/// Every mutation validates before touching state, so an `Err` always leaves
/// the `LeagueState` exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeagueError {
    #[error("validation error for field `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("team {team_id} is in use by {matches} match(es) and cannot be removed")]
    Conflict { team_id: String, matches: usize },

    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },
}

impl LeagueError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        LeagueError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        LeagueError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeagueError>;
