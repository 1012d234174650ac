// Team representation and name/short-code normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LeagueError, Result};

/// Maximum number of characters kept in a team's short code.
pub const SHORT_CODE_LEN: usize = 3;

/// Opaque team identifier. Immutable once minted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TeamId {
    fn from(s: &str) -> Self {
        TeamId(s.to_string())
    }
}

impl From<String> for TeamId {
    fn from(s: String) -> Self {
        TeamId(s)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A team registered in the league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    /// Display name, never empty.
    pub name: String,
    /// Short display code (e.g. "ALP"). Not required to be unique.
    #[serde(rename = "short", default)]
    pub short_code: String,
}

/// Trim a team name and reject it if nothing is left.
pub(crate) fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LeagueError::validation("name", "team name must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Derive the short code shown next to a team name.
///
/// Upper-cases `code`, or `name` when `code` is blank, and keeps the first
/// three characters.
pub fn derive_short_code(code: &str, name: &str) -> String {
    let source = if code.trim().is_empty() { name } else { code.trim() };
    source.to_uppercase().chars().take(SHORT_CODE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_code_prefers_explicit_code() {
        assert_eq!(derive_short_code("bet", "Tim Beta"), "BET");
        assert_eq!(derive_short_code("dinamo", "Dinamo"), "DIN");
    }

    #[test]
    fn short_code_falls_back_to_name() {
        assert_eq!(derive_short_code("", "Tim Alpha"), "TIM");
        assert_eq!(derive_short_code("   ", "ok"), "OK");
    }

    #[test]
    fn short_code_never_exceeds_limit_after_upper_casing() {
        let code = derive_short_code("ßßß", "Straße");
        assert_eq!(code, "SSS");
        assert_eq!(derive_short_code("", "ßa"), "SSA");
    }

    #[test]
    fn short_code_counts_characters_not_bytes() {
        assert_eq!(derive_short_code("", "Željezničar"), "ŽEL");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = normalize_name("   ").unwrap_err();
        assert!(matches!(err, LeagueError::Validation { ref field, .. } if field == "name"));
        assert_eq!(normalize_name("  Zvijezda ").unwrap(), "Zvijezda");
    }

    #[test]
    fn serializes_short_code_as_short() {
        let team = Team {
            id: TeamId::from("t1"),
            name: "Tim Alpha".into(),
            short_code: "ALP".into(),
        };
        let json = serde_json::to_value(&team).unwrap();
        assert_eq!(json["short"], "ALP");
        assert_eq!(json["id"], "t1");
    }
}
