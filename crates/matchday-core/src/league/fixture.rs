// Match representation, status lifecycle and the snapshot wire format.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::team::TeamId;

/// Opaque match identifier. Immutable once minted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        MatchId(s.to_string())
    }
}

impl From<String> for MatchId {
    fn from(s: String) -> Self {
        MatchId(s)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted lifecycle of a match. There is no stored "live" state: a match
/// being followed live is still `Scheduled` until it is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Finished,
}

/// A fixture between two distinct teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    #[serde(rename = "homeId")]
    pub home_team_id: TeamId,
    #[serde(rename = "awayId")]
    pub away_team_id: TeamId,
    #[serde(rename = "dateISO", with = "date_iso")]
    pub scheduled_at: NaiveDateTime,
    #[serde(rename = "played", with = "played_flag", default)]
    pub status: MatchStatus,
    #[serde(rename = "goalsHome", default)]
    pub home_goals: u32,
    #[serde(rename = "goalsAway", default)]
    pub away_goals: u32,
}

impl Match {
    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Whether `team_id` plays in this match, home or away.
    pub fn involves(&self, team_id: &TeamId) -> bool {
        &self.home_team_id == team_id || &self.away_team_id == team_id
    }
}

/// Parse a local date-time as entered by a user or stored in a snapshot.
///
/// Accepts `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS` (optionally with
/// fractional seconds) and the same forms with a space instead of `T`. A
/// trailing `Z` is ignored and the wall-clock value kept as-is.
pub fn parse_local_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    let s = s.trim();
    let s = s.strip_suffix('Z').unwrap_or(s);
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Format a date-time the way snapshots store it: minute precision unless
/// the value carries seconds, and fractional seconds only when present.
pub fn format_local_datetime(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() != 0 {
        dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    } else if dt.second() != 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M").to_string()
    }
}

mod date_iso {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_local_datetime(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_local_datetime(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid local date-time: {raw:?}")))
    }
}

mod played_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::MatchStatus;

    pub fn serialize<S: Serializer>(status: &MatchStatus, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bool(*status == MatchStatus::Finished)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<MatchStatus, D::Error> {
        Ok(if bool::deserialize(d)? {
            MatchStatus::Finished
        } else {
            MatchStatus::Scheduled
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dt(s: &str) -> NaiveDateTime {
        parse_local_datetime(s).unwrap()
    }

    #[test]
    fn parses_minute_and_second_precision() {
        assert_eq!(dt("2025-03-01T17:30"), dt("2025-03-01 17:30:00"));
        assert!(parse_local_datetime("2025-03-01T17:30:15.250").is_some());
        assert_eq!(dt("2025-03-01T17:30:00.000Z"), dt("2025-03-01T17:30"));
        assert!(parse_local_datetime("next tuesday").is_none());
        assert!(parse_local_datetime("2025-13-01T10:00").is_none());
    }

    #[test]
    fn formats_at_minute_precision_when_possible() {
        assert_eq!(format_local_datetime(&dt("2025-03-01T17:30")), "2025-03-01T17:30");
        assert_eq!(
            format_local_datetime(&dt("2025-03-01T17:30:09")),
            "2025-03-01T17:30:09"
        );
        assert_eq!(
            format_local_datetime(&dt("2025-05-01T18:00:05.250")),
            "2025-05-01T18:00:05.250"
        );
    }

    #[test]
    fn sub_second_kickoff_survives_json() {
        let m = Match {
            id: MatchId::from("m1"),
            home_team_id: TeamId::from("t1"),
            away_team_id: TeamId::from("t2"),
            scheduled_at: dt("2025-05-01T18:00:05.250"),
            status: MatchStatus::Scheduled,
            home_goals: 0,
            away_goals: 0,
        };
        let json = serde_json::to_string(&m).unwrap();
        let back: Match = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn reads_browser_snapshot_match() {
        let raw = json!({
            "id": "k3j9x1a",
            "homeId": "a1",
            "awayId": "b2",
            "dateISO": "2025-04-12T10:00",
            "played": true,
            "goalsHome": 2,
            "goalsAway": 1
        });
        let m: Match = serde_json::from_value(raw).unwrap();
        assert_eq!(m.id.as_str(), "k3j9x1a");
        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!((m.home_goals, m.away_goals), (2, 1));
        assert!(m.involves(&TeamId::from("b2")));
        assert!(!m.involves(&TeamId::from("c3")));
    }

    #[test]
    fn missing_goals_and_flag_default_to_fresh_fixture() {
        let raw = json!({
            "id": "m1",
            "homeId": "a1",
            "awayId": "b2",
            "dateISO": "2025-04-12T10:00"
        });
        let m: Match = serde_json::from_value(raw).unwrap();
        assert_eq!(m.status, MatchStatus::Scheduled);
        assert_eq!((m.home_goals, m.away_goals), (0, 0));
    }

    #[test]
    fn negative_goals_are_rejected_on_read() {
        let raw = json!({
            "id": "m1",
            "homeId": "a1",
            "awayId": "b2",
            "dateISO": "2025-04-12T10:00",
            "played": false,
            "goalsHome": -1,
            "goalsAway": 0
        });
        assert!(serde_json::from_value::<Match>(raw).is_err());
    }

    #[test]
    fn writes_played_flag_and_date() {
        let m = Match {
            id: MatchId::from("m1"),
            home_team_id: TeamId::from("t1"),
            away_team_id: TeamId::from("t2"),
            scheduled_at: dt("2025-04-12T10:00"),
            status: MatchStatus::Scheduled,
            home_goals: 0,
            away_goals: 0,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["played"], false);
        assert_eq!(json["dateISO"], "2025-04-12T10:00");
        assert_eq!(json["homeId"], "t1");
    }
}
