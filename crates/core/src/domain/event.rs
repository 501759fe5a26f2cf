use crate::error::{CoreError, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Kind of repository activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Push,
    PullRequest,
    Merge,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Push, Action::PullRequest, Action::Merge];

    /// Wire tag, as stored and served by the receiver
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Push => "PUSH",
            Action::PullRequest => "PULL_REQUEST",
            Action::Merge => "MERGE",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Action::Push => "PUSH",
            Action::PullRequest => "PULL REQUEST",
            Action::Merge => "MERGE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "push" => Ok(Action::Push),
            "pull_request" | "pull-request" | "pullrequest" | "pr" => Ok(Action::PullRequest),
            "merge" => Ok(Action::Merge),
            _ => Err(CoreError::InvalidAction { value: s.to_string() }),
        }
    }
}

/// A single repository activity event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEvent {
    pub request_id: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub action: Action,
    pub author: String,
    pub to_branch: String,
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub from_branch: Option<String>,
}

/// Composite identity used for deduplication and display keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub request_id: String,
    pub action: Action,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.request_id,
            self.action,
            self.timestamp.timestamp_millis()
        )
    }
}

impl RepoEvent {
    pub fn key(&self) -> EventKey {
        EventKey {
            request_id: self.request_id.clone(),
            action: self.action,
            timestamp: self.timestamp,
        }
    }

    /// Pushes only carry a destination branch
    pub fn uses_source_branch(&self) -> bool {
        !matches!(self.action, Action::Push)
    }

    /// One-line sentence describing what happened
    pub fn description(&self) -> String {
        let from = self.from_branch.as_deref().unwrap_or("?");
        match self.action {
            Action::Push => format!("{} pushed to {}", self.author, self.to_branch),
            Action::PullRequest => format!(
                "{} opened a pull request from {} to {}",
                self.author, from, self.to_branch
            ),
            Action::Merge => format!("{} merged {} into {}", self.author, from, self.to_branch),
        }
    }
}

impl fmt::Display for RepoEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.action.label(), self.description())
    }
}

/// Parse an ISO-8601 timestamp; values without an offset are taken as UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(naive.and_utc());
        }
    }

    Err(CoreError::InvalidTimestamp {
        value: value.to_string(),
    })
}

/// Coarse "time ago" rendering relative to `now`
pub fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes();
    if minutes <= 1 {
        return "just now".to_string();
    }

    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else {
        format!("{}m ago", minutes)
    }
}

/// Full UTC rendering, e.g. "Oct 18, 2026, 02:05:09 PM UTC"
pub fn format_full(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y, %I:%M:%S %p UTC").to_string()
}

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, h, m, s).unwrap()
    }

    fn push_event() -> RepoEvent {
        RepoEvent {
            request_id: "abc123".to_string(),
            timestamp: at(14, 5, 9),
            action: Action::Push,
            author: "john.doe".to_string(),
            to_branch: "main".to_string(),
            from_branch: None,
        }
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("PUSH".parse::<Action>().unwrap(), Action::Push);
        assert_eq!("pull_request".parse::<Action>().unwrap(), Action::PullRequest);
        assert_eq!("pr".parse::<Action>().unwrap(), Action::PullRequest);
        assert_eq!(" Merge ".parse::<Action>().unwrap(), Action::Merge);
        assert!("rebase".parse::<Action>().is_err());
    }

    #[test]
    fn test_decode_naive_timestamp_as_utc() {
        let json = r#"{
            "_id": "65f0c2",
            "request_id": "42",
            "timestamp": "2026-10-18T14:05:09.123456",
            "action": "PULL_REQUEST",
            "author": "jane",
            "from_branch": "feature/x",
            "to_branch": "main"
        }"#;
        let event: RepoEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.action, Action::PullRequest);
        assert_eq!(event.timestamp.timestamp(), at(14, 5, 9).timestamp());
        assert_eq!(event.from_branch.as_deref(), Some("feature/x"));
    }

    #[test]
    fn test_decode_offset_timestamp_and_empty_source_branch() {
        let json = r#"{
            "request_id": "abc",
            "timestamp": "2026-10-18T16:05:09+02:00",
            "action": "PUSH",
            "author": "john",
            "from_branch": "",
            "to_branch": "develop"
        }"#;
        let event: RepoEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.timestamp, at(14, 5, 9));
        assert_eq!(event.from_branch, None);
    }

    #[test]
    fn test_missing_source_branch_is_none() {
        let json = r#"{"request_id":"r","timestamp":"2026-10-18T14:05:09Z","action":"MERGE","author":"a","to_branch":"main"}"#;
        let event: RepoEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.from_branch, None);
        assert_eq!(event.description(), "a merged ? into main");
    }

    #[test]
    fn test_serialize_writes_utc_and_skips_missing_branch() {
        let json = serde_json::to_value(push_event()).unwrap();
        assert_eq!(json["timestamp"], "2026-10-18T14:05:09Z");
        assert_eq!(json["action"], "PUSH");
        assert!(json.get("from_branch").is_none());
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        assert!(parse_timestamp("yesterday").is_err());
        let json = r#"{"request_id":"r","timestamp":"soon","action":"PUSH","author":"a","to_branch":"main"}"#;
        assert!(serde_json::from_str::<RepoEvent>(json).is_err());
    }

    #[test]
    fn test_descriptions() {
        let mut event = push_event();
        assert_eq!(event.description(), "john.doe pushed to main");
        assert!(!event.uses_source_branch());

        event.action = Action::PullRequest;
        event.from_branch = Some("feature/auth".to_string());
        assert_eq!(
            event.description(),
            "john.doe opened a pull request from feature/auth to main"
        );

        event.action = Action::Merge;
        assert_eq!(event.description(), "john.doe merged feature/auth into main");
        assert!(event.uses_source_branch());
    }

    #[test]
    fn test_key_distinguishes_action() {
        let push = push_event();
        let mut merge = push_event();
        merge.action = Action::Merge;
        assert_ne!(push.key(), merge.key());
        assert_eq!(push.key(), push_event().key());
    }

    #[test]
    fn test_format_age() {
        let now = at(14, 0, 0);
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now - Duration::seconds(90), now), "just now");
        assert_eq!(format_age(now + Duration::minutes(5), now), "just now");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_age(now - Duration::minutes(59), now), "59m ago");
        assert_eq!(format_age(now - Duration::minutes(90), now), "1h ago");
        assert_eq!(format_age(now - Duration::hours(23), now), "23h ago");
        assert_eq!(format_age(now - Duration::hours(50), now), "2d ago");
    }

    #[test]
    fn test_format_full() {
        assert_eq!(format_full(at(14, 5, 9)), "Oct 18, 2026, 02:05:09 PM UTC");
        assert_eq!(format_full(at(0, 0, 0)), "Oct 18, 2026, 12:00:00 AM UTC");
    }
}
