use super::event::{Action, RepoEvent};
use chrono::{DateTime, Duration, Utc};

/// Demo data shown when the event source cannot be reached.
///
/// Timestamps are relative to `now` so the relative ages stay meaningful.
pub fn sample_events(now: DateTime<Utc>) -> Vec<RepoEvent> {
    let rows: [(&str, i64, Action, &str, &str, Option<&str>); 6] = [
        ("req_001", 5, Action::Push, "john.doe", "main", None),
        (
            "req_002",
            15,
            Action::PullRequest,
            "jane.smith",
            "main",
            Some("feature/user-auth"),
        ),
        (
            "req_003",
            30,
            Action::Merge,
            "bob.wilson",
            "main",
            Some("bugfix/login-issue"),
        ),
        ("req_004", 45, Action::Push, "alice.johnson", "develop", None),
        (
            "req_005",
            60,
            Action::PullRequest,
            "charlie.brown",
            "develop",
            Some("feature/dashboard"),
        ),
        (
            "req_006",
            90,
            Action::Merge,
            "david.lee",
            "main",
            Some("hotfix/security-patch"),
        ),
    ];

    rows.into_iter()
        .map(|(id, minutes_ago, action, author, to, from)| RepoEvent {
            request_id: id.to_string(),
            timestamp: now - Duration::minutes(minutes_ago),
            action,
            author: author.to_string(),
            to_branch: to.to_string(),
            from_branch: from.map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sample_events_are_latest_first_and_consistent() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let events = sample_events(now);

        assert_eq!(events.len(), 6);
        assert!(events.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        assert_eq!(events[0].timestamp, now - Duration::minutes(5));

        for event in &events {
            assert_eq!(event.uses_source_branch(), event.from_branch.is_some());
        }
    }
}
