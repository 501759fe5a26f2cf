//! Translation of GitHub webhook deliveries into activity events.

use super::event::{Action, RepoEvent};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct Pusher {
    name: String,
}

#[derive(Deserialize, Debug)]
struct PushPayload {
    after: String,
    #[serde(rename = "ref")]
    ref_: String,
    pusher: Pusher,
}

#[derive(Deserialize, Debug)]
struct User {
    login: String,
}

#[derive(Deserialize, Debug)]
struct BranchRef {
    #[serde(rename = "ref")]
    ref_: String,
}

#[derive(Deserialize, Debug)]
struct PullRequest {
    id: u64,
    user: User,
    head: BranchRef,
    base: BranchRef,
    #[serde(default)]
    merged: Option<bool>,
}

#[derive(Deserialize, Debug)]
struct PullRequestPayload {
    action: String,
    pull_request: PullRequest,
}

/// Parse a webhook delivery of the given `X-GitHub-Event` kind.
///
/// Returns `Ok(None)` for deliveries that carry no dashboard activity.
pub fn parse_github_event(
    kind: &str,
    body: &[u8],
    received_at: DateTime<Utc>,
) -> Result<Option<RepoEvent>> {
    match kind {
        "push" => {
            let payload: PushPayload = decode(kind, body)?;
            Ok(Some(RepoEvent {
                request_id: payload.after,
                timestamp: received_at,
                action: Action::Push,
                author: payload.pusher.name,
                to_branch: branch_name(&payload.ref_).to_string(),
                from_branch: None,
            }))
        }
        "pull_request" => {
            let payload: PullRequestPayload = decode(kind, body)?;
            let action = match payload.action.as_str() {
                "opened" => Action::PullRequest,
                "closed" if payload.pull_request.merged == Some(true) => Action::Merge,
                _ => return Ok(None),
            };
            let pr = payload.pull_request;
            Ok(Some(RepoEvent {
                request_id: pr.id.to_string(),
                timestamp: received_at,
                action,
                author: pr.user.login,
                to_branch: pr.base.ref_,
                from_branch: Some(pr.head.ref_),
            }))
        }
        _ => Ok(None),
    }
}

/// `refs/heads/feature/x` -> `feature/x`; other refs keep their last segment
fn branch_name(git_ref: &str) -> &str {
    match git_ref.strip_prefix("refs/heads/") {
        Some(branch) => branch,
        None => git_ref.rsplit('/').next().unwrap_or(git_ref),
    }
}

fn decode<'a, T: Deserialize<'a>>(kind: &str, body: &'a [u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| CoreError::MalformedPayload {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}
