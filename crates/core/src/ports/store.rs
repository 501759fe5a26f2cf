use crate::domain::RepoEvent;
use anyhow::Result;

/// Port for storing received webhook events
pub trait EventStore: Send + Sync {
    /// Record a new event
    fn insert(&self, event: RepoEvent) -> Result<()>;

    /// All stored events, latest first, optionally truncated to `limit`
    fn latest(&self, limit: Option<usize>) -> Result<Vec<RepoEvent>>;

    /// Number of stored events
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
