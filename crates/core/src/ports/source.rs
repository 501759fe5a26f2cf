use crate::domain::{PageInfo, RepoEvent};
use anyhow::Result;
use async_trait::async_trait;

/// Request for a batch of events
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchReq {
    /// Server-side page to ask for; `None` asks for the plain recent list
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Result of a successful fetch, as delivered by the source
#[derive(Clone, Debug, Default)]
pub struct FetchedEvents {
    pub events: Vec<RepoEvent>,
    pub page_info: Option<PageInfo>,
}

/// Port for loading activity events
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch(&self, req: &FetchReq) -> Result<FetchedEvents>;

    /// Short human readable description (endpoint URL, "sample data", ...)
    fn describe(&self) -> String;
}
