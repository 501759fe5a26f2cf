use super::event::RepoEvent;
use serde::{Deserialize, Serialize};

/// Server-side paging information carried by the paged response shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

/// Body of `GET /webhook/events`.
///
/// The receiver answers either with a bare array of events or, when a page is
/// requested, with a `{results, page, total_pages, total_count}` envelope.
/// Clients accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventsResponse {
    Paged {
        results: Vec<RepoEvent>,
        #[serde(flatten)]
        info: PageInfo,
    },
    Bare(Vec<RepoEvent>),
}

impl EventsResponse {
    pub fn into_parts(self) -> (Vec<RepoEvent>, Option<PageInfo>) {
        match self {
            EventsResponse::Paged { results, info } => (results, Some(info)),
            EventsResponse::Bare(events) => (events, None),
        }
    }
}
