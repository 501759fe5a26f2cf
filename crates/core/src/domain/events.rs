use super::{envelope::PageInfo, event::RepoEvent};
use chrono::{DateTime, Utc};

/// Where the currently displayed events came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    Live,
    /// Built-in sample data substituted after a failed fetch
    Sample,
}

/// Events emitted by the feed service
#[derive(Debug, Clone)]
pub enum Event {
    /// A fetch against the event source has started
    FetchStarted,

    /// A fresh, normalised event list is available
    EventsLoaded {
        events: Vec<RepoEvent>,
        origin: Origin,
        page_info: Option<PageInfo>,
        at: DateTime<Utc>,
    },

    /// The fetch failed and no fallback was applied
    FetchFailed { msg: String },

    /// The filter selection was written to the state store
    FilterPersisted,

    /// An error occurred
    Error { msg: String },

    /// User requested to quit the application
    QuitRequested,
}
