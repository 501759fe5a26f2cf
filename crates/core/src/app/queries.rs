use super::feed::ActivityStats;
use crate::domain::{Event, Origin, PageInfo, RepoEvent};
use chrono::{DateTime, Utc};

/// Read-only projection of the feed for UI consumption
#[derive(Debug, Default)]
pub struct ReadProjection {
    /// Latest event list, already normalised by the service
    pub events: Vec<RepoEvent>,

    /// Whether `events` is live data or the sample fallback
    pub origin: Origin,

    /// Paging info reported by the receiver, if it sent an envelope
    pub page_info: Option<PageInfo>,

    /// Whether a fetch is in flight
    pub loading: bool,

    /// Whether at least one fetch has completed
    pub loaded_once: bool,

    /// Message of the last unmasked fetch failure
    pub last_error: Option<String>,

    pub last_updated: Option<DateTime<Utc>>,
}

impl ReadProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event to update the projection
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::FetchStarted => {
                self.loading = true;
            }

            Event::EventsLoaded {
                events,
                origin,
                page_info,
                at,
            } => {
                self.events = events.clone();
                self.origin = *origin;
                self.page_info = *page_info;
                self.loading = false;
                self.loaded_once = true;
                self.last_error = None;
                self.last_updated = Some(*at);
            }

            Event::FetchFailed { msg } => {
                // Keep showing whatever was loaded before
                self.loading = false;
                self.loaded_once = true;
                self.last_error = Some(msg.clone());
            }

            Event::FilterPersisted | Event::Error { .. } | Event::QuitRequested => {}
        }
    }

    /// Counters over the unfiltered list
    pub fn stats(&self) -> ActivityStats {
        ActivityStats::from_events(&self.events)
    }

    pub fn is_demo(&self) -> bool {
        self.origin == Origin::Sample
    }

    /// Nothing has arrived yet and a fetch is running
    pub fn is_initial_load(&self) -> bool {
        !self.loaded_once && self.events.is_empty()
    }
}
