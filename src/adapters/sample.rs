use anyhow::Result;
use async_trait::async_trait;
use repopulse_core::domain::sample_events;
use repopulse_core::ports::{Clock, EventSource, FetchReq, FetchedEvents};
use std::sync::Arc;

/// Event source serving the built-in demo data
pub struct SampleEventSource {
    clock: Arc<dyn Clock>,
}

impl SampleEventSource {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl EventSource for SampleEventSource {
    async fn fetch(&self, _req: &FetchReq) -> Result<FetchedEvents> {
        Ok(FetchedEvents {
            events: sample_events(self.clock.now()),
            page_info: None,
        })
    }

    fn describe(&self) -> String {
        "sample data".to_string()
    }
}
