use anyhow::{Context, Result};
use async_trait::async_trait;
use repopulse_core::domain::EventsResponse;
use repopulse_core::ports::{EventSource, FetchReq, FetchedEvents};
use std::time::Duration;
use tracing::debug;

/// Event source that polls the webhook receiver over HTTP
pub struct HttpEventSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEventSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("repopulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch(&self, req: &FetchReq) -> Result<FetchedEvents> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(page) = req.page {
            request = request.query(&[("page", page)]);
        }
        if let Some(per_page) = req.per_page {
            request = request.query(&[("per_page", per_page)]);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("Bad response from {}", self.endpoint))?;

        let body: EventsResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to decode events from {}", self.endpoint))?;

        let (events, page_info) = body.into_parts();
        debug!("Fetched {} events from {}", events.len(), self.endpoint);

        Ok(FetchedEvents { events, page_info })
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
