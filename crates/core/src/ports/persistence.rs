use crate::app::ActionFilter;
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/webhook/events";

/// Configuration store interface
pub trait ConfigStore: Send + Sync {
    /// Load configuration from storage
    fn load(&self) -> Result<AppConfig>;

    /// Save configuration to storage
    fn save(&self, config: &AppConfig) -> Result<()>;
}

/// State store interface (UI state that survives restarts)
pub trait StateStore: Send + Sync {
    /// Load cached state, `None` if nothing was saved yet
    fn load_state(&self) -> Result<Option<CachedState>>;

    /// Save state to cache
    fn save_state(&self, state: &CachedState) -> Result<()>;
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub source: SourceConfig,
    pub ui: UiConfig,
    pub server: ServerConfig,
}

/// Where and how often the dashboard polls for events
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub poll_interval: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub request_timeout: Duration,
    /// Show built-in sample data when the endpoint cannot be reached
    pub fallback_to_sample: bool,
    pub dedupe: bool,
    /// Ask the receiver for a paged envelope of this size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_page_size: Option<usize>,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub page_size: usize,
    pub remember_filter: bool,
}

/// Webhook receiver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Events returned by an unpaged `GET /webhook/events`
    pub recent_limit: usize,
    /// Oldest events are dropped past this many
    pub max_events: usize,
}

/// Cached application state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachedState {
    pub filter: ActionFilter,
}

impl AppConfig {
    /// Reject values the feed service and receiver cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.source.poll_interval.is_zero(),
            "source.poll_interval must be at least one second"
        );
        ensure!(
            !self.source.request_timeout.is_zero(),
            "source.request_timeout must be at least one second"
        );
        ensure!(self.ui.page_size > 0, "ui.page_size must be at least 1");
        if let Some(size) = self.source.server_page_size {
            ensure!(size > 0, "source.server_page_size must be at least 1");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            source: SourceConfig::default(),
            ui: UiConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: Duration::from_secs(15),
            request_timeout: Duration::from_secs(10),
            fallback_to_sample: true,
            dedupe: true,
            server_page_size: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            remember_filter: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            recent_limit: 10,
            max_events: 1000,
        }
    }
}
