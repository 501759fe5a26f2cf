//! Webhook receiver: accepts GitHub deliveries and serves the stored activity.

pub mod routes;

use crate::adapters::memory_store::MemoryEventStore;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use repopulse_core::ports::{Clock, EventStore, ServerConfig, SystemClock};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub use routes::ApiError;

/// Shared state handed to every route
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn EventStore>,
    pub clock: Arc<dyn Clock>,
    /// Events returned by an unpaged `GET /webhook/events`
    pub recent_limit: usize,
}

impl ServerState {
    pub fn new(store: Arc<dyn EventStore>, clock: Arc<dyn Clock>, recent_limit: usize) -> Self {
        Self {
            store,
            clock,
            recent_limit,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(MemoryEventStore::new(config.max_events)),
            Arc::new(SystemClock),
            config.recent_limit,
        )
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/webhook/receiver", post(routes::receive_webhook))
        .route("/webhook/events", get(routes::list_events))
        .with_state(state)
}

/// Serve on an already bound listener until the future is dropped
pub async fn serve_on(listener: TcpListener, state: ServerState) -> Result<()> {
    axum::serve(listener, router(state))
        .await
        .context("Webhook receiver stopped unexpectedly")
}

/// Bind `config.bind` and run the receiver until Ctrl+C
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Webhook receiver listening on http://{}", listener.local_addr()?);

    let state = ServerState::from_config(config);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down webhook receiver");
        })
        .await
        .context("Webhook receiver stopped unexpectedly")
}
