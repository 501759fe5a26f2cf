use super::ServerState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use repopulse_core::app::paginate;
use repopulse_core::domain::{parse_github_event, EventsResponse, PageInfo};
use repopulse_core::CoreError;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

const EVENT_HEADER: &str = "x-github-event";
const DEFAULT_PER_PAGE: usize = 10;

/// Errors a route can answer with
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(e) => {
                error!("Request failed: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// `POST /webhook/receiver`
pub async fn receive_webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let kind = headers
        .get(EVENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let parsed = match parse_github_event(kind, &body, state.clock.now()) {
        Ok(parsed) => parsed,
        Err(e @ CoreError::MalformedPayload { .. }) => {
            warn!("Rejected {} delivery: {}", kind, e);
            return Err(ApiError::BadRequest(e.to_string()));
        }
        Err(e) => return Err(ApiError::Internal(e.into())),
    };

    match parsed {
        Some(event) => {
            info!("Stored {}", event);
            state.store.insert(event)?;
            Ok((StatusCode::CREATED, Json(json!({ "status": "stored" }))))
        }
        None => {
            debug!("Ignored delivery of kind {:?}", kind);
            Ok((StatusCode::OK, Json(json!({ "message": "Event ignored" }))))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// `GET /webhook/events`
pub async fn list_events(
    State(state): State<ServerState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let Some(page) = query.page else {
        let events = state.store.latest(Some(state.recent_limit))?;
        return Ok(Json(EventsResponse::Bare(events)));
    };

    let all = state.store.latest(None)?;
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
    let page = paginate(&all, page, per_page);

    Ok(Json(EventsResponse::Paged {
        results: page.items.to_vec(),
        info: PageInfo {
            page: page.page,
            total_pages: page.total_pages,
            total_count: page.total_count,
        },
    }))
}
