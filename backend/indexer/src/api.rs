//! Axum REST API handlers.
//!
//! | Route                      | Returns                                   |
//! |----------------------------|-------------------------------------------|
//! | `GET /health`              | liveness + crate version                  |
//! | `GET /events`              | every indexed event                       |
//! | `GET /reports/:id/events`  | submission, approvals, verification of one report |
//! | `GET /donations`           | every `donation_received` event           |
//! | `GET /actors/:address/events` | events acted by / affecting `address` |

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::db;
use crate::errors::IndexerError;
use crate::events::EventRecord;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/reports/:id/events", get(get_report_events))
        .route("/donations", get(get_donations))
        .route("/actors/:address/events", get(get_actor_events))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ReportEventsResponse {
    pub report_id: u64,
    pub verified: bool,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct ActorEventsResponse {
    pub actor: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct EventListResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for IndexerError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            warn!("API request failed: {self}");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, IndexerError>;

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> ApiResult<EventListResponse> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(EventListResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /reports/:id/events`
///
/// `verified` is derived from whether a `report_verified` event was indexed.
pub async fn get_report_events(
    State(state): State<Arc<ApiState>>,
    Path(report_id): Path<String>,
) -> ApiResult<ReportEventsResponse> {
    let report_id: u64 = report_id
        .parse()
        .map_err(|_| IndexerError::BadRequest(format!("invalid report id: {report_id}")))?;

    let events = db::get_events_for_report(&state.pool, report_id).await?;
    let verified = events.iter().any(|e| e.event_type == "report_verified");
    Ok(Json(ReportEventsResponse {
        report_id,
        verified,
        count: events.len(),
        events,
    }))
}

/// `GET /donations`
pub async fn get_donations(State(state): State<Arc<ApiState>>) -> ApiResult<EventListResponse> {
    let events = db::get_donation_events(&state.pool).await?;
    Ok(Json(EventListResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /actors/:address/events`
pub async fn get_actor_events(
    State(state): State<Arc<ApiState>>,
    Path(actor): Path<String>,
) -> ApiResult<ActorEventsResponse> {
    let events = db::get_events_for_actor(&state.pool, &actor).await?;
    Ok(Json(ActorEventsResponse {
        actor,
        count: events.len(),
        events,
    }))
}
