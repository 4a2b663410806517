//! Event collection handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use lendstats_core::{Acknowledgement, LendingEvent, LoginEvent, RawId};

use crate::error::ApiError;
use crate::state::AppState;

/// Borrow or return event.
///
/// Identifiers may be JSON strings or integers. Fields are optional here so
/// that an absent one is reported as a missing parameter rather than a
/// deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LendingRequest {
    /// Book identifier.
    pub book_id: Option<RawId>,
    /// User identifier.
    pub user_id: Option<RawId>,
    /// Client-side event time. Logged only; partitioning uses ingest time.
    pub timestamp: Option<serde_json::Value>,
}

/// Login event.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// User identifier.
    pub user_id: Option<RawId>,
    /// Display name, informational only.
    pub username: Option<String>,
}

/// Unwrap a request body.
///
/// A request without a JSON content type is read as an empty object, so the
/// first required field is reported missing. Any other rejection is a bad
/// request.
fn payload<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected event body");
            Err(ApiError::BadRequest(rejection.body_text()))
        }
    }
}

/// Record a borrow event.
pub async fn collect_borrow(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LendingRequest>, JsonRejection>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let body = payload(body)?;
    if let Some(client_ts) = &body.timestamp {
        tracing::debug!(client_timestamp = %client_ts, "Borrow event carries client timestamp");
    }
    let event = LendingEvent::from_raw(body.book_id, body.user_id)?;
    let recorded = state.ingestor.record_borrow(&event).await?;

    Ok(Json(Acknowledgement::ok(
        "Borrow event recorded",
        recorded.timestamp,
    )))
}

/// Record a return event.
pub async fn collect_return(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LendingRequest>, JsonRejection>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let body = payload(body)?;
    if let Some(client_ts) = &body.timestamp {
        tracing::debug!(client_timestamp = %client_ts, "Return event carries client timestamp");
    }
    let event = LendingEvent::from_raw(body.book_id, body.user_id)?;
    let recorded = state.ingestor.record_return(&event).await?;

    Ok(Json(Acknowledgement::ok(
        "Return event recorded",
        recorded.timestamp,
    )))
}

/// Record a login event.
pub async fn collect_login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let body = payload(body)?;
    let event = LoginEvent::from_raw(body.user_id, body.username)?;
    let recorded = state.ingestor.record_login(&event).await?;

    Ok(Json(Acknowledgement::ok(
        "Login event recorded",
        recorded.timestamp,
    )))
}
