use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::reports::ReportStore;
use crate::shared::constants::LIVENESS_MESSAGE;
use crate::shared::types::{ErrorResponse, OkResponse};

/// Liveness message
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", content_type = "text/plain", body = String)
    ),
    tag = "health"
)]
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// Readiness check that the database answers
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = OkResponse),
        (status = 503, description = "Database unreachable", body = ErrorResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(store): State<Arc<dyn ReportStore>>) -> Result<Json<OkResponse>> {
    store.ping().await?;
    Ok(Json(OkResponse::ok()))
}
