use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::health::handlers;
use crate::features::reports::ReportStore;

/// Liveness and readiness routes (no auth)
pub fn routes(store: Arc<dyn ReportStore>) -> Router {
    Router::new()
        .route("/", get(handlers::liveness))
        .route("/health", get(handlers::health_check))
        .with_state(store)
}
