use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::devices::handlers;
use crate::features::devices::services::DeviceTokenStore;

/// Create routes for the devices feature
pub fn routes(store: Arc<dyn DeviceTokenStore>) -> Router {
    Router::new()
        .route("/save-token", post(handlers::save_token))
        .with_state(store)
}
