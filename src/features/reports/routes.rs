use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};

/// Create routes for the reports feature
pub fn routes(state: ReportState) -> Router {
    Router::new()
        .route("/report", post(handlers::create_report))
        .route("/reports", get(handlers::list_reports))
        .route("/reports/{id}/seen", put(handlers::mark_report_seen))
        .route("/export-reports", get(handlers::export_reports))
        .with_state(state)
}
