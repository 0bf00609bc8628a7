use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::reports::dtos::ExportQueryParams;
use crate::features::reports::handlers::ReportState;
use crate::shared::constants::ERR_EXPORT_REPORTS;
use crate::shared::types::ErrorResponse;

/// Download a month of reports as CSV
#[utoipa::path(
    get,
    path = "/export-reports",
    params(ExportQueryParams),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 400, description = "month or year missing", body = ErrorResponse),
        (status = 500, description = "Failed to export reports", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn export_reports(
    State(state): State<ReportState>,
    AppQuery(params): AppQuery<ExportQueryParams>,
) -> Result<Response> {
    let export = state
        .export_service
        .export_csv(params.month, params.year)
        .await
        .map_err(|e| e.or_storage_failure(ERR_EXPORT_REPORTS))?;

    let disposition = format!("attachment; filename=\"{}\"", export.filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}
