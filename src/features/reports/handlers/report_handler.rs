use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::reports::dtos::{
    CreateReportDto, CreateReportResponseDto, ReportQueryParams, ReportResponseDto,
};
use crate::features::reports::services::{AlertService, ExportService, ReportStore};
use crate::shared::constants::{ERR_CREATE_REPORT, ERR_LOAD_REPORTS, ERR_UPDATE_REPORT};
use crate::shared::types::ErrorResponse;

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_store: Arc<dyn ReportStore>,
    pub export_service: Arc<ExportService>,
    pub alert_service: Arc<AlertService>,
}

/// Submit an emergency report
///
/// The report is stored first; push and email alerts are dispatched in the
/// background and never affect the response.
#[utoipa::path(
    post,
    path = "/report",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report stored", body = CreateReportResponseDto),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 500, description = "Failed to process report", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn create_report(
    State(state): State<ReportState>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<CreateReportResponseDto>)> {
    let report = state
        .report_store
        .create(&dto.into())
        .await
        .map_err(|e| e.or_storage_failure(ERR_CREATE_REPORT))?;

    state.alert_service.dispatch(&report);

    Ok((
        StatusCode::CREATED,
        Json(CreateReportResponseDto {
            ok: true,
            id: report.id,
        }),
    ))
}

/// List reports, newest first
///
/// Filter either by `since` or by `month` + `year`, not both.
#[utoipa::path(
    get,
    path = "/reports",
    params(ReportQueryParams),
    responses(
        (status = 200, description = "Reports, newest first", body = Vec<ReportResponseDto>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 500, description = "Failed to load reports", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(state): State<ReportState>,
    AppQuery(params): AppQuery<ReportQueryParams>,
) -> Result<Json<Vec<ReportResponseDto>>> {
    let filter = params.into_filter()?;
    let reports = state
        .report_store
        .list(filter)
        .await
        .map_err(|e| e.or_storage_failure(ERR_LOAD_REPORTS))?;

    Ok(Json(reports.into_iter().map(Into::into).collect()))
}

/// Mark a report as seen by the dashboard
#[utoipa::path(
    put,
    path = "/reports/{id}/seen",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Updated report", body = ReportResponseDto),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 500, description = "Failed to update report", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn mark_report_seen(
    State(state): State<ReportState>,
    Path(id): Path<String>,
) -> Result<Json<ReportResponseDto>> {
    // An id that is not a UUID cannot name a stored report
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::NotFound(format!("Report {} not found", id)))?;

    let report = state
        .report_store
        .mark_seen(id)
        .await
        .map_err(|e| e.or_storage_failure(ERR_UPDATE_REPORT))?;

    Ok(Json(report.into()))
}
