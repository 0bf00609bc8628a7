use utoipa::{Modify, OpenApi};

use crate::features::devices::{dtos as devices_dtos, handlers as devices_handlers};
use crate::features::health::handlers as health_handlers;
use crate::features::reports::{dtos as reports_dtos, handlers as reports_handlers};
use crate::shared::types::{ErrorResponse, OkResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health_handlers::liveness,
        health_handlers::health_check,
        // Reports
        reports_handlers::report_handler::create_report,
        reports_handlers::report_handler::list_reports,
        reports_handlers::report_handler::mark_report_seen,
        reports_handlers::export_handler::export_reports,
        // Devices
        devices_handlers::device_handler::save_token,
    ),
    components(
        schemas(
            // Shared
            OkResponse,
            ErrorResponse,
            // Reports
            reports_dtos::CreateReportDto,
            reports_dtos::CreateReportResponseDto,
            reports_dtos::ReportResponseDto,
            // Devices
            devices_dtos::SaveTokenDto,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "reports", description = "Emergency report intake, review and export"),
        (name = "devices", description = "Push notification device registry"),
    ),
    info(
        title = "Clinick API",
        version = "0.1.0",
        description = "API documentation for Clinick",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
