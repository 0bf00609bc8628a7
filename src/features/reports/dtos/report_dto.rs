use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{CreateReport, Report, ReportFilter};

/// Request DTO for submitting a report
///
/// Fields are only checked for presence downstream; a report with missing
/// fields is still accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportDto {
    /// Submitter category, e.g. "clinic" or "reporter"
    pub role: Option<String>,
    pub patient_name: Option<String>,
    pub location: Option<String>,
    pub incident: Option<String>,
    /// Informal severity label, e.g. "high"
    pub severity: Option<String>,
    pub symptoms: Option<String>,
}

impl From<CreateReportDto> for CreateReport {
    fn from(dto: CreateReportDto) -> Self {
        Self {
            role: dto.role,
            patient_name: dto.patient_name,
            location: dto.location,
            incident: dto.incident,
            severity: dto.severity,
            symptoms: dto.symptoms,
        }
    }
}

/// Response for a successful submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateReportResponseDto {
    pub ok: bool,
    pub id: Uuid,
}

/// Report as served to the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponseDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub role: Option<String>,
    pub patient_name: Option<String>,
    pub location: Option<String>,
    pub incident: Option<String>,
    pub severity: Option<String>,
    pub symptoms: Option<String>,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            role: r.role,
            patient_name: r.patient_name,
            location: r.location,
            incident: r.incident,
            severity: r.severity,
            symptoms: r.symptoms,
            seen: r.seen,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Listing filters. `since` and `month`/`year` are mutually exclusive.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
pub struct ReportQueryParams {
    /// Only reports created strictly after this instant (RFC 3339)
    pub since: Option<DateTime<Utc>>,

    /// Calendar month (1-12), requires `year`
    #[validate(range(min = 1, max = 12, message = "month must be between 1 and 12"))]
    #[param(minimum = 1, maximum = 12)]
    pub month: Option<u32>,

    /// Calendar year, requires `month`
    pub year: Option<i32>,
}

impl ReportQueryParams {
    pub fn into_filter(self) -> Result<ReportFilter> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        match (self.since, self.month, self.year) {
            (None, None, None) => Ok(ReportFilter::All),
            (Some(since), None, None) => Ok(ReportFilter::Since(since)),
            (None, Some(month), Some(year)) => ReportFilter::month(month, year),
            (Some(_), _, _) => Err(AppError::Validation(
                "since cannot be combined with month/year".to_string(),
            )),
            (None, _, _) => Err(AppError::Validation(
                "month and year must be provided together".to_string(),
            )),
        }
    }
}

/// Export query; both parameters are required
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ExportQueryParams {
    /// Calendar month (1-12)
    #[param(minimum = 1, maximum = 12)]
    pub month: Option<u32>,
    /// Calendar year
    pub year: Option<i32>,
}
