use std::sync::Arc;

use chrono::{Local, TimeZone};

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Report, ReportFilter};
use crate::features::reports::services::ReportStore;
use crate::shared::constants::CSV_HEADER;
use crate::shared::datetime::display_timestamp;

/// Rendered CSV export ready to be served as an attachment
#[derive(Debug, Clone)]
pub struct ReportExport {
    pub filename: String,
    pub content: String,
}

/// Monthly CSV export of reports
pub struct ExportService {
    report_store: Arc<dyn ReportStore>,
}

impl ExportService {
    pub fn new(report_store: Arc<dyn ReportStore>) -> Self {
        Self { report_store }
    }

    /// Export every report created in the given local calendar month
    pub async fn export_csv(&self, month: Option<u32>, year: Option<i32>) -> Result<ReportExport> {
        let (Some(month), Some(year)) = (month, year) else {
            return Err(AppError::Validation(
                "month and year are required".to_string(),
            ));
        };

        let filter = ReportFilter::month(month, year)?;
        let reports = self.report_store.list(filter).await?;

        tracing::info!(
            "Exporting {} reports for {}-{:02}",
            reports.len(),
            year,
            month
        );

        Ok(ReportExport {
            filename: format!("reports-{}-{:02}.csv", year, month),
            content: reports_to_csv(&reports, &Local),
        })
    }
}

/// Serialize reports under the fixed export header, one row per report
pub fn reports_to_csv<Tz>(reports: &[Report], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut lines = Vec::with_capacity(reports.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for report in reports {
        let date = display_timestamp(&report.created_at, tz);
        let row = [
            report.role.as_deref(),
            report.patient_name.as_deref(),
            report.location.as_deref(),
            report.incident.as_deref(),
            report.severity.as_deref(),
            report.symptoms.as_deref(),
            Some(date.as_str()),
        ]
        .into_iter()
        .map(csv_field)
        .collect::<Vec<_>>()
        .join(",");
        lines.push(row);
    }

    lines.join("\n")
}

/// Quote a single field, doubling embedded quotes
fn csv_field(value: Option<&str>) -> String {
    format!("\"{}\"", value.unwrap_or_default().replace('"', "\"\""))
}
