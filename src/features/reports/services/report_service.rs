use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{CreateReport, Report, ReportFilter};

/// Persistent collection of submitted reports
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a new report with `seen = false` and server-assigned timestamps
    async fn create(&self, data: &CreateReport) -> Result<Report>;

    /// Reports matching `filter`, newest first
    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>>;

    /// Flag a report as acknowledged by the dashboard
    async fn mark_seen(&self, id: Uuid) -> Result<Report>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<()>;
}

/// Postgres-backed report store
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Split a filter into nullable SQL bounds: `(after, from, until)`
fn filter_bounds(
    filter: ReportFilter,
) -> (
    Option<DateTime<Utc>>,
    Option<DateTime<Utc>>,
    Option<DateTime<Utc>>,
) {
    match filter {
        ReportFilter::All => (None, None, None),
        ReportFilter::Since(since) => (Some(since), None, None),
        ReportFilter::Between { start, end } => (None, Some(start), Some(end)),
    }
}

#[async_trait]
impl ReportStore for ReportService {
    async fn create(&self, data: &CreateReport) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (id, role, patient_name, location, incident, severity, symptoms)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, role, patient_name, location, incident, severity, symptoms,
                seen, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&data.role)
        .bind(&data.patient_name)
        .bind(&data.location)
        .bind(&data.incident)
        .bind(&data.severity)
        .bind(&data.symptoms)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create report: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created report: {} (severity: {:?})",
            report.id,
            report.severity
        );

        Ok(report)
    }

    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>> {
        let (after, from, until) = filter_bounds(filter);

        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT
                id, role, patient_name, location, incident, severity, symptoms,
                seen, created_at, updated_at
            FROM reports
            WHERE ($1::timestamptz IS NULL OR created_at > $1)
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(after)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reports: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::debug!("Listed {} reports for {:?}", reports.len(), filter);
        Ok(reports)
    }

    async fn mark_seen(&self, id: Uuid) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports
            SET seen = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, role, patient_name, location, incident, severity, symptoms,
                seen, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark report seen: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        tracing::info!("Marked report seen: {}", id);
        Ok(report)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("Database unreachable: {}", e)))?;
        Ok(())
    }
}
