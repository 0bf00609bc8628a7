//! In-memory stores standing in for Postgres in handler and service tests,
//! plus a loopback HTTP stub for outbound clients

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::devices::services::{normalize_token, DeviceTokenStore};
use crate::features::reports::models::{CreateReport, Report, ReportFilter};
use crate::features::reports::services::ReportStore;

fn unavailable() -> AppError {
    AppError::Database(sqlx::Error::PoolTimedOut)
}

/// Serve `router` on an ephemeral loopback port and return its base URL
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

/// Report with only server-assigned fields populated
pub fn report_at(created_at: DateTime<Utc>) -> Report {
    Report {
        id: Uuid::now_v7(),
        role: None,
        patient_name: None,
        location: None,
        incident: None,
        severity: None,
        symptoms: None,
        seen: false,
        created_at,
        updated_at: created_at,
    }
}

#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<Vec<Report>>,
    fail: AtomicBool,
}

impl InMemoryReportStore {
    pub fn with_reports(reports: Vec<Report>) -> Self {
        Self {
            reports: RwLock::new(reports),
            fail: AtomicBool::new(false),
        }
    }

    /// Every call fails as if the database were down
    pub fn failing() -> Self {
        Self {
            reports: RwLock::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn create(&self, data: &CreateReport) -> Result<Report> {
        self.check()?;
        let mut reports = self.reports.write().await;

        // Keep creation order observable even when the clock does not advance
        let mut created_at = Utc::now();
        if let Some(latest) = reports.iter().map(|r| r.created_at).max() {
            if created_at <= latest {
                created_at = latest + Duration::microseconds(1);
            }
        }

        let report = Report {
            role: data.role.clone(),
            patient_name: data.patient_name.clone(),
            location: data.location.clone(),
            incident: data.incident.clone(),
            severity: data.severity.clone(),
            symptoms: data.symptoms.clone(),
            ..report_at(created_at)
        };
        reports.push(report.clone());
        Ok(report)
    }

    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>> {
        self.check()?;
        let mut reports: Vec<Report> = self
            .reports
            .read()
            .await
            .iter()
            .filter(|r| filter.matches(&r.created_at))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reports)
    }

    async fn mark_seen(&self, id: Uuid) -> Result<Report> {
        self.check()?;
        let mut reports = self.reports.write().await;
        let report = reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;
        report.seen = true;
        report.updated_at = Utc::now();
        Ok(report.clone())
    }

    async fn ping(&self) -> Result<()> {
        self.check()
            .map_err(|e| AppError::ServiceUnavailable(format!("Database unreachable: {}", e)))
    }
}

#[derive(Default)]
pub struct InMemoryDeviceTokenStore {
    tokens: RwLock<Vec<String>>,
    fail: AtomicBool,
}

impl InMemoryDeviceTokenStore {
    pub fn failing() -> Self {
        Self {
            tokens: RwLock::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceTokenStore for InMemoryDeviceTokenStore {
    async fn register_if_absent(&self, token: &str) -> Result<bool> {
        let token = normalize_token(token)?;
        self.check()?;

        let mut tokens = self.tokens.write().await;
        if tokens.iter().any(|t| t == token) {
            return Ok(false);
        }
        tokens.push(token.to_string());
        Ok(true)
    }

    async fn all_tokens(&self) -> Result<Vec<String>> {
        self.check()?;
        Ok(self.tokens.read().await.clone())
    }
}
