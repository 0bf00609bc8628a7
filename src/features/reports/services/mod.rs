mod alert_service;
mod export_service;
mod report_service;

pub use alert_service::AlertService;
pub use export_service::ExportService;
pub use report_service::{ReportService, ReportStore};
