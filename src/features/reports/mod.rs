//! Emergency report intake, listing and export.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/report` | Submit a report, then alert devices and email in the background |
//! | GET | `/reports` | List reports newest first, by `since` or `month` + `year` |
//! | PUT | `/reports/{id}/seen` | Mark a report as seen |
//! | GET | `/export-reports` | Download one month of reports as CSV |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use handlers::ReportState;
pub use services::{AlertService, ExportService, ReportService, ReportStore};
