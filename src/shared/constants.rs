/// Plain-text body served at `GET /`
pub const LIVENESS_MESSAGE: &str = "Clinick API is running...";

/// Header row of the monthly report export
pub const CSV_HEADER: &str = "Role,Patient Name,Location,Incident,Severity,Symptoms,Date";

/// Display format for timestamps in exports and alert emails, e.g. `10/18/2026, 3:04:05 PM`
pub const DISPLAY_DATE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Placeholder for report fields the submitter left out
pub const MISSING_FIELD_PLACEHOLDER: &str = "Unknown";

// =============================================================================
// CLIENT-FACING ERROR MESSAGES
// =============================================================================

pub const ERR_CREATE_REPORT: &str = "Failed to process report";
pub const ERR_LOAD_REPORTS: &str = "Failed to load reports";
pub const ERR_UPDATE_REPORT: &str = "Failed to update report";
pub const ERR_EXPORT_REPORTS: &str = "Failed to export reports";
pub const ERR_SAVE_TOKEN: &str = "Failed to save token";
