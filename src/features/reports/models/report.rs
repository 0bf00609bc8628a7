use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::error::Result;
use crate::shared::datetime::month_range;

/// Database model for report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
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

/// Submitted report fields. Every field is optional on intake.
#[derive(Debug, Clone, Default)]
pub struct CreateReport {
    pub role: Option<String>,
    pub patient_name: Option<String>,
    pub location: Option<String>,
    pub incident: Option<String>,
    pub severity: Option<String>,
    pub symptoms: Option<String>,
}

/// Which reports a listing returns. Results are always newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFilter {
    All,
    /// Created strictly after the given instant
    Since(DateTime<Utc>),
    /// Created within `[start, end)`
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl ReportFilter {
    /// Calendar month in server local time
    pub fn month(month: u32, year: i32) -> Result<Self> {
        let (start, end) = month_range(month, year, &chrono::Local)?;
        Ok(Self::Between { start, end })
    }

    #[cfg(test)]
    pub fn matches(&self, created_at: &DateTime<Utc>) -> bool {
        match self {
            ReportFilter::All => true,
            ReportFilter::Since(since) => created_at > since,
            ReportFilter::Between { start, end } => created_at >= start && created_at < end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_since_is_strict() {
        let ts = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        let filter = ReportFilter::Since(ts);
        assert!(!filter.matches(&ts));
        assert!(filter.matches(&(ts + Duration::milliseconds(1))));
    }

    #[test]
    fn test_between_is_half_open() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let filter = ReportFilter::Between { start, end };
        assert!(filter.matches(&start));
        assert!(filter.matches(&(end - Duration::seconds(1))));
        assert!(!filter.matches(&end));
        assert!(!filter.matches(&(start - Duration::seconds(1))));
    }

    #[test]
    fn test_month_filter_covers_local_month() {
        let filter = ReportFilter::month(2, 2024).unwrap();
        let inside = chrono::Local
            .with_ymd_and_hms(2024, 2, 29, 23, 59, 59)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        let outside = chrono::Local
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert!(filter.matches(&inside));
        assert!(!filter.matches(&outside));
    }
}
