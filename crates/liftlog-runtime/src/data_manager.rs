//! Retrying data manager for the dashboard runtime.
//!
//! Wraps [`load_table`] and [`build_report`] with transparent retry logic.
//! The workout export may be rewritten by a sync job at any moment, so
//! transient I/O failures are retried up to three times with back-off
//! before the error is surfaced. Nothing is cached: every call reads the
//! source again.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use liftlog_core::error::Result;
use liftlog_core::models::{CsvTable, DashboardReport};
use liftlog_data::analysis::{build_report, ReportRequest};
use liftlog_data::reader::load_table;

/// Maximum number of load attempts before the error is returned.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── DataManager ───────────────────────────────────────────────────────────────

/// Loads the workout CSV with retry and turns it into reports.
///
/// # Example
/// ```no_run
/// use liftlog_core::settings::DashboardConfig;
/// use liftlog_data::analysis::ReportRequest;
/// use liftlog_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new("data/strong_workouts.csv");
/// let today = chrono::Local::now().date_naive();
/// let request = ReportRequest::for_today(today, DashboardConfig::default());
/// if let Ok(report) = mgr.report(&request) {
///     println!("{} workout days", report.total_groups);
/// }
/// ```
pub struct DataManager {
    /// CSV file, or directory holding exports.
    source: PathBuf,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
    /// When the last *successful* load completed.
    last_successful_fetch: Option<Instant>,
}

impl DataManager {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            last_error: None,
            last_successful_fetch: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Load the source and build a report for `request`.
    pub fn report(&mut self, request: &ReportRequest) -> Result<DashboardReport> {
        let table = self.load_table()?;
        let report = build_report(&table, request);
        if let Err(e) = &report {
            self.last_error = Some(e.to_string());
        }
        report
    }

    /// Load and parse the source, retrying transient failures.
    pub fn load_table(&mut self) -> Result<CsvTable> {
        let source = self.source.clone();
        match fetch_with_retry(|| load_table(&source)) {
            Ok(table) => {
                tracing::debug!(
                    rows = table.rows.len(),
                    source = %source.display(),
                    "workout table loaded"
                );
                self.last_successful_fetch = Some(Instant::now());
                self.last_error = None;
                Ok(table)
            }
            Err(e) => {
                tracing::warn!(error = %e, "loading workout data failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Human-readable description of the last failure, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Time since the last successful load, or `None` if there was none.
    pub fn last_fetch_age(&self) -> Option<Duration> {
        self.last_successful_fetch.map(|ts| ts.elapsed())
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Run `op` up to [`MAX_RETRY_ATTEMPTS`] times while it fails transiently.
///
/// Back-off schedule: attempt 1 → 0 ms, attempt 2 → 100 ms, attempt 3 → 200 ms.
/// Permanent failures (missing source, malformed CSV) return immediately.
fn fetch_with_retry<T>(mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            let sleep_ms = u64::from(attempt) * 100;
            tracing::debug!(attempt, sleep_ms, "retrying load after back-off");
            thread::sleep(Duration::from_millis(sleep_ms));
        }

        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt + 1 < MAX_RETRY_ATTEMPTS => {
                tracing::warn!(attempt, error = %e, "load attempt failed");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use liftlog_core::error::LiftlogError;
    use liftlog_core::settings::DashboardConfig;
    use std::cell::Cell;

    const EXPORT: &str = "\
Date,Exercise Name,Weight,Reps,Duration
2024-03-02 08:00:00,Squat,100,5,50m
2024-03-02 08:00:00,Squat,100,5,50m
";

    fn busy() -> LiftlogError {
        LiftlogError::FileRead {
            path: PathBuf::from("strong_workouts.csv"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "resource busy"),
        }
    }

    fn request() -> ReportRequest {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        ReportRequest::for_today(today, DashboardConfig::default())
    }

    // ── fetch_with_retry ──────────────────────────────────────────────────

    #[test]
    fn test_retry_recovers_from_transient_failure() {
        let calls = Cell::new(0);
        let result = fetch_with_retry(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(busy())
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retry_gives_up_after_three_attempts() {
        let calls = Cell::new(0);
        let started = Instant::now();
        let result: Result<()> = fetch_with_retry(|| {
            calls.set(calls.get() + 1);
            Err(busy())
        });
        assert!(matches!(result, Err(LiftlogError::FileRead { .. })));
        assert_eq!(calls.get(), 3);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[test]
    fn test_permanent_failure_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = fetch_with_retry(|| {
            calls.set(calls.get() + 1);
            Err(LiftlogError::NoColumnsFound)
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    // ── DataManager ───────────────────────────────────────────────────────

    #[test]
    fn test_report_from_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("strong_workouts.csv");
        std::fs::write(&path, EXPORT).unwrap();

        let mut mgr = DataManager::new(&path);
        let report = mgr.report(&request()).expect("report");

        assert_eq!(report.total_rows, 2);
        assert_eq!(report.this_month_session_count, 1);
        assert!(mgr.last_error().is_none());
        assert!(mgr.last_fetch_age().expect("fetched") < Duration::from_secs(5));
    }

    #[test]
    fn test_missing_source_records_error() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut mgr = DataManager::new(dir.path().join("missing.csv"));

        let err = mgr.report(&request()).unwrap_err();
        assert!(matches!(err, LiftlogError::SourceUnavailable(_)));
        assert!(mgr.last_error().unwrap().contains("CSV file not found"));
        assert!(mgr.last_fetch_age().is_none());
    }

    #[test]
    fn test_error_cleared_after_success() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("strong_workouts.csv");
        let mut mgr = DataManager::new(&path);

        assert!(mgr.load_table().is_err());
        assert!(mgr.last_error().is_some());

        std::fs::write(&path, EXPORT).unwrap();
        assert!(mgr.load_table().is_ok());
        assert!(mgr.last_error().is_none());
    }

    #[test]
    fn test_empty_file_reports_no_columns() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("strong_workouts.csv");
        std::fs::write(&path, "").unwrap();

        let mut mgr = DataManager::new(&path);
        assert!(matches!(
            mgr.report(&request()),
            Err(LiftlogError::NoColumnsFound)
        ));
        assert_eq!(mgr.last_error(), Some("No columns found in CSV file"));
    }
}
