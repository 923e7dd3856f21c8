use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single malformed record reported by the CSV parser.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParseDiagnostic {
    /// 1-based line number of the offending record, when known.
    pub line: Option<u64>,
    /// Parser message for the record.
    pub message: String,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// All errors produced by liftlog.
#[derive(Error, Debug)]
pub enum LiftlogError {
    /// The workout CSV (or the directory expected to hold it) does not exist.
    #[error("CSV file not found at path: {}", .0.display())]
    SourceUnavailable(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV document contained one or more malformed records.
    #[error("Error parsing CSV file: {}", summarize(.diagnostics))]
    ParseFailure { diagnostics: Vec<ParseDiagnostic> },

    /// The CSV header row is empty, so there is no column to group by.
    #[error("No columns found in CSV file")]
    NoColumnsFound,

    /// A year/month pair that does not name a calendar month.
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LiftlogError {
    /// `true` for I/O failures that may clear up on a later attempt, such as
    /// a sync job holding the export open while rewriting it.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FileRead { .. } | Self::Io(_))
    }
}

/// Convenience alias used throughout the liftlog crates.
pub type Result<T> = std::result::Result<T, LiftlogError>;

fn summarize(diagnostics: &[ParseDiagnostic]) -> String {
    match diagnostics {
        [] => "unknown error".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_source_unavailable() {
        let err = LiftlogError::SourceUnavailable(PathBuf::from("data/workouts.csv"));
        assert_eq!(err.to_string(), "CSV file not found at path: data/workouts.csv");
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
        let err = LiftlogError::FileRead {
            path: PathBuf::from("/some/workouts.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/workouts.csv"));
        assert!(msg.contains("locked"));
    }

    #[test]
    fn test_error_display_parse_failure_single() {
        let err = LiftlogError::ParseFailure {
            diagnostics: vec![ParseDiagnostic {
                line: Some(4),
                message: "found record with 2 fields, but the previous record has 3 fields"
                    .to_string(),
            }],
        };
        assert_eq!(
            err.to_string(),
            "Error parsing CSV file: line 4: found record with 2 fields, but the previous record has 3 fields"
        );
    }

    #[test]
    fn test_error_display_parse_failure_many() {
        let diag = |line| ParseDiagnostic {
            line: Some(line),
            message: "bad".to_string(),
        };
        let err = LiftlogError::ParseFailure {
            diagnostics: vec![diag(2), diag(5), diag(9)],
        };
        assert_eq!(err.to_string(), "Error parsing CSV file: line 2: bad (and 2 more)");
    }

    #[test]
    fn test_error_display_no_columns() {
        assert_eq!(
            LiftlogError::NoColumnsFound.to_string(),
            "No columns found in CSV file"
        );
    }

    #[test]
    fn test_error_display_invalid_month() {
        let err = LiftlogError::InvalidMonth {
            year: 2024,
            month: 13,
        };
        assert_eq!(err.to_string(), "Invalid month: 2024-13");
    }

    #[test]
    fn test_error_display_config() {
        let err = LiftlogError::Config("max session duration must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: max session duration must be positive"
        );
    }

    #[test]
    fn test_diagnostic_without_line() {
        let diag = ParseDiagnostic {
            line: None,
            message: "stream did not contain valid UTF-8".to_string(),
        };
        assert_eq!(diag.to_string(), "stream did not contain valid UTF-8");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LiftlogError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_only_io_failures_are_transient() {
        let busy = LiftlogError::FileRead {
            path: PathBuf::from("workouts.csv"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "resource busy"),
        };
        assert!(busy.is_transient());
        assert!(!LiftlogError::SourceUnavailable(PathBuf::from("x.csv")).is_transient());
        assert!(!LiftlogError::NoColumnsFound.is_transient());
        assert!(!LiftlogError::ParseFailure {
            diagnostics: Vec::new()
        }
        .is_transient());
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: LiftlogError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
