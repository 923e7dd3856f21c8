//! Workout CSV discovery and loading.
//!
//! Resolves the configured source (a file, or a directory of exports) and
//! parses it into a [`CsvTable`] for downstream aggregation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use liftlog_core::error::{LiftlogError, ParseDiagnostic, Result};
use liftlog_core::models::{CsvTable, WorkoutRow};
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `dir`, sorted by path.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Data path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Resolve the configured source to a single CSV file.
///
/// A file path is returned as-is. For a directory the most recently modified
/// `.csv` beneath it is chosen (ties broken by path). A missing path, or a
/// directory without CSVs, is [`LiftlogError::SourceUnavailable`].
pub fn resolve_source(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(LiftlogError::SourceUnavailable(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }

    let newest = find_csv_files(path)
        .into_iter()
        .map(|file| {
            let modified = std::fs::metadata(&file)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, file)
        })
        .max();

    match newest {
        Some((_, file)) => {
            debug!("Using newest CSV {} from {}", file.display(), path.display());
            Ok(file)
        }
        None => Err(LiftlogError::SourceUnavailable(path.to_path_buf())),
    }
}

/// Read a CSV file into memory.
pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LiftlogError::SourceUnavailable(path.to_path_buf())
        } else {
            LiftlogError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Parse CSV text whose first record is the header row.
///
/// Blank lines are skipped. Every malformed record (for example one with a
/// different number of fields than the header) is collected, and any
/// malformed record fails the whole parse with
/// [`LiftlogError::ParseFailure`].
pub fn parse_csv(text: &str) -> Result<CsvTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LiftlogError::ParseFailure {
            diagnostics: vec![diagnostic(&e)],
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<WorkoutRow> = Vec::new();
    let mut diagnostics: Vec<ParseDiagnostic> = Vec::new();

    for result in reader.records() {
        match result {
            Ok(record) => {
                rows.push(WorkoutRow::from_pairs(
                    headers.iter().cloned().zip(record.iter().map(str::to_string)),
                ));
            }
            Err(e) => diagnostics.push(diagnostic(&e)),
        }
    }

    if !diagnostics.is_empty() {
        warn!("CSV parse produced {} error(s)", diagnostics.len());
        return Err(LiftlogError::ParseFailure { diagnostics });
    }

    debug!(
        "Parsed {} rows with {} columns",
        rows.len(),
        headers.len()
    );

    Ok(CsvTable { headers, rows })
}

/// Resolve, read and parse the workout CSV at `path`.
pub fn load_table(path: &Path) -> Result<CsvTable> {
    let file = resolve_source(path)?;
    let text = read_source(&file)?;
    parse_csv(&text)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn diagnostic(e: &csv::Error) -> ParseDiagnostic {
    let message = match e.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {} fields, found {}", expected_len, len),
        _ => e.to_string(),
    };
    ParseDiagnostic {
        line: e.position().map(|p| p.line()),
        message,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
