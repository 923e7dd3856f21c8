use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name the mail sync job writes the export to.
pub const DEFAULT_CSV_NAME: &str = "strong_workouts.csv";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the `~/.liftlog/` directory hierarchy exists.
pub fn ensure_directories() -> anyhow::Result<()> {
    ensure_directories_in(&home_dir())
}

/// Create `.liftlog/`, `.liftlog/logs/` and `.liftlog/data/` under `home`.
pub fn ensure_directories_in(home: &Path) -> anyhow::Result<()> {
    let app_dir = home.join(".liftlog");
    std::fs::create_dir_all(app_dir.join("logs"))?;
    std::fs::create_dir_all(app_dir.join("data"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name to an [`EnvFilter`] directive.
fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to stderr, and additionally (without colours) to `log_file`
/// when one is given. Unrecognised levels fall back to `"info"`.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate the workout export when no path was configured.
///
/// Checks `./data/strong_workouts.csv`, then
/// `~/.liftlog/data/strong_workouts.csv`, and returns the first that exists.
pub fn discover_data_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    discover_data_path_in(&cwd, &home_dir())
}

/// [`discover_data_path`] against explicit working and home directories.
pub fn discover_data_path_in(cwd: &Path, home: &Path) -> Option<PathBuf> {
    let candidates = [
        cwd.join("data").join(DEFAULT_CSV_NAME),
        home.join(".liftlog").join("data").join(DEFAULT_CSV_NAME),
    ];
    candidates.into_iter().find(|p| p.exists())
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
