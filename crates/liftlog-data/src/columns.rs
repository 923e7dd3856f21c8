//! Best-effort detection of the column that carries the workout date.

use liftlog_core::error::{LiftlogError, Result};
use tracing::debug;

/// Header names recognised as the date column, in priority order.
pub const DATE_COLUMN_CANDIDATES: &[&str] =
    &["Date", "date", "DATE", "created_at", "timestamp", "Timestamp"];

/// Pick the date column from `headers`.
///
/// The first header (in file order) that appears in
/// [`DATE_COLUMN_CANDIDATES`] wins; otherwise the first header is assumed to
/// be the date. An empty header row is [`LiftlogError::NoColumnsFound`].
pub fn detect_date_column(headers: &[String]) -> Result<String> {
    if let Some(found) = headers
        .iter()
        .find(|h| DATE_COLUMN_CANDIDATES.contains(&h.as_str()))
    {
        return Ok(found.clone());
    }

    match headers.first() {
        Some(first) => {
            debug!("No known date column; falling back to \"{}\"", first);
            Ok(first.clone())
        }
        None => Err(LiftlogError::NoColumnsFound),
    }
}
