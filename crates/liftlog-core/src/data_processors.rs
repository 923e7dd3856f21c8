use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::debug;

// ── NumberParser ──────────────────────────────────────────────────────────────

/// Lenient numeric reader for the free-text cells of a workout export.
///
/// Only the leading numeric prefix of a cell is used (`"100kg"` → `100.0`);
/// anything without such a prefix reads as `0.0`.
pub struct NumberParser;

impl NumberParser {
    /// Parse the leading number of `text`, or `0.0` if there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use liftlog_core::data_processors::NumberParser;
    ///
    /// assert_eq!(NumberParser::parse("100"), 100.0);
    /// assert_eq!(NumberParser::parse(" 62.5 kg"), 62.5);
    /// assert_eq!(NumberParser::parse("n/a"), 0.0);
    /// assert_eq!(NumberParser::parse(""), 0.0);
    /// ```
    pub fn parse(text: &str) -> f64 {
        Self::try_parse(text).unwrap_or(0.0)
    }

    /// Parse the leading number of `text`, `None` if there is none.
    pub fn try_parse(text: &str) -> Option<f64> {
        static LEADING_NUMBER: OnceLock<Regex> = OnceLock::new();
        let re = LEADING_NUMBER.get_or_init(|| {
            Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("regex is valid")
        });

        let m = re.find(text.trim_start())?;
        m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

// ── DayKeyProcessor ───────────────────────────────────────────────────────────

/// Derives and interprets the per-day grouping key of a workout row.
pub struct DayKeyProcessor;

impl DayKeyProcessor {
    /// Derive the grouping key from a raw date cell: the trimmed text up to the
    /// first space. Blank cells yield `None`.
    ///
    /// ```
    /// use liftlog_core::data_processors::DayKeyProcessor;
    ///
    /// assert_eq!(DayKeyProcessor::day_key("2024-01-05 07:31:10").as_deref(), Some("2024-01-05"));
    /// assert_eq!(DayKeyProcessor::day_key("   "), None);
    /// ```
    pub fn day_key(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let key = trimmed.split(' ').next().unwrap_or(trimmed);
        Some(key.to_string())
    }

    /// Interpret a day key as a calendar date.
    ///
    /// Accepts ISO dates, ISO/RFC 3339 date-times (the date part is used as
    /// written, without timezone conversion) and a couple of slash-separated
    /// spellings. Returns `None` for anything else.
    pub fn parse_day(key: &str) -> Option<NaiveDate> {
        if key.is_empty() {
            return None;
        }

        const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(key, fmt) {
                return Some(date);
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(key) {
            return Some(dt.date_naive());
        }

        const DATETIME_FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
        ];
        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(key, fmt) {
                return Some(naive.date());
            }
        }

        debug!("DayKeyProcessor: \"{}\" is not a recognised date", key);
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
