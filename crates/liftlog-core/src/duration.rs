//! Session-duration text handling.
//!
//! Workout exports record duration as loose free text (`"1h 12m"`, `"45m"`,
//! `"2h"`), so parsing searches for the hour and minute components
//! independently instead of requiring a fixed grammar.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default ceiling for a plausible session: 6 hours.
pub const DEFAULT_MAX_SESSION_MINUTES: u32 = 6 * 60;

fn hours_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)h").expect("regex is valid"))
}

fn minutes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)m").expect("regex is valid"))
}

fn first_capture(re: &Regex, text: &str) -> u64 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Convert a duration string into whole minutes.
///
/// Text matching neither component yields `0`.
///
/// ```
/// use liftlog_core::duration::parse_duration;
///
/// assert_eq!(parse_duration("1h 12m"), 72);
/// assert_eq!(parse_duration("45m"), 45);
/// assert_eq!(parse_duration("2h"), 120);
/// assert_eq!(parse_duration("soon"), 0);
/// ```
pub fn parse_duration(text: &str) -> u32 {
    let hours = first_capture(hours_re(), text);
    let minutes = first_capture(minutes_re(), text);
    let total = hours.saturating_mul(60).saturating_add(minutes);
    u32::try_from(total).unwrap_or(u32::MAX)
}

/// Render whole minutes in the same shape [`parse_duration`] reads.
///
/// ```
/// use liftlog_core::duration::format_duration;
///
/// assert_eq!(format_duration(72), "1h 12m");
/// assert_eq!(format_duration(420), "7h 0m");
/// assert_eq!(format_duration(45), "45m");
/// ```
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// `true` when `minutes` is a plausible session length under `max_minutes`.
pub fn is_valid_session(minutes: u32, max_minutes: u32) -> bool {
    minutes > 0 && minutes <= max_minutes
}

// ── Selection strategy ────────────────────────────────────────────────────────

/// Chooses the single duration reported for a day out of the valid
/// durations seen on it.
///
/// Implementations receive only valid, deduplicated minute values, so any
/// value they pick stays within the session ceiling.
pub trait DurationStrategy {
    fn select(&self, minutes: &[u32]) -> Option<u32>;
}

/// Built-in duration selection policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationPolicy {
    /// Keep the longest duration logged that day.
    #[default]
    Longest,
    /// Keep the shortest duration logged that day.
    Shortest,
    /// Average of the distinct durations, rounded to the nearest minute.
    Mean,
}

impl DurationStrategy for DurationPolicy {
    fn select(&self, minutes: &[u32]) -> Option<u32> {
        match self {
            DurationPolicy::Longest => minutes.iter().copied().max(),
            DurationPolicy::Shortest => minutes.iter().copied().min(),
            DurationPolicy::Mean => {
                if minutes.is_empty() {
                    return None;
                }
                let sum: u64 = minutes.iter().map(|&m| u64::from(m)).sum();
                let mean = (sum as f64 / minutes.len() as f64).round() as u32;
                Some(mean)
            }
        }
    }
}

impl std::str::FromStr for DurationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "longest" | "max" => Ok(DurationPolicy::Longest),
            "shortest" | "min" => Ok(DurationPolicy::Shortest),
            "mean" | "average" => Ok(DurationPolicy::Mean),
            other => Err(format!(
                "unknown duration policy: {other}. Valid options: longest, shortest, mean"
            )),
        }
    }
}
