use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data_processors::DayKeyProcessor;
use crate::error::{LiftlogError, Result};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a configured timezone name into a [`Tz`].
///
/// `"auto"` resolves to the system timezone. Unrecognised names fall back to
/// UTC with a warning.
pub fn resolve_timezone(tz_name: &str) -> Tz {
    let name = if tz_name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        tz_name.to_string()
    };
    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("unrecognised timezone \"{}\", falling back to UTC", name);
        Tz::UTC
    })
}

/// Validate that `tz_name` is a recognised IANA timezone identifier.
pub fn validate_timezone(tz_name: &str) -> bool {
    tz_name.parse::<Tz>().is_ok()
}

/// Today's calendar date as seen from `tz_name`.
pub fn today_in(tz_name: &str) -> NaiveDate {
    Utc::now().with_timezone(&resolve_timezone(tz_name)).date_naive()
}

// ── MonthKey ──────────────────────────────────────────────────────────────────

/// A calendar month, with `month` in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Build a month key, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(LiftlogError::InvalidMonth { year, month });
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Fill in whichever of `year` / `month` is missing from `today`.
    pub fn resolve(year: Option<i32>, month: Option<u32>, today: NaiveDate) -> Result<Self> {
        Self::new(
            year.unwrap_or_else(|| today.year()),
            month.unwrap_or_else(|| today.month()),
        )
    }

    /// The current month in `tz_name`.
    pub fn current(tz_name: &str) -> Self {
        Self::of(today_in(tz_name))
    }

    /// The month before this one; January rolls back to December of the
    /// previous year.
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// `true` when `date` falls inside this month.
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// `true` when `day_key` parses to a date inside this month.
    pub fn contains_day_key(self, day_key: &str) -> bool {
        DayKeyProcessor::parse_day(day_key).is_some_and(|d| self.contains(d))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ── Day ordering ──────────────────────────────────────────────────────────────

/// Chronological comparison of two day keys.
///
/// Keys that parse as dates compare by calendar date, falling back to the raw
/// text on ties. Keys that do not parse order before every parseable key, so
/// a descending sort lists them last.
pub fn compare_day_keys(a: &str, b: &str) -> Ordering {
    let da = DayKeyProcessor::parse_day(a);
    let db = DayKeyProcessor::parse_day(b);
    da.cmp(&db).then_with(|| a.cmp(b))
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = i64::from(date.weekday().num_days_from_sunday());
    date - Duration::days(offset)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
