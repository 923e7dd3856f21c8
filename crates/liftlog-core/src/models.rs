use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::data_processors::NumberParser;

/// Column holding the lifted weight per set.
pub const WEIGHT_COLUMN: &str = "Weight";
/// Column holding the repetition count per set.
pub const REPS_COLUMN: &str = "Reps";
/// Column holding the exercise name.
pub const EXERCISE_COLUMN: &str = "Exercise Name";
/// Column holding the session duration text.
pub const DURATION_COLUMN: &str = "Duration";
/// Column holding cardio distance.
pub const DISTANCE_COLUMN: &str = "Distance";

/// Exercise-name fragment that marks a row as running cardio.
pub const RUNNING_MARKER: &str = "running";

/// One record of the workout export: column name → cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutRow {
    fields: HashMap<String, String>,
}

impl WorkoutRow {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw text of `column`, if present.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Non-empty exercise name.
    pub fn exercise_name(&self) -> Option<&str> {
        self.get(EXERCISE_COLUMN).filter(|s| !s.is_empty())
    }

    /// Non-empty duration text.
    pub fn duration_text(&self) -> Option<&str> {
        self.get(DURATION_COLUMN).filter(|s| !s.is_empty())
    }

    pub fn weight(&self) -> f64 {
        self.number(WEIGHT_COLUMN)
    }

    pub fn reps(&self) -> f64 {
        self.number(REPS_COLUMN)
    }

    pub fn distance(&self) -> f64 {
        self.number(DISTANCE_COLUMN)
    }

    /// `weight × reps` for this set.
    pub fn volume(&self) -> f64 {
        self.weight() * self.reps()
    }

    /// `true` when the exercise name mentions running (case-insensitive).
    pub fn is_running(&self) -> bool {
        self.exercise_name()
            .is_some_and(|name| name.to_lowercase().contains(RUNNING_MARKER))
    }

    /// Distance that counts toward the day's cardio total: the row's
    /// distance for running exercises, `0.0` otherwise.
    pub fn running_distance(&self) -> f64 {
        if self.is_running() {
            self.distance()
        } else {
            0.0
        }
    }

    fn number(&self, column: &str) -> f64 {
        self.get(column).map(NumberParser::parse).unwrap_or(0.0)
    }
}

/// A parsed CSV document: header names in file order plus every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<WorkoutRow>,
}

// ── Derived records ───────────────────────────────────────────────────────────

/// Per-date workout summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    /// Day key, normally `YYYY-MM-DD`.
    pub date: String,
    /// Number of rows (sets) logged for the day.
    pub count: u32,
    /// Selected session duration, formatted as `"1h 12m"` / `"45m"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Σ weight × reps, rounded.
    pub volume: i64,
    /// Σ running distance, rounded to 2 decimals.
    pub distance: f64,
}

/// Averages for one calendar month. `0` means "no data".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthStats {
    pub session_count: usize,
    pub average_sets: f64,
    /// Whole minutes.
    pub average_duration: u32,
    pub average_distance: f64,
    pub average_exercises: f64,
    pub average_reps: f64,
}

/// Percent change of each [`MonthStats`] average against the previous month.
///
/// A field is `None` unless both months have a nonzero value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthDeltas {
    pub sets: Option<f64>,
    pub duration: Option<f64>,
    pub distance: Option<f64>,
    pub exercises: Option<f64>,
    pub reps: Option<f64>,
}

/// One point of the month's volume chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumePoint {
    pub date: String,
    pub volume: i64,
    /// Compounded goal volume for this position in the month.
    pub target_volume: i64,
    /// Change against the previous session, `0` when not comparable.
    pub percent_change: f64,
}

/// Workout days within one Sunday-started week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekProgress {
    pub week_start: NaiveDate,
    pub workout_days: u32,
    pub meets_goal: bool,
}

/// The complete dashboard payload handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub success: bool,
    pub date_column: String,
    pub total_groups: usize,
    pub total_rows: usize,
    pub average_duration_minutes: u32,
    pub this_month_session_count: usize,
    pub this_month_average_duration: u32,
    pub prev_month_average_duration: u32,
    pub this_month_average_sets: f64,
    pub prev_month_average_sets: f64,
    pub this_month_average_distance: f64,
    pub prev_month_average_distance: f64,
    pub this_month_average_exercises: f64,
    pub prev_month_average_exercises: f64,
    pub this_month_average_reps: f64,
    pub prev_month_average_reps: f64,
    pub month_over_month: MonthDeltas,
    pub weekly_goal: u32,
    pub volume_increase_goal: f64,
    pub session_length_goal: u32,
    /// Full history, newest first.
    pub groups: Vec<DaySummary>,
    /// Every session of the target month, oldest first.
    #[serde(rename = "last10Sessions")]
    pub last10_sessions: Vec<DaySummary>,
    pub volume_progression: Vec<VolumePoint>,
    pub weekly_progress: Vec<WeekProgress>,
}
