//! Per-day grouping of workout rows.

use std::collections::{BTreeMap, BTreeSet};

use liftlog_core::data_processors::DayKeyProcessor;
use liftlog_core::duration::{
    format_duration, is_valid_session, parse_duration, DurationPolicy, DurationStrategy,
    DEFAULT_MAX_SESSION_MINUTES,
};
use liftlog_core::formatting::round_to;
use liftlog_core::models::{DaySummary, WorkoutRow};
use liftlog_core::time_utils::compare_day_keys;
use tracing::debug;

// ── DayAccumulator ────────────────────────────────────────────────────────────

/// Running totals for one day while rows are folded in.
#[derive(Debug, Clone, Default)]
pub struct DayAccumulator {
    /// Rows (sets) seen for the day.
    pub count: u32,
    /// Unrounded Σ weight × reps.
    pub volume: f64,
    /// Unrounded Σ running distance.
    pub distance: f64,
    /// Distinct duration strings that parsed to a valid session length.
    pub durations: Vec<String>,
    /// Distinct exercise names.
    pub exercises: BTreeSet<String>,
}

impl DayAccumulator {
    /// Fold a single row into the day's totals.
    fn add_row(&mut self, row: &WorkoutRow, max_session_minutes: u32) {
        self.count += 1;
        self.volume += row.volume();
        self.distance += row.running_distance();

        if let Some(name) = row.exercise_name() {
            if !self.exercises.contains(name) {
                self.exercises.insert(name.to_string());
            }
        }

        if let Some(text) = row.duration_text() {
            if !self.durations.iter().any(|d| d == text)
                && is_valid_session(parse_duration(text), max_session_minutes)
            {
                self.durations.push(text.to_string());
            }
        }
    }

    /// Minute values of the valid durations recorded for the day.
    pub fn duration_minutes(&self) -> Vec<u32> {
        self.durations.iter().map(|d| parse_duration(d)).collect()
    }
}

// ── WorkoutAggregator ─────────────────────────────────────────────────────────

/// Groups workout rows by calendar day.
///
/// Each call builds its own map, so one aggregator can serve concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct WorkoutAggregator<S = DurationPolicy> {
    max_session_minutes: u32,
    strategy: S,
}

impl Default for WorkoutAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSION_MINUTES, DurationPolicy::default())
    }
}

impl<S: DurationStrategy> WorkoutAggregator<S> {
    /// Create an aggregator that ignores durations above
    /// `max_session_minutes` and picks each day's duration with `strategy`.
    pub fn new(max_session_minutes: u32, strategy: S) -> Self {
        Self {
            max_session_minutes,
            strategy,
        }
    }

    pub fn max_session_minutes(&self) -> u32 {
        self.max_session_minutes
    }

    /// Fold `rows` into per-day accumulators keyed by day key.
    ///
    /// Rows whose `date_column` cell is blank or missing are skipped.
    pub fn group_by_day(
        &self,
        rows: &[WorkoutRow],
        date_column: &str,
    ) -> BTreeMap<String, DayAccumulator> {
        let mut map: BTreeMap<String, DayAccumulator> = BTreeMap::new();
        let mut skipped = 0usize;

        for row in rows {
            let Some(key) = row.get(date_column).and_then(DayKeyProcessor::day_key) else {
                skipped += 1;
                continue;
            };
            map.entry(key)
                .or_default()
                .add_row(row, self.max_session_minutes);
        }

        debug!(
            "Grouped {} rows into {} days ({} without a date)",
            rows.len() - skipped,
            map.len(),
            skipped
        );

        map
    }

    /// Turn one day's accumulator into its summary.
    pub fn summarize(&self, date: &str, acc: &DayAccumulator) -> DaySummary {
        let minutes = self
            .strategy
            .select(&acc.duration_minutes())
            .filter(|&m| is_valid_session(m, self.max_session_minutes));

        DaySummary {
            date: date.to_string(),
            count: acc.count,
            duration: minutes.map(format_duration),
            duration_minutes: minutes,
            volume: acc.volume.round() as i64,
            distance: round_to(acc.distance, 2),
        }
    }

    /// Aggregate `rows` into day summaries, newest first.
    pub fn aggregate_daily(&self, rows: &[WorkoutRow], date_column: &str) -> Vec<DaySummary> {
        let map = self.group_by_day(rows, date_column);
        let mut days: Vec<DaySummary> = map
            .iter()
            .map(|(date, acc)| self.summarize(date, acc))
            .collect();
        sort_newest_first(&mut days);
        days
    }
}

/// Sort summaries newest first using chronological day comparison.
pub fn sort_newest_first(days: &mut [DaySummary]) {
    days.sort_by(|a, b| compare_day_keys(&b.date, &a.date));
}

/// Mean duration across every day that has one, rounded to whole minutes.
/// `0` when no day has a duration.
pub fn average_duration_minutes(days: &[DaySummary]) -> u32 {
    let durations: Vec<u32> = days.iter().filter_map(|d| d.duration_minutes).collect();
    if durations.is_empty() {
        return 0;
    }
    let total: u64 = durations.iter().map(|&m| u64::from(m)).sum();
    (total as f64 / durations.len() as f64).round() as u32
}

// ── Tests ─────────────────────────────────────────────────────────────────────
