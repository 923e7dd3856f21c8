//! Month-level statistics over aggregated workout history.
//!
//! Session, set, duration and distance averages come from the per-day
//! summaries. Exercise and rep averages go back to the raw rows so that
//! per-row granularity is not lost.

use std::collections::{BTreeMap, BTreeSet};

use liftlog_core::data_processors::DayKeyProcessor;
use liftlog_core::formatting::percent_change;
use liftlog_core::models::{DaySummary, MonthDeltas, MonthStats, WorkoutRow};
use liftlog_core::time_utils::MonthKey;
use tracing::debug;

// ── MonthAnalyzer ─────────────────────────────────────────────────────────────

/// Computes [`MonthStats`] for any calendar month of one history.
pub struct MonthAnalyzer<'a> {
    days: &'a [DaySummary],
    rows: &'a [WorkoutRow],
    date_column: &'a str,
}

impl<'a> MonthAnalyzer<'a> {
    pub fn new(days: &'a [DaySummary], rows: &'a [WorkoutRow], date_column: &'a str) -> Self {
        Self {
            days,
            rows,
            date_column,
        }
    }

    // ── Public methods ────────────────────────────────────────────────────────

    /// Day summaries that fall inside `month`, in history order.
    pub fn sessions_in(&self, month: MonthKey) -> Vec<&'a DaySummary> {
        self.days
            .iter()
            .filter(|d| month.contains_day_key(&d.date))
            .collect()
    }

    /// Every average for `month`; each one uses its own contributing subset
    /// and is `0` when that subset is empty.
    pub fn month_stats(&self, month: MonthKey) -> MonthStats {
        let sessions = self.sessions_in(month);

        let durations: Vec<f64> = sessions
            .iter()
            .filter_map(|d| d.duration_minutes)
            .map(f64::from)
            .collect();
        let sets: Vec<f64> = sessions.iter().map(|d| f64::from(d.count)).collect();
        let distances: Vec<f64> = sessions
            .iter()
            .map(|d| d.distance)
            .filter(|&km| km > 0.0)
            .collect();

        let month_rows = self.rows_in(month);
        let reps: Vec<f64> = month_rows.iter().map(|r| r.reps()).collect();
        let exercises: Vec<f64> = Self::exercises_per_day(&month_rows, self.date_column)
            .into_values()
            .map(|names| names.len() as f64)
            .collect();

        let stats = MonthStats {
            session_count: sessions.len(),
            average_sets: mean(&sets),
            average_duration: mean(&durations).round() as u32,
            average_distance: mean(&distances),
            average_exercises: mean(&exercises),
            average_reps: mean(&reps),
        };

        debug!(
            "{}: {} sessions, {} rows, {} days with duration",
            month,
            stats.session_count,
            month_rows.len(),
            durations.len()
        );

        stats
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Raw rows whose day key falls inside `month`.
    fn rows_in(&self, month: MonthKey) -> Vec<&'a WorkoutRow> {
        self.rows
            .iter()
            .filter(|row| {
                row.get(self.date_column)
                    .and_then(DayKeyProcessor::day_key)
                    .is_some_and(|key| month.contains_day_key(&key))
            })
            .collect()
    }

    /// Distinct exercise names per day key. A day whose rows carry no
    /// exercise name still counts, with zero exercises.
    fn exercises_per_day<'r>(
        rows: &[&'r WorkoutRow],
        date_column: &str,
    ) -> BTreeMap<String, BTreeSet<&'r str>> {
        let mut per_day: BTreeMap<String, BTreeSet<&'r str>> = BTreeMap::new();
        for &row in rows {
            let Some(key) = row.get(date_column).and_then(DayKeyProcessor::day_key) else {
                continue;
            };
            let names = per_day.entry(key).or_default();
            if let Some(name) = row.exercise_name() {
                names.insert(name);
            }
        }
        per_day
    }
}

/// Percent change of each average, `None` unless both months have data.
pub fn month_deltas(this: &MonthStats, prev: &MonthStats) -> MonthDeltas {
    MonthDeltas {
        sets: percent_change(this.average_sets, prev.average_sets),
        duration: percent_change(
            f64::from(this.average_duration),
            f64::from(prev.average_duration),
        ),
        distance: percent_change(this.average_distance, prev.average_distance),
        exercises: percent_change(this.average_exercises, prev.average_exercises),
        reps: percent_change(this.average_reps, prev.average_reps),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
