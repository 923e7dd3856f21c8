//! Main analysis pipeline for liftlog.
//!
//! Detects the date column, groups rows by day, computes month statistics
//! and goal progress, and assembles a [`DashboardReport`] for the
//! presentation layer.

use std::path::Path;

use chrono::NaiveDate;
use liftlog_core::error::Result;
use liftlog_core::models::{CsvTable, DashboardReport};
use liftlog_core::settings::DashboardConfig;
use liftlog_core::time_utils::MonthKey;
use tracing::info;

use crate::aggregator::{average_duration_minutes, WorkoutAggregator};
use crate::analyzer::{month_deltas, MonthAnalyzer};
use crate::columns::detect_date_column;
use crate::progress::{volume_progression, weekly_progress};
use crate::reader::load_table;

// ── Public types ──────────────────────────────────────────────────────────────

/// Inputs of one report computation besides the CSV itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    /// Month the "this month" figures refer to.
    pub month: MonthKey,
    /// Reference day for weekly progress.
    pub today: NaiveDate,
    pub config: DashboardConfig,
}

impl ReportRequest {
    /// Request the current month as of `today`.
    pub fn for_today(today: NaiveDate, config: DashboardConfig) -> Self {
        Self {
            month: MonthKey::of(today),
            today,
            config,
        }
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline over an already parsed table.
///
/// 1. Detect the date column (fails before any aggregation when the table
///    has no headers).
/// 2. Group rows into day summaries, newest first.
/// 3. Compute this/previous month statistics and their deltas.
/// 4. Build the volume chart and weekly goal progress.
pub fn build_report(table: &CsvTable, request: &ReportRequest) -> Result<DashboardReport> {
    let config = &request.config;

    // ── Step 1: Date column ───────────────────────────────────────────────────
    let date_column = detect_date_column(&table.headers)?;

    // ── Step 2: Group by day ──────────────────────────────────────────────────
    let aggregator = WorkoutAggregator::new(config.max_session_minutes, config.duration_policy);
    let groups = aggregator.aggregate_daily(&table.rows, &date_column);

    // ── Step 3: Month statistics ──────────────────────────────────────────────
    let analyzer = MonthAnalyzer::new(&groups, &table.rows, &date_column);
    let this_month = analyzer.month_stats(request.month);
    let prev_month = analyzer.month_stats(request.month.previous());

    let mut this_month_sessions: Vec<_> = analyzer
        .sessions_in(request.month)
        .into_iter()
        .cloned()
        .collect();
    this_month_sessions.reverse();

    // ── Step 4: Goals ─────────────────────────────────────────────────────────
    let volume_points = volume_progression(&this_month_sessions, config.volume_increase_goal);
    let weeks = weekly_progress(
        &groups,
        request.month.year,
        request.today,
        config.weekly_goal,
    );

    info!(
        "Report for {}: {} rows, {} days, {} sessions this month",
        request.month,
        table.rows.len(),
        groups.len(),
        this_month.session_count
    );

    Ok(DashboardReport {
        success: true,
        date_column,
        total_groups: groups.len(),
        total_rows: table.rows.len(),
        average_duration_minutes: average_duration_minutes(&groups),
        this_month_session_count: this_month.session_count,
        this_month_average_duration: this_month.average_duration,
        prev_month_average_duration: prev_month.average_duration,
        this_month_average_sets: this_month.average_sets,
        prev_month_average_sets: prev_month.average_sets,
        this_month_average_distance: this_month.average_distance,
        prev_month_average_distance: prev_month.average_distance,
        this_month_average_exercises: this_month.average_exercises,
        prev_month_average_exercises: prev_month.average_exercises,
        this_month_average_reps: this_month.average_reps,
        prev_month_average_reps: prev_month.average_reps,
        month_over_month: month_deltas(&this_month, &prev_month),
        weekly_goal: config.weekly_goal,
        volume_increase_goal: config.volume_increase_goal,
        session_length_goal: config.session_length_goal,
        groups,
        last10_sessions: this_month_sessions,
        volume_progression: volume_points,
        weekly_progress: weeks,
    })
}

/// Load the CSV at `path` (a file or a directory of exports) and build the
/// report.
pub fn analyze_source(path: &Path, request: &ReportRequest) -> Result<DashboardReport> {
    let table = load_table(path)?;
    build_report(&table, request)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
