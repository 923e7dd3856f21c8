//! Plain-text rendering of a [`DashboardReport`] for the terminal views.

use std::fmt::Write;

use liftlog_core::duration::format_duration;
use liftlog_core::formatting::{format_average, format_change, format_number, NOT_AVAILABLE};
use liftlog_core::models::DashboardReport;
use liftlog_core::time_utils::MonthKey;

/// Sessions listed at the bottom of the summary.
const RECENT_SESSIONS: usize = 10;

/// Render the report as a multi-line summary.
pub fn render(report: &DashboardReport, month: MonthKey) -> String {
    let mut out = String::new();
    let _ = write_report(&mut out, report, month);
    out
}

fn write_report(out: &mut String, r: &DashboardReport, month: MonthKey) -> std::fmt::Result {
    writeln!(out, "Workout summary for {} (date column: {})", month, r.date_column)?;
    writeln!(
        out,
        "  {} workout days, {} sets logged, typical session {}",
        format_number(r.total_groups as f64, 0),
        format_number(r.total_rows as f64, 0),
        minutes_or_na(r.average_duration_minutes),
    )?;
    writeln!(out)?;

    writeln!(out, "This month ({} sessions)", r.this_month_session_count)?;
    let mom = &r.month_over_month;
    let lines = [
        (
            "Avg duration",
            minutes_or_na(r.this_month_average_duration),
            minutes_or_na(r.prev_month_average_duration),
            mom.duration,
        ),
        (
            "Avg sets",
            format_average(r.this_month_average_sets, 1),
            format_average(r.prev_month_average_sets, 1),
            mom.sets,
        ),
        (
            "Avg exercises",
            format_average(r.this_month_average_exercises, 1),
            format_average(r.prev_month_average_exercises, 1),
            mom.exercises,
        ),
        (
            "Avg reps",
            format_average(r.this_month_average_reps, 1),
            format_average(r.prev_month_average_reps, 1),
            mom.reps,
        ),
        (
            "Avg distance",
            format_average(r.this_month_average_distance, 2),
            format_average(r.prev_month_average_distance, 2),
            mom.distance,
        ),
    ];
    for (label, this, prev, change) in lines {
        writeln!(
            out,
            "  {:<14}{:>10}   last month {:>8}   {}",
            label,
            this,
            prev,
            format_change(change)
        )?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Goals: {} days/week, +{}% volume per session, {} sessions",
        r.weekly_goal,
        format_number(r.volume_increase_goal, 1),
        format_duration(r.session_length_goal),
    )?;
    if let Some(week) = r.weekly_progress.last() {
        writeln!(
            out,
            "  Week of {}: {}/{} workout days{}",
            week.week_start,
            week.workout_days,
            r.weekly_goal,
            if week.meets_goal { " (goal met)" } else { "" }
        )?;
        let met = r.weekly_progress.iter().filter(|w| w.meets_goal).count();
        writeln!(
            out,
            "  Goal met in {} of {} weeks this year",
            met,
            r.weekly_progress.len()
        )?;
    }
    writeln!(out)?;

    if r.volume_progression.is_empty() {
        writeln!(out, "No sessions logged in {}", month)?;
        return Ok(());
    }

    writeln!(out, "Sessions in {}", month)?;
    let skip = r.volume_progression.len().saturating_sub(RECENT_SESSIONS);
    for (point, day) in r
        .volume_progression
        .iter()
        .zip(r.last10_sessions.iter())
        .skip(skip)
    {
        writeln!(
            out,
            "  {:<12}{:>4} sets  {:>10} vol  (target {:>8})  {:>8}  {}",
            point.date,
            day.count,
            format_number(point.volume as f64, 0),
            format_number(point.target_volume as f64, 0),
            day.duration.as_deref().unwrap_or("-"),
            distance_text(day.distance),
        )?;
    }

    Ok(())
}

fn minutes_or_na(minutes: u32) -> String {
    if minutes > 0 {
        format_duration(minutes)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

fn distance_text(distance: f64) -> String {
    if distance > 0.0 {
        format!("{} km", format_number(distance, 2))
    } else {
        String::new()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
