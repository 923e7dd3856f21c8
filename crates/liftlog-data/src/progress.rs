//! Goal tracking derived from day summaries: the compounded volume target
//! for a month and per-week workout counts for a year.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use liftlog_core::data_processors::DayKeyProcessor;
use liftlog_core::models::{DaySummary, VolumePoint, WeekProgress};
use liftlog_core::time_utils::week_start;

// ── Volume progression ────────────────────────────────────────────────────────

/// Chart points for sessions given oldest first.
///
/// The target for the `idx`-th session compounds `goal_pct` percent per
/// session on top of the first session's volume.
pub fn volume_progression(sessions: &[DaySummary], goal_pct: f64) -> Vec<VolumePoint> {
    let Some(first) = sessions.first() else {
        return Vec::new();
    };
    let base = first.volume as f64;
    let growth = 1.0 + goal_pct / 100.0;

    sessions
        .iter()
        .enumerate()
        .map(|(idx, session)| {
            let previous = idx
                .checked_sub(1)
                .and_then(|prev| sessions.get(prev))
                .map(|s| s.volume)
                .unwrap_or(0);
            let percent_change = if idx > 0 && previous > 0 {
                (session.volume - previous) as f64 / previous as f64 * 100.0
            } else {
                0.0
            };

            VolumePoint {
                date: session.date.clone(),
                volume: session.volume,
                target_volume: (base * growth.powi(idx as i32)).round() as i64,
                percent_change,
            }
        })
        .collect()
}

// ── Weekly progress ───────────────────────────────────────────────────────────

/// Workout-day counts for every Sunday-started week of `year` up to `until`.
///
/// The first week starts on the Sunday on or before 1 January; days that
/// fall outside `year` or after `until` are not counted. A year that starts
/// after `until` yields no weeks.
pub fn weekly_progress(
    days: &[DaySummary],
    year: i32,
    until: NaiveDate,
    weekly_goal: u32,
) -> Vec<WeekProgress> {
    let (Some(jan_1), Some(dec_31)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return Vec::new();
    };
    let end = until.min(dec_31);
    if end < jan_1 {
        return Vec::new();
    }

    let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    let mut week = week_start(jan_1);
    while week <= end {
        counts.insert(week, 0);
        week += Duration::days(7);
    }

    for date in days
        .iter()
        .filter_map(|d| DayKeyProcessor::parse_day(&d.date))
        .filter(|date| *date >= jan_1 && *date <= end)
    {
        if let Some(count) = counts.get_mut(&week_start(date)) {
            *count += 1;
        }
    }

    counts
        .into_iter()
        .map(|(week_start, workout_days)| WeekProgress {
            week_start,
            workout_days,
            meets_goal: workout_days >= weekly_goal,
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
