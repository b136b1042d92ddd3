//! Daily aggregation
//!
//! Groups recorded intervals into calendar-day buckets under the diary
//! convention (a night runs 23:00 through 06:00 the next day) and computes
//! per-day summary statistics.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::types::{DailySummary, SleepInterval, SleepPhase};

/// Hour before which an interval is attributed to the previous diary day
pub const DAY_BOUNDARY_HOUR: u32 = 6;

/// Ideal share of deep sleep, as a percentage of total sleep
const DEEP_SLEEP_CAP_PCT: f32 = 25.0;
/// Ideal share of REM sleep, as a percentage of total sleep
const REM_SLEEP_CAP_PCT: f32 = 25.0;

/// Diary date an interval belongs to: intervals starting before 06:00 count
/// toward the previous calendar day's night.
pub fn bucket_date(start_time: NaiveDateTime) -> NaiveDate {
    if start_time.hour() < DAY_BOUNDARY_HOUR {
        start_time.date() - Duration::days(1)
    } else {
        start_time.date()
    }
}

/// Group intervals into daily summaries, newest day first.
///
/// Intervals within a day are ordered by start time; totals and the score
/// are recomputed from scratch on every call.
pub fn aggregate(intervals: &[SleepInterval]) -> Vec<DailySummary> {
    if intervals.is_empty() {
        return Vec::new();
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<SleepInterval>> = BTreeMap::new();
    for interval in intervals {
        by_date
            .entry(bucket_date(interval.start_time))
            .or_default()
            .push(interval.clone());
    }

    by_date
        .into_iter()
        .rev()
        .map(|(date, mut day_intervals)| {
            day_intervals.sort_by_key(|i| i.start_time);
            let total_sleep_minutes = total_sleep_minutes(&day_intervals);
            let score = sleep_score(&day_intervals);
            DailySummary {
                date,
                intervals: day_intervals,
                total_sleep_minutes,
                score,
            }
        })
        .collect()
}

/// Minutes spent in any non-awake phase
pub fn total_sleep_minutes(intervals: &[SleepInterval]) -> i64 {
    intervals
        .iter()
        .filter(|i| i.phase.is_sleep())
        .map(|i| i.duration_minutes)
        .sum()
}

/// Heuristic sleep quality score in 0-100.
///
/// Deep and REM sleep each contribute their share of total sleep, capped at
/// the ideal 25%, and the capped sum is scaled by two. Zero total sleep
/// scores zero.
pub fn sleep_score(intervals: &[SleepInterval]) -> u8 {
    let total = total_sleep_minutes(intervals);
    if total <= 0 {
        return 0;
    }

    let phase_minutes = |phase: SleepPhase| -> i64 {
        intervals
            .iter()
            .filter(|i| i.phase == phase)
            .map(|i| i.duration_minutes)
            .sum()
    };

    let deep_pct =
        (phase_minutes(SleepPhase::DeepSleep) as f32 / total as f32 * 100.0).clamp(0.0, DEEP_SLEEP_CAP_PCT);
    let rem_pct =
        (phase_minutes(SleepPhase::Rem) as f32 / total as f32 * 100.0).clamp(0.0, REM_SLEEP_CAP_PCT);

    ((deep_pct + rem_pct) * 2.0) as u8
}
