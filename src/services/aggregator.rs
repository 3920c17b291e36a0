//! Turns raw sign-up records into the dashboard metrics.
//!
//! Every window is half-open (`lower <= created_at < upper`):
//! - today: local midnight .. next local midnight
//! - last week: `now - 7d` .. `now`
//! - previous week: `now - 14d` .. `now - 7d`
//! - chart buckets: the seven local calendar days ending with today
//!
//! The rolling weeks and the calendar-aligned chart cover different spans, so the
//! chart total is not expected to match `last_week_users`.

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::{
    models::{DailyPoint, MetricsSnapshot, UserRecord},
    utils::time::{day_label, round2, start_of_local_day},
};

pub const WEEK_DAYS: i64 = 7;
pub const SERIES_DAYS: i64 = 7;

/// Tunables applied on top of the raw counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsOptions {
    /// Added to the stored count before it is reported (may be negative)
    pub total_users_offset: i64,
}

/// Builds a snapshot for the instant `now`; the local day is taken in `now`'s offset
pub fn aggregate(
    total_count: u64,
    records: &[UserRecord],
    now: DateTime<FixedOffset>,
    options: &MetricsOptions,
) -> MetricsSnapshot {
    let now_utc = now.with_timezone(&Utc);
    let today = start_of_local_day(&now);
    let tomorrow = today + Duration::days(1);

    let today_users = count_between(records, today.with_timezone(&Utc), tomorrow.with_timezone(&Utc));

    let week_start = now_utc - Duration::days(WEEK_DAYS);
    let last_week_users = count_between(records, week_start, now_utc);

    let previous_week_start = week_start - Duration::days(WEEK_DAYS);
    let previous_week_users = count_between(records, previous_week_start, week_start);

    let total_users = reported_total(total_count, options.total_users_offset);

    let daily_series = (0..SERIES_DAYS)
        .rev()
        .map(|days_back| {
            let day = today - Duration::days(days_back);
            let next_day = day + Duration::days(1);
            DailyPoint {
                label: day_label(&day),
                date: day.date_naive(),
                users: count_between(records, day.with_timezone(&Utc), next_day.with_timezone(&Utc)),
            }
        })
        .collect();

    MetricsSnapshot {
        total_users,
        today_users,
        last_week_users,
        previous_week_users,
        weekly_growth_percent: weekly_growth_percent(last_week_users, previous_week_users),
        daily_growth_percent: daily_growth_percent(today_users, total_users),
        daily_series,
        generated_at: now,
    }
}

fn count_between(records: &[UserRecord], lower: DateTime<Utc>, upper: DateTime<Utc>) -> u64 {
    records
        .iter()
        .filter(|r| r.created_at >= lower && r.created_at < upper)
        .count() as u64
}

fn reported_total(total_count: u64, offset: i64) -> u64 {
    let adjusted = i128::from(total_count) + i128::from(offset);
    u64::try_from(adjusted.max(0)).unwrap_or(u64::MAX)
}

/// Signed change of last week against the week before
pub fn weekly_growth_percent(last_week: u64, previous_week: u64) -> f64 {
    if previous_week > 0 {
        let delta = last_week as f64 - previous_week as f64;
        round2(delta * 100.0 / previous_week as f64)
    } else if last_week > 0 {
        100.0
    } else {
        0.0
    }
}

/// Today's sign-ups as a share of the reported total; 0 when the total is 0
pub fn daily_growth_percent(today: u64, total: u64) -> f64 {
    if today == 0 || total == 0 {
        return 0.0;
    }
    round2(today as f64 * 100.0 / total as f64)
}
