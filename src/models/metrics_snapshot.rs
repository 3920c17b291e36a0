use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

/// One chart bucket: a local calendar day and the sign-ups it contains
#[derive(Debug, Serialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct DailyPoint {
    pub label: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub users: u64,
}

/// Result of a single aggregation run. Built once, never mutated.
#[derive(Debug, Serialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct MetricsSnapshot {
    pub total_users: u64,
    pub today_users: u64,
    pub last_week_users: u64,
    pub previous_week_users: u64,
    pub weekly_growth_percent: f64,
    pub daily_growth_percent: f64,
    /// Oldest day first, today last
    pub daily_series: Vec<DailyPoint>,
    #[schema(value_type = String, format = DateTime)]
    pub generated_at: DateTime<FixedOffset>,
}
