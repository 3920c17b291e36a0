use actix_web::{web, HttpResponse};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::{
    api::AppState,
    jobs::refresh_scheduler,
    models::MetricsSnapshot,
    utils::{
        error::AppError,
        time::{display_timestamp, parse_utc_offset, round2},
    },
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AnalyticsQuery {
    /// Caller's offset from UTC in minutes east (e.g. -180 for UTC-03:00)
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Increase,
    Decrease,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MetricCard {
    pub title: String,
    pub value: i64,
    pub change: f64,
    pub change_type: ChangeType,
    pub period: String,
}

#[derive(Debug, Serialize, PartialEq, utoipa::ToSchema)]
pub struct TargetProgress {
    pub current: u64,
    pub target: u64,
    pub percent: f64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub snapshot: MetricsSnapshot,
    pub generated_at_display: String,
    pub cards: Vec<MetricCard>,
    pub target_progress: Option<TargetProgress>,
}

impl AnalyticsResponse {
    pub fn from_snapshot(snapshot: MetricsSnapshot, user_target: Option<u64>) -> Self {
        let total = snapshot.total_users;
        let weekly_value = (snapshot.weekly_growth_percent * total as f64 / 100.0).round() as i64;

        let cards = vec![
            card("Total Users", to_i64(total), snapshot.weekly_growth_percent, "All time"),
            card("Weekly Growth", weekly_value, snapshot.weekly_growth_percent, "Past 7 days"),
            card("New Users Today", to_i64(snapshot.today_users), snapshot.daily_growth_percent, "Today"),
        ];

        Self {
            success: true,
            generated_at_display: display_timestamp(&snapshot.generated_at),
            target_progress: user_target.map(|target| target_progress(total, target)),
            cards,
            snapshot,
        }
    }
}

fn card(title: &str, value: i64, change: f64, period: &str) -> MetricCard {
    MetricCard {
        title: title.to_string(),
        value,
        change,
        change_type: if change >= 0.0 { ChangeType::Increase } else { ChangeType::Decrease },
        period: period.to_string(),
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Share of `target` reached, capped at 100%
pub fn target_progress(current: u64, target: u64) -> TargetProgress {
    let percent = if target == 0 {
        0.0
    } else {
        round2((current as f64 * 100.0 / target as f64).min(100.0))
    };

    TargetProgress {
        current,
        target,
        percent,
    }
}

fn resolve_offset(state: &AppState, query: &AnalyticsQuery) -> Result<FixedOffset, AppError> {
    match query.tz_offset_minutes {
        Some(minutes) => parse_utc_offset(minutes),
        None => Ok(state.default_utc_offset),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics",
    tag = "Analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Freshly computed dashboard metrics", body = AnalyticsResponse),
        (status = 400, description = "Invalid UTC offset"),
        (status = 401, description = "Missing or invalid token"),
        (status = 503, description = "Data unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_analytics(
    state: web::Data<AppState>,
    query: web::Query<AnalyticsQuery>,
) -> Result<HttpResponse, AppError> {
    let offset = resolve_offset(&state, &query)?;
    log::info!("📊 GET /analytics - offset: {}", offset);

    let snapshot = state.analytics.snapshot(offset).await?;

    log::info!("✅ Analytics computed: {} users", snapshot.total_users);
    Ok(HttpResponse::Ok().json(AnalyticsResponse::from_snapshot(snapshot, state.user_target)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/latest",
    tag = "Analytics",
    responses(
        (status = 200, description = "Most recent scheduled or manual snapshot", body = AnalyticsResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 503, description = "No snapshot computed yet")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_latest(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    log::info!("📊 GET /analytics/latest");

    let snapshot = state
        .slot
        .latest()
        .await
        .ok_or_else(|| AppError::Unavailable("No snapshot has been computed yet".to_string()))?;

    Ok(HttpResponse::Ok().json(AnalyticsResponse::from_snapshot(snapshot, state.user_target)))
}

#[utoipa::path(
    post,
    path = "/api/v1/analytics/refresh",
    tag = "Analytics",
    responses(
        (status = 200, description = "Snapshot recomputed and published", body = AnalyticsResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 503, description = "Data unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
/// The shared slot always holds snapshots for the configured day boundary,
/// so a manual refresh ignores any per-caller offset.
pub async fn refresh(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let offset = state.default_utc_offset;
    log::info!("🔄 POST /analytics/refresh - offset: {}", offset);

    let snapshot = refresh_scheduler::refresh_now(&state.analytics, &state.slot, offset).await?;

    log::info!("✅ Snapshot refreshed manually");
    Ok(HttpResponse::Ok().json(AnalyticsResponse::from_snapshot(snapshot, state.user_target)))
}
