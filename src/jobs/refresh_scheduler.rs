// ==================== SNAPSHOT REFRESH SCHEDULER ====================
// Recomputes the dashboard snapshot on a fixed cadence and publishes it to a
// shared slot. Manual refreshes go through the same slot.

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;

use crate::{
    config::RefreshSettings,
    models::MetricsSnapshot,
    services::analytics_service::AnalyticsService,
    utils::error::AppError,
};

/// Issuance number of a refresh run; higher means requested later
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Latest published snapshot, ordered by when runs were requested
#[derive(Default)]
pub struct SnapshotSlot {
    issued: AtomicU64,
    latest: RwLock<Option<(RefreshTicket, MetricsSnapshot)>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a ticket; call before starting the run
    pub fn issue(&self) -> RefreshTicket {
        RefreshTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Stores the snapshot unless a run issued later has already published.
    /// Returns whether the snapshot was applied.
    pub async fn publish(&self, ticket: RefreshTicket, snapshot: MetricsSnapshot) -> bool {
        let mut latest = self.latest.write().await;
        match latest.as_ref() {
            Some((current, _)) if *current > ticket => {
                log::debug!("⏭️  Dropping stale snapshot {:?} (current {:?})", ticket, current);
                false
            }
            _ => {
                *latest = Some((ticket, snapshot));
                true
            }
        }
    }

    pub async fn latest(&self) -> Option<MetricsSnapshot> {
        self.latest.read().await.as_ref().map(|(_, snapshot)| snapshot.clone())
    }
}

/// Runs one aggregation and publishes it
pub async fn refresh_now(
    analytics: &AnalyticsService,
    slot: &SnapshotSlot,
    offset: FixedOffset,
) -> Result<MetricsSnapshot, AppError> {
    let ticket = slot.issue();
    let snapshot = analytics.snapshot(offset).await?;
    slot.publish(ticket, snapshot.clone()).await;
    Ok(snapshot)
}

/// Spawns the periodic refresh task
pub fn start_refresh_scheduler(
    analytics: AnalyticsService,
    slot: Arc<SnapshotSlot>,
    offset: FixedOffset,
    settings: RefreshSettings,
) {
    log::info!(
        "📅 Starting snapshot refresh scheduler (every {}s, aligned: {})",
        settings.interval.as_secs(),
        settings.align_to_wall_clock
    );

    tokio::spawn(async move {
        loop {
            match refresh_now(&analytics, &slot, offset).await {
                Ok(snapshot) => {
                    log::info!(
                        "✅ Snapshot refreshed: {} users, {} today",
                        snapshot.total_users,
                        snapshot.today_users
                    );
                }
                Err(e) => {
                    // Previous snapshot stays in place until the next tick
                    log::error!("❌ Scheduled snapshot refresh failed: {}", e);
                }
            }

            let wait = if settings.align_to_wall_clock {
                delay_until_boundary(Utc::now(), settings.interval)
            } else {
                settings.interval
            };
            tokio::time::sleep(wait).await;
        }
    });
}

/// Time left until the next multiple of `interval` since the Unix epoch
pub fn delay_until_boundary(now: DateTime<Utc>, interval: Duration) -> Duration {
    let interval_ms = interval.as_millis().max(1);
    let now_ms = u128::try_from(now.timestamp_millis()).unwrap_or(0);
    let remaining = interval_ms - (now_ms % interval_ms);
    Duration::from_millis(u64::try_from(remaining).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::aggregator::MetricsOptions;
    use crate::services::record_fetcher::tests::InMemoryStore;
    use crate::utils::clock::FixedClock;
    use chrono::TimeZone;

    fn snapshot(total: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            total_users: total,
            today_users: 0,
            last_week_users: 0,
            previous_week_users: 0,
            weekly_growth_percent: 0.0,
            daily_growth_percent: 0.0,
            daily_series: vec![],
            generated_at: Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn test_empty_slot() {
        let slot = SnapshotSlot::new();
        assert!(slot.latest().await.is_none());
    }

    #[tokio::test]
    async fn test_stale_run_does_not_overwrite_newer_one() {
        let slot = SnapshotSlot::new();
        let slow = slot.issue();
        let fast = slot.issue();

        // The later request completes first
        assert!(slot.publish(fast, snapshot(2)).await);
        assert!(!slot.publish(slow, snapshot(1)).await);

        assert_eq!(slot.latest().await.unwrap().total_users, 2);
    }

    #[tokio::test]
    async fn test_runs_in_order_replace_each_other() {
        let slot = SnapshotSlot::new();
        let first = slot.issue();
        assert!(slot.publish(first, snapshot(1)).await);
        let second = slot.issue();
        assert!(slot.publish(second, snapshot(5)).await);

        assert_eq!(slot.latest().await.unwrap().total_users, 5);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap();
        let failing = AnalyticsService::new(
            Arc::new(InMemoryStore {
                fail_count: true,
                ..InMemoryStore::new(1, vec![])
            }),
            Arc::new(FixedClock(now)),
            chrono::Duration::days(14),
            MetricsOptions::default(),
        );
        let slot = SnapshotSlot::new();
        let ticket = slot.issue();
        slot.publish(ticket, snapshot(9)).await;

        let result = refresh_now(&failing, &slot, FixedOffset::east_opt(0).unwrap()).await;

        assert!(result.is_err());
        assert_eq!(slot.latest().await.unwrap().total_users, 9);
    }

    #[tokio::test]
    async fn test_refresh_now_publishes() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap();
        let analytics = AnalyticsService::new(
            Arc::new(InMemoryStore::new(7, vec![])),
            Arc::new(FixedClock(now)),
            chrono::Duration::days(14),
            MetricsOptions::default(),
        );
        let slot = SnapshotSlot::new();

        let snapshot = refresh_now(&analytics, &slot, FixedOffset::east_opt(0).unwrap()).await.unwrap();

        assert_eq!(snapshot.total_users, 7);
        assert_eq!(slot.latest().await, Some(snapshot));
    }

    #[test]
    fn test_delay_until_boundary() {
        let five_minutes = Duration::from_secs(300);

        let at = Utc.with_ymd_and_hms(2026, 10, 18, 15, 3, 0).unwrap();
        assert_eq!(delay_until_boundary(at, five_minutes), Duration::from_secs(120));

        // Exactly on a boundary waits a full interval
        let on_boundary = Utc.with_ymd_and_hms(2026, 10, 18, 15, 5, 0).unwrap();
        assert_eq!(delay_until_boundary(on_boundary, five_minutes), five_minutes);
    }
}
