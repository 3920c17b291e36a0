use chrono::{Duration, FixedOffset};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{
    models::MetricsSnapshot,
    services::{
        aggregator::{self, MetricsOptions},
        record_fetcher,
        record_store::RecordStore,
    },
    utils::{clock::Clock, error::AppError},
};

static RUN_COUNT: AtomicU64 = AtomicU64::new(0);
static FAILURE_COUNT: AtomicU64 = AtomicU64::new(0);

/// (runs started, runs failed) since process start
pub fn run_counters() -> (u64, u64) {
    (RUN_COUNT.load(Ordering::Relaxed), FAILURE_COUNT.load(Ordering::Relaxed))
}

/// Fetch + aggregate with explicitly injected store and clock
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    lookback: Duration,
    options: MetricsOptions,
}

impl AnalyticsService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        lookback: Duration,
        options: MetricsOptions,
    ) -> Self {
        Self {
            store,
            clock,
            lookback,
            options,
        }
    }

    /// Runs one aggregation. The clock is read once and that instant is used throughout.
    pub async fn snapshot(&self, offset: FixedOffset) -> Result<MetricsSnapshot, AppError> {
        RUN_COUNT.fetch_add(1, Ordering::Relaxed);

        let now = self.clock.now();

        let fetched = match record_fetcher::fetch_records(self.store.as_ref(), now, self.lookback).await {
            Ok(fetched) => fetched,
            Err(e) => {
                FAILURE_COUNT.fetch_add(1, Ordering::Relaxed);
                log::error!("❌ Analytics fetch failed: {}", e);
                return Err(e);
            }
        };

        let snapshot = aggregator::aggregate(
            fetched.total_count,
            &fetched.records,
            now.with_timezone(&offset),
            &self.options,
        );

        log::debug!(
            "📊 Snapshot: total={} today={} week={} prev_week={}",
            snapshot.total_users,
            snapshot.today_users,
            snapshot.last_week_users,
            snapshot.previous_week_users
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRecord;
    use crate::services::record_fetcher::tests::InMemoryStore;
    use crate::utils::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn service(store: InMemoryStore) -> AnalyticsService {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap();
        AnalyticsService::new(
            Arc::new(store),
            Arc::new(FixedClock(now)),
            Duration::days(14),
            MetricsOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_snapshot_uses_injected_clock_and_offset() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap();
        let store = InMemoryStore::new(
            40,
            vec![
                UserRecord::new("a", now - Duration::hours(2)),
                UserRecord::new("b", now - Duration::days(10)),
            ],
        );
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();

        let snapshot = service(store).snapshot(offset).await.unwrap();

        assert_eq!(snapshot.generated_at, now.with_timezone(&offset));
        assert_eq!(snapshot.total_users, 40);
        assert_eq!(snapshot.today_users, 1);
        assert_eq!(snapshot.last_week_users, 1);
        assert_eq!(snapshot.previous_week_users, 1);
        assert_eq!(snapshot.weekly_growth_percent, 0.0);
        assert_eq!(snapshot.daily_growth_percent, 2.5);
    }

    #[tokio::test]
    async fn test_store_failure_propagates_without_partial_snapshot() {
        let store = InMemoryStore {
            fail_query: true,
            ..InMemoryStore::new(40, vec![])
        };

        let result = service(store).snapshot(FixedOffset::east_opt(0).unwrap()).await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap();
        let store = InMemoryStore::new(3, vec![UserRecord::new("a", now - Duration::days(1))]);
        let service = service(store);
        let offset = FixedOffset::east_opt(0).unwrap();

        let first = service.snapshot(offset).await.unwrap();
        let second = service.snapshot(offset).await.unwrap();

        assert_eq!(first, second);
    }
}
