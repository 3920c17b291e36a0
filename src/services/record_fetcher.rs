use chrono::{DateTime, Duration, Utc};

use crate::{models::UserRecord, services::record_store::RecordStore, utils::error::AppError};

/// Raw inputs of one aggregation run
#[derive(Debug, Clone)]
pub struct FetchedRecords {
    pub total_count: u64,
    /// Newest first, every record created at or after `now - lookback`
    pub records: Vec<UserRecord>,
}

/// Issues the count and the range query concurrently; either failure fails the run
pub async fn fetch_records(
    store: &dyn RecordStore,
    now: DateTime<Utc>,
    lookback: Duration,
) -> Result<FetchedRecords, AppError> {
    let lower = now - lookback;

    let (total_count, records) = tokio::try_join!(store.count_all(), store.find_created_since(lower))?;

    Ok(FetchedRecords { total_count, records })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory store with optional injected failures
    #[derive(Default)]
    pub struct InMemoryStore {
        pub total: u64,
        pub records: Vec<UserRecord>,
        pub fail_count: bool,
        pub fail_query: bool,
        pub count_calls: AtomicUsize,
        pub lower_bounds: Mutex<Vec<DateTime<Utc>>>,
    }

    impl InMemoryStore {
        pub fn new(total: u64, records: Vec<UserRecord>) -> Self {
            Self {
                total,
                records,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl RecordStore for InMemoryStore {
        async fn count_all(&self) -> Result<u64, AppError> {
            self.count_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_count {
                return Err(AppError::DatabaseError("count timed out".into()));
            }
            Ok(self.total)
        }

        async fn find_created_since(&self, lower: DateTime<Utc>) -> Result<Vec<UserRecord>, AppError> {
            self.lower_bounds.lock().unwrap().push(lower);
            if self.fail_query {
                return Err(AppError::DatabaseError("query rejected".into()));
            }
            let mut matching: Vec<UserRecord> = self
                .records
                .iter()
                .filter(|r| r.created_at >= lower)
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(matching)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_uses_lookback_lower_bound() {
        let store = InMemoryStore::new(
            3,
            vec![
                UserRecord::new("old", now() - Duration::days(20)),
                UserRecord::new("edge", now() - Duration::days(14)),
                UserRecord::new("recent", now() - Duration::hours(1)),
            ],
        );

        let fetched = fetch_records(&store, now(), Duration::days(14)).await.unwrap();

        assert_eq!(fetched.total_count, 3);
        let ids: Vec<&str> = fetched.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["recent", "edge"]);
        assert_eq!(*store.lower_bounds.lock().unwrap(), vec![now() - Duration::days(14)]);
    }

    #[tokio::test]
    async fn test_count_failure_fails_the_run() {
        let store = InMemoryStore {
            fail_count: true,
            ..InMemoryStore::new(10, vec![])
        };

        let result = fetch_records(&store, now(), Duration::days(14)).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_query_failure_fails_the_run() {
        let store = InMemoryStore {
            fail_query: true,
            ..InMemoryStore::new(10, vec![])
        };

        let result = fetch_records(&store, now(), Duration::days(14)).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_each_call_requeries() {
        let store = InMemoryStore::new(1, vec![]);

        fetch_records(&store, now(), Duration::days(14)).await.unwrap();
        fetch_records(&store, now(), Duration::days(14)).await.unwrap();

        assert_eq!(store.count_calls.load(Ordering::SeqCst), 2);
    }
}
