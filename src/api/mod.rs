pub mod analytics;
pub mod auth;
pub mod health;
pub mod metrics;
pub mod swagger;
pub mod users;

use chrono::FixedOffset;
use std::sync::Arc;

use crate::{
    config::JwtSettings,
    jobs::refresh_scheduler::SnapshotSlot,
    services::{analytics_service::AnalyticsService, auth_service::OperatorStore, identity_service::IdentityProvider},
};

/// Shared handler state; every collaborator is injected at startup
pub struct AppState {
    pub analytics: AnalyticsService,
    pub identity: Arc<dyn IdentityProvider>,
    pub operators: Arc<dyn OperatorStore>,
    pub slot: Arc<SnapshotSlot>,
    pub jwt: JwtSettings,
    pub default_utc_offset: FixedOffset,
    pub user_target: Option<u64>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::UserRecord;
    use crate::services::aggregator::MetricsOptions;
    use crate::services::auth_service::{self, tests as auth_tests};
    use crate::services::identity_service::tests::StaticProvider;
    use crate::services::record_fetcher::tests::InMemoryStore;
    use crate::utils::clock::FixedClock;
    use actix_web::web;
    use chrono::{Duration, TimeZone, Utc};

    fn build(store: InMemoryStore, identity: StaticProvider) -> web::Data<AppState> {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap();
        web::Data::new(AppState {
            analytics: AnalyticsService::new(
                Arc::new(store),
                Arc::new(FixedClock(now)),
                Duration::days(14),
                MetricsOptions::default(),
            ),
            identity: Arc::new(identity),
            operators: Arc::new(auth_tests::InMemoryOperators::with(vec![auth_tests::operator(
                "ops@example.com",
                "correct",
                true,
            )])),
            slot: Arc::new(SnapshotSlot::new()),
            jwt: auth_tests::settings(),
            default_utc_offset: FixedOffset::east_opt(0).unwrap(),
            user_target: Some(10),
        })
    }

    fn default_store() -> InMemoryStore {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap();
        InMemoryStore::new(
            3,
            vec![
                UserRecord::new("a", now - Duration::hours(1)),
                UserRecord::new("b", now - Duration::days(2)),
                UserRecord::new("c", now - Duration::days(9)),
            ],
        )
    }

    pub fn test_state() -> web::Data<AppState> {
        build(default_store(), StaticProvider::with_accounts(3))
    }

    pub fn test_state_with_store(store: InMemoryStore) -> web::Data<AppState> {
        build(store, StaticProvider::with_accounts(3))
    }

    pub fn test_state_with_identity(identity: StaticProvider) -> web::Data<AppState> {
        build(default_store(), identity)
    }

    /// `Bearer <jwt>` header value for the seeded operator
    pub fn bearer(state: &web::Data<AppState>) -> String {
        let operator = auth_tests::operator("ops@example.com", "correct", true);
        let (token, _) = auth_service::generate_jwt(&operator, &state.jwt).unwrap();
        format!("Bearer {}", token)
    }
}
