pub mod aggregator;
pub mod analytics_service;
pub mod auth_service;
pub mod identity_service;
pub mod record_fetcher;
pub mod record_store;
