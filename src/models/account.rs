use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identity-provider account, as listed by the count endpoint
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Account {
    pub uid: String,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of a paginated account listing
#[derive(Debug, Clone, Default)]
pub struct AccountPage {
    pub accounts: Vec<Account>,
    /// `None` once the listing is exhausted
    pub next_page_token: Option<String>,
}
