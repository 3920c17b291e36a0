use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One registered account as seen by the aggregation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
        }
    }
}
