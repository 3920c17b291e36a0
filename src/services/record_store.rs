use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};

use crate::{
    database::MongoDB,
    models::UserRecord,
    utils::{error::AppError, time::MAX_UTC_OFFSET_MINUTES},
};

/// Read access to the collection of registered users
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Number of records in the whole collection
    async fn count_all(&self) -> Result<u64, AppError>;

    /// Records with `created_at >= lower`, newest first
    async fn find_created_since(&self, lower: DateTime<Utc>) -> Result<Vec<UserRecord>, AppError>;
}

pub struct MongoRecordStore {
    db: MongoDB,
    collection: String,
    created_at_field: String,
}

impl MongoRecordStore {
    pub fn new(db: MongoDB, collection: impl Into<String>, created_at_field: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
            created_at_field: created_at_field.into(),
        }
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn count_all(&self) -> Result<u64, AppError> {
        let collection = self.db.collection::<Document>(&self.collection);
        let count = collection.count_documents(doc! {}).await?;
        Ok(count)
    }

    async fn find_created_since(&self, lower: DateTime<Utc>) -> Result<Vec<UserRecord>, AppError> {
        let collection = self.db.collection::<Document>(&self.collection);

        let mut cursor = collection
            .find(created_since_filter(&self.created_at_field, lower))
            .sort(newest_first_sort(&self.created_at_field))
            .projection(record_projection(&self.created_at_field))
            .await?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        while let Some(document) = cursor.try_next().await? {
            match normalize_record(&document, &self.created_at_field) {
                Some(record) => records.push(record),
                None => {
                    skipped += 1;
                    log::warn!(
                        "⚠️  Skipping {} document without a readable '{}': {:?}",
                        self.collection,
                        self.created_at_field,
                        document.get("_id")
                    );
                }
            }
        }

        // String timestamps were matched against a widened bound
        records.retain(|record| record.created_at >= lower);
        // Dates and strings sort as separate BSON types
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        log::debug!(
            "📥 {} records since {} ({} skipped)",
            records.len(),
            lower.to_rfc3339(),
            skipped
        );

        Ok(records)
    }
}

/// Matches native dates at or after `lower`, and ISO-8601 strings that may be.
///
/// Strings compare lexically, so an offset like `-03:00` can put a string up to
/// the widest UTC offset away from its instant. The string bound is widened by
/// that much and exact filtering happens after parsing.
pub fn created_since_filter(created_at_field: &str, lower: DateTime<Utc>) -> Document {
    let widened = lower - Duration::minutes(i64::from(MAX_UTC_OFFSET_MINUTES));

    let mut as_date = Document::new();
    as_date.insert(
        created_at_field,
        doc! { "$gte": BsonDateTime::from_millis(lower.timestamp_millis()) },
    );
    let mut as_string = Document::new();
    as_string.insert(
        created_at_field,
        doc! { "$gte": widened.to_rfc3339_opts(SecondsFormat::Millis, true), "$type": "string" },
    );

    doc! { "$or": [as_date, as_string] }
}

pub fn newest_first_sort(created_at_field: &str) -> Document {
    let mut sort = Document::new();
    sort.insert(created_at_field, -1);
    sort
}

pub fn record_projection(created_at_field: &str) -> Document {
    let mut projection = doc! { "_id": 1, "user_id": 1 };
    projection.insert(created_at_field, 1);
    projection
}

/// Maps a stored document to a `UserRecord`; `None` when id or timestamp is unusable
pub fn normalize_record(document: &Document, created_at_field: &str) -> Option<UserRecord> {
    let id = match document.get_str("user_id") {
        Ok(user_id) => user_id.to_string(),
        Err(_) => match document.get("_id")? {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s.clone(),
            _ => return None,
        },
    };

    let created_at = parse_created_at(document.get(created_at_field)?)?;

    Some(UserRecord::new(id, created_at))
}

/// Accepts native BSON dates and RFC 3339 / ISO-8601 strings
pub fn parse_created_at(value: &Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis()),
        Bson::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        _ => None,
    }
}
