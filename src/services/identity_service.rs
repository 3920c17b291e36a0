use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};

use crate::{
    database::MongoDB,
    models::{Account, AccountPage},
    services::record_store::parse_created_at,
    utils::error::AppError,
};

/// Largest page the provider hands out per listing call
pub const MAX_PAGE_SIZE: usize = 1000;

/// Listing access to the accounts known to the identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn list_accounts(&self, page_token: Option<String>, max_results: usize) -> Result<AccountPage, AppError>;
}

/// Walks every page and returns the number of registered accounts
pub async fn count_registered_users(provider: &dyn IdentityProvider) -> Result<u64, AppError> {
    let mut total = 0u64;
    let mut page_token = None;
    let mut pages = 0usize;

    loop {
        let page = provider
            .list_accounts(page_token.take(), MAX_PAGE_SIZE)
            .await
            .map_err(|e| {
                log::error!("❌ Error listing accounts: {}", e);
                AppError::Internal("An error occurred while getting total users.".to_string())
            })?;

        pages += 1;
        total += page.accounts.len() as u64;

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    log::debug!("👥 Counted {} accounts across {} page(s)", total, pages);

    Ok(total)
}

/// Accounts stored in MongoDB, paged by ascending `user_id`
pub struct MongoIdentityProvider {
    db: MongoDB,
    collection: String,
}

impl MongoIdentityProvider {
    pub fn new(db: MongoDB, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for MongoIdentityProvider {
    async fn list_accounts(&self, page_token: Option<String>, max_results: usize) -> Result<AccountPage, AppError> {
        let limit = max_results.clamp(1, MAX_PAGE_SIZE);
        let collection = self.db.collection::<Document>(&self.collection);

        let mut cursor = collection
            .find(accounts_page_filter(page_token.as_deref()))
            .sort(doc! { "user_id": 1 })
            .limit(limit as i64)
            .await?;

        let mut documents = Vec::with_capacity(limit);
        while let Some(document) = cursor.try_next().await? {
            documents.push(document);
        }

        Ok(page_from_documents(documents, limit))
    }
}

/// Accounts without a string user_id are not addressable by the listing
pub fn accounts_page_filter(page_token: Option<&str>) -> Document {
    match page_token {
        Some(after) => doc! { "user_id": { "$type": "string", "$gt": after } },
        None => doc! { "user_id": { "$type": "string" } },
    }
}

/// Builds a page from the raw documents of one listing query.
///
/// Whether another page follows depends on how many documents came back, not
/// on how many of them mapped to an account.
pub fn page_from_documents(documents: Vec<Document>, limit: usize) -> AccountPage {
    let next_page_token = if documents.len() == limit {
        documents
            .iter()
            .rev()
            .find_map(|document| document.get_str("user_id").ok())
            .map(str::to_string)
    } else {
        None
    };

    let accounts = documents
        .iter()
        .filter_map(|document| {
            let uid = document.get_str("user_id").ok()?;
            Some(Account {
                uid: uid.to_string(),
                email: document.get_str("email").ok().map(str::to_string),
                created_at: document.get("created_at").and_then(parse_created_at),
            })
        })
        .collect();

    AccountPage {
        accounts,
        next_page_token,
    }
}
