use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

use crate::config::CollectionNames;
use crate::utils::error::AppError;

const DEFAULT_DATABASE: &str = "analytics";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, collections: &CollectionNames) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(database_name(uri));

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes(collections).await;

        Ok(mongodb)
    }

    /// Creates the indexes the analytics queries rely on
    async fn ensure_indexes(&self, collections: &CollectionNames) {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<Document>(&collections.users);
        let mut created_at_keys = Document::new();
        created_at_keys.insert(collections.created_at_field.clone(), -1);
        self.create_index(&users, IndexModel::builder().keys(created_at_keys).build(), &format!(
            "{}({})",
            collections.users, collections.created_at_field
        ))
        .await;

        let accounts = self.collection::<Document>(&collections.accounts);
        self.create_index(
            &accounts,
            IndexModel::builder().keys(doc! { "user_id": 1 }).build(),
            &format!("{}(user_id)", collections.accounts),
        )
        .await;

        let operators = self.collection::<Document>(&collections.operators);
        self.create_index(
            &operators,
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            &format!("{}(email) unique", collections.operators),
        )
        .await;

        log::info!("✅ Database indexes ready");
    }

    async fn create_index(&self, collection: &Collection<Document>, index: IndexModel, label: &str) {
        match collection.create_index(index).await {
            Ok(_) => log::info!("   ✅ Index created: {}", label),
            Err(e) => log::debug!("   ℹ️  Index not created for {}: {}", label, e),
        }
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// Database name from the URI path, e.g. `mongodb://host:27017/analytics?retryWrites=true`
fn database_name(uri: &str) -> &str {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);

    without_scheme
        .split_once('/')
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DATABASE)
}
