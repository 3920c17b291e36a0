use bcrypt::{hash, DEFAULT_COST};
use mongodb::bson::{doc, oid::ObjectId};

use crate::{config::SeedOperator, database::MongoDB, models::Operator};

/// Creates the bootstrap operator when it does not exist yet.
/// Failures are logged; the service still starts without it.
pub async fn seed_default_operator(db: &MongoDB, collection_name: &str, seed: &SeedOperator) {
    let collection = db.collection::<Operator>(collection_name);

    match collection.count_documents(doc! { "email": &seed.email }).await {
        Ok(0) => {}
        Ok(_) => {
            log::info!("👤 Operator {} already exists, skipping seed", seed.email);
            return;
        }
        Err(e) => {
            log::error!("❌ Could not check for operator {}: {}", seed.email, e);
            return;
        }
    }

    let password_hash = match hash(&seed.password, DEFAULT_COST) {
        Ok(hashed) => hashed,
        Err(e) => {
            log::error!("❌ Failed to hash seed operator password: {}", e);
            return;
        }
    };

    let operator = Operator {
        operator_id: ObjectId::new().to_hex(),
        email: seed.email.clone(),
        password_hash,
        name: None,
        roles: vec!["operator".to_string(), "admin".to_string()],
        is_active: true,
    };

    match collection.insert_one(&operator).await {
        Ok(_) => log::info!("   ✅ Seeded operator {}", seed.email),
        Err(e) => log::error!("   ❌ Failed to seed operator {}: {}", seed.email, e),
    }
}
