use async_trait::async_trait;
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::JwtSettings, database::MongoDB, models::Operator, utils::error::AppError};

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String, // operator_id
    pub email: String,
    pub roles: Vec<String>,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: usize,
    pub operator: OperatorInfo,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OperatorInfo {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
}

/// Lookup of operators allowed into the dashboard
#[async_trait]
pub trait OperatorStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Operator>, AppError>;
}

pub struct MongoOperatorStore {
    db: MongoDB,
    collection: String,
}

impl MongoOperatorStore {
    pub fn new(db: MongoDB, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl OperatorStore for MongoOperatorStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Operator>, AppError> {
        let collection = self.db.collection::<Operator>(&self.collection);
        let operator = collection.find_one(doc! { "email": email }).await?;
        Ok(operator)
    }
}

// Generate JWT token
pub fn generate_jwt(operator: &Operator, settings: &JwtSettings) -> Result<(String, usize), AppError> {
    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::hours(settings.ttl_hours)).timestamp() as usize;

    let claims = Claims {
        sub: operator.operator_id.clone(),
        email: operator.email.clone(),
        roles: operator.roles.clone(),
        iat,
        exp,
        jti: Uuid::new_v4().to_string(),
        aud: settings.audience.clone(),
        iss: settings.issuer.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))?;

    Ok((token, exp))
}

// Verify JWT token
pub fn verify_token(token: &str, settings: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[settings.audience.as_str()]);
    validation.set_issuer(&[settings.issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {}", e)))
}

/// Checks credentials and issues a session token
pub async fn login(
    store: &dyn OperatorStore,
    settings: &JwtSettings,
    request: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    let invalid = || AppError::Unauthenticated("Invalid credentials".to_string());

    let operator = store.find_by_email(&request.email).await?.ok_or_else(invalid)?;

    let valid = verify(&request.password, &operator.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;
    if !valid {
        return Err(invalid());
    }

    if !operator.is_active {
        return Err(AppError::Unauthenticated("Account is inactive".to_string()));
    }

    let (token, expires_at) = generate_jwt(&operator, settings)?;

    Ok(AuthResponse {
        success: true,
        token,
        expires_at,
        operator: OperatorInfo {
            id: operator.operator_id,
            email: operator.email,
            name: operator.name,
            roles: operator.roles,
        },
    })
}
