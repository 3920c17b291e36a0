use chrono::{Duration, FixedOffset};
use std::env;
use std::str::FromStr;

use crate::utils::{error::AppError, time::parse_utc_offset};

/// Shortest history the fetch may pull: two comparable 7-day windows
pub const MIN_FETCH_LOOKBACK_DAYS: i64 = 14;

const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:3000,http://localhost:5173,http://127.0.0.1:3000,http://127.0.0.1:5173";

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct CollectionNames {
    /// Collection holding one document per registered user
    pub users: String,
    /// Timestamp field on `users` documents
    pub created_at_field: String,
    /// Collection listed by the authenticated count endpoint
    pub accounts: String,
    pub operators: String,
}

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub interval: std::time::Duration,
    pub align_to_wall_clock: bool,
}

#[derive(Debug, Clone)]
pub struct SeedOperator {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub collections: CollectionNames,
    pub jwt: JwtSettings,
    pub fetch_lookback: Duration,
    /// Correction added to the stored user count before reporting it
    pub total_users_offset: i64,
    pub default_utc_offset: FixedOffset,
    pub refresh: RefreshSettings,
    pub user_target: Option<u64>,
    pub cors_allowed_origins: Vec<String>,
    pub seed_operator: Option<SeedOperator>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| AppError::InvalidConfig("DATABASE_URL must be set".to_string()))?;
        let jwt_secret = get("JWT_SECRET")
            .ok_or_else(|| AppError::InvalidConfig("JWT_SECRET must be set".to_string()))?;

        let lookback_days: i64 = parse_or(get("FETCH_LOOKBACK_DAYS"), "FETCH_LOOKBACK_DAYS", MIN_FETCH_LOOKBACK_DAYS)?;
        if lookback_days < MIN_FETCH_LOOKBACK_DAYS {
            return Err(AppError::InvalidConfig(format!(
                "FETCH_LOOKBACK_DAYS must be at least {} (got {})",
                MIN_FETCH_LOOKBACK_DAYS, lookback_days
            )));
        }

        let ttl_hours: i64 = parse_or(get("JWT_TTL_HOURS"), "JWT_TTL_HOURS", 24)?;
        if ttl_hours <= 0 {
            return Err(AppError::InvalidConfig("JWT_TTL_HOURS must be positive".to_string()));
        }

        let offset_minutes: i32 = parse_or(get("DEFAULT_UTC_OFFSET_MINUTES"), "DEFAULT_UTC_OFFSET_MINUTES", 0)?;
        let default_utc_offset = parse_utc_offset(offset_minutes)
            .map_err(|e| AppError::InvalidConfig(format!("DEFAULT_UTC_OFFSET_MINUTES: {}", e)))?;

        let interval_secs: u64 = parse_or(get("REFRESH_INTERVAL_SECS"), "REFRESH_INTERVAL_SECS", 300)?;
        if interval_secs == 0 {
            return Err(AppError::InvalidConfig("REFRESH_INTERVAL_SECS must be greater than 0".to_string()));
        }

        let user_target = match get("USER_TARGET") {
            Some(raw) => {
                let target: u64 = parse_value(&raw, "USER_TARGET")?;
                if target == 0 {
                    return Err(AppError::InvalidConfig("USER_TARGET must be greater than 0".to_string()));
                }
                Some(target)
            }
            None => None,
        };

        let seed_operator = match (get("OPERATOR_EMAIL"), get("OPERATOR_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedOperator { email, password }),
            _ => None,
        };

        Ok(Self {
            host: or_default("HOST", "0.0.0.0"),
            port: parse_or(get("PORT"), "PORT", 3002)?,
            database_url,
            collections: CollectionNames {
                users: or_default("USERS_COLLECTION", "users"),
                created_at_field: or_default("CREATED_AT_FIELD", "created_at"),
                accounts: or_default("ACCOUNTS_COLLECTION", "users"),
                operators: or_default("OPERATORS_COLLECTION", "operators"),
            },
            jwt: JwtSettings {
                secret: jwt_secret,
                issuer: or_default("JWT_ISSUER", "user-analytics"),
                audience: or_default("JWT_AUDIENCE", "analytics-dashboard"),
                ttl_hours,
            },
            fetch_lookback: Duration::days(lookback_days),
            total_users_offset: parse_or(get("TOTAL_USERS_OFFSET"), "TOTAL_USERS_OFFSET", 0)?,
            default_utc_offset,
            refresh: RefreshSettings {
                interval: std::time::Duration::from_secs(interval_secs),
                align_to_wall_clock: parse_or(get("REFRESH_ALIGN_TO_WALL_CLOCK"), "REFRESH_ALIGN_TO_WALL_CLOCK", true)?,
            },
            user_target,
            cors_allowed_origins: or_default("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ORIGINS)
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            seed_operator,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, AppError> {
    match raw {
        Some(value) => parse_value(&value, key),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(raw: &str, key: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::InvalidConfig(format!("{} has an invalid value: {}", key, raw)))
}
