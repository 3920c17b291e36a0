mod api;
mod config;
mod database;
mod jobs;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::AppState,
    config::AppConfig,
    jobs::refresh_scheduler::{self, SnapshotSlot},
    middleware::auth::AuthMiddleware,
    services::{
        aggregator::MetricsOptions,
        analytics_service::AnalyticsService,
        auth_service::MongoOperatorStore,
        identity_service::MongoIdentityProvider,
        record_store::MongoRecordStore,
    },
    utils::clock::SystemClock,
};

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(startup_error)?;

    log::info!("🚀 Starting User Analytics Service...");
    log::info!(
        "📊 Users collection: {} (timestamp field: {}), lookback {} days",
        config.collections.users,
        config.collections.created_at_field,
        config.fetch_lookback.num_days()
    );
    if config.total_users_offset != 0 {
        log::warn!("⚠️  Reported user totals are adjusted by {}", config.total_users_offset);
    }

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&config.database_url, &config.collections)
        .await
        .map_err(startup_error)?;

    log::info!("✅ MongoDB connected successfully");

    if let Some(seed) = &config.seed_operator {
        seeds::operator_seed::seed_default_operator(&db, &config.collections.operators, seed).await;
    }

    let analytics = AnalyticsService::new(
        Arc::new(MongoRecordStore::new(
            db.clone(),
            config.collections.users.clone(),
            config.collections.created_at_field.clone(),
        )),
        Arc::new(SystemClock),
        config.fetch_lookback,
        MetricsOptions {
            total_users_offset: config.total_users_offset,
        },
    );
    let slot = Arc::new(SnapshotSlot::new());

    log::info!("📅 Starting background jobs...");
    refresh_scheduler::start_refresh_scheduler(
        analytics.clone(),
        slot.clone(),
        config.default_utc_offset,
        config.refresh.clone(),
    );

    let state = web::Data::new(AppState {
        analytics,
        identity: Arc::new(MongoIdentityProvider::new(db.clone(), config.collections.accounts.clone())),
        operators: Arc::new(MongoOperatorStore::new(db.clone(), config.collections.operators.clone())),
        slot,
        jwt: config.jwt.clone(),
        default_utc_offset: config.default_utc_offset,
        user_target: config.user_target,
    });

    let host = config.host.clone();
    let port = config.port;
    let cors_origins = config.cors_allowed_origins.clone();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(middleware::RequestCounter)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Metrics
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            // Auth endpoints
            .route("/api/v1/auth/login", web::post().to(api::auth::login))
            .service(
                web::scope("/api/v1/auth/verify")
                    .wrap(AuthMiddleware)
                    .route("", web::get().to(api::auth::verify_token)),
            )
            // Analytics: requires JWT
            .service(
                web::scope("/api/v1/analytics")
                    .wrap(AuthMiddleware)
                    .route("", web::get().to(api::analytics::get_analytics))
                    .route("/latest", web::get().to(api::analytics::get_latest))
                    .route("/refresh", web::post().to(api::analytics::refresh)),
            )
            // Users: authenticated count
            .service(
                web::scope("/api/v1/users")
                    .wrap(AuthMiddleware)
                    .route("/count", web::get().to(api::users::get_total_users)),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
