use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Analytics API",
        version = "1.0.0",
        description = "User growth metrics for the operator dashboard.\n\n**Authentication:** every `/api/v1` endpoint except login requires a JWT Bearer token.\n\n**Metrics:** total users, today's sign-ups, rolling weekly growth and a seven-day chart series."
    ),
    paths(
        // Auth
        crate::api::auth::login,
        crate::api::auth::verify_token,

        // Analytics
        crate::api::analytics::get_analytics,
        crate::api::analytics::get_latest,
        crate::api::analytics::refresh,

        // Users
        crate::api::users::get_total_users,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::AuthResponse,
            crate::services::auth_service::OperatorInfo,
            crate::api::analytics::AnalyticsResponse,
            crate::api::analytics::MetricCard,
            crate::api::analytics::ChangeType,
            crate::api::analytics::TargetProgress,
            crate::models::MetricsSnapshot,
            crate::models::DailyPoint,
            crate::api::users::TotalUsersResponse,
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Operator login and token verification."),
        (name = "Analytics", description = "Aggregated user growth metrics and chart series."),
        (name = "Users", description = "Authenticated count of registered accounts."),
        (name = "Health", description = "Health check and service counters."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
