use actix_web::{web, HttpResponse};

use crate::{
    api::AppState,
    services::auth_service::{self, AuthResponse, Claims, LoginRequest},
    utils::error::AppError,
};

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    match auth_service::login(state.operators.as_ref(), &state.jwt, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", request.email);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn verify_token(claims: web::ReqData<Claims>) -> HttpResponse {
    log::info!("✓ GET /auth/verify - operator: {}", claims.sub);

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "valid": true,
        "operator_id": claims.sub,
        "email": claims.email,
        "roles": claims.roles,
        "exp": claims.exp
    }))
}
