use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::{
    api::AppState,
    services::{auth_service::Claims, identity_service},
    utils::error::AppError,
};

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalUsersResponse {
    pub total_users: u64,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/count",
    tag = "Users",
    responses(
        (status = 200, description = "Number of registered accounts", body = TotalUsersResponse),
        (status = 401, description = "Caller is not authenticated"),
        (status = 500, description = "Identity provider failure")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_total_users(
    claims: web::ReqData<Claims>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    log::info!("👥 GET /users/count - operator: {}", claims.sub);

    let total_users = identity_service::count_registered_users(state.identity.as_ref()).await?;

    log::info!("✅ Total users: {}", total_users);
    Ok(HttpResponse::Ok().json(TotalUsersResponse { total_users }))
}
