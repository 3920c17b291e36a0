use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::{api::AppState, services::auth_service, utils::error::AppError};

/// Rejects requests without a valid bearer token and exposes the
/// verified `Claims` to handlers through `web::ReqData<Claims>`
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match bearer_token(&req) {
            Some(token) => token,
            None => {
                return Box::pin(async move {
                    Err(AppError::Unauthenticated(
                        "The function must be called while authenticated.".to_string(),
                    )
                    .into())
                });
            }
        };

        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            log::error!("❌ AppState missing from app data; cannot verify tokens");
            return Box::pin(async move {
                Err(AppError::Internal("Server configuration error".to_string()).into())
            });
        };

        match auth_service::verify_token(&token, &state.jwt) {
            Ok(claims) => {
                log::debug!("🔑 Authenticated operator {}", claims.sub);
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await })
            }
            Err(e) => {
                log::warn!("❌ Rejected token on {}: {}", req.path(), e);
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
