use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    DatabaseError(String),
    Unavailable(String),
    Unauthenticated(String),
    InvalidRequest(String),
    InvalidConfig(String),
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code sent to clients alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) | AppError::Unavailable(_) => "unavailable",
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::InvalidRequest(_) => "invalid-argument",
            AppError::InvalidConfig(_) | AppError::Internal(_) => "internal",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Unavailable(msg) => write!(f, "Data unavailable: {}", msg),
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidConfig(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Store failures are reported generically; details stay in the logs
        let message = match self {
            AppError::DatabaseError(_) => "Data unavailable, please retry".to_string(),
            AppError::Unavailable(msg)
            | AppError::Unauthenticated(msg)
            | AppError::InvalidRequest(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::InvalidConfig(_) => "Server configuration error".to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "code": self.code(),
            "error": message
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Unauthenticated("no session".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::DatabaseError("timeout".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_codes_match_callable_conventions() {
        assert_eq!(AppError::Unauthenticated(String::new()).code(), "unauthenticated");
        assert_eq!(AppError::Internal(String::new()).code(), "internal");
        assert_eq!(AppError::InvalidConfig(String::new()).code(), "internal");
    }
}
