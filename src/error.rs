use crate::board::Violation;
use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde_json::json;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// The request-facing error taxonomy. Every variant maps to one HTTP
/// status and one stable `code` string in the error envelope.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(Violation),
    RateLimited,
    Forbidden(String),
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad-request",
            ApiError::NotFound(_) => "not-found",
            ApiError::Unprocessable(_) => "unprocessable",
            ApiError::RateLimited => "rate-limited",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Internal(_) => "internal",
        }
    }

    /// What the client sees. Internal detail stays in the logs when
    /// running in production.
    fn public(&self) -> String {
        match self {
            ApiError::Internal(detail) if crate::config::production() => {
                log::error!("internal error: {}", detail);
                "internal server error".into()
            }
            ApiError::Internal(detail) => {
                log::error!("internal error: {}", detail);
                detail.clone()
            }
            other => other.to_string(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ApiError::BadRequest(reason) => write!(f, "{}", reason),
            ApiError::NotFound(what) => write!(f, "{} not found", what),
            ApiError::Unprocessable(violation) => write!(f, "{}", violation),
            ApiError::RateLimited => write!(f, "too many requests"),
            ApiError::Forbidden(reason) => write!(f, "{}", reason),
            ApiError::Internal(detail) => write!(f, "{}", detail),
        }
    }
}

impl From<Violation> for ApiError {
    fn from(violation: Violation) -> Self {
        ApiError::Unprocessable(violation)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", e))
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.public(),
            "code": self.code(),
            "timestamp": crate::now_ms(),
        }))
    }
}
