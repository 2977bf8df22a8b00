use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(String),

    #[error("invalid value {value:?} for environment variable {var}")]
    Invalid { var: String, value: String },
}

/// Credential acquisition failures. Fatal at startup.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Built through [`AuthError::request`] so the credential-bearing URL is dropped.
    #[error("token request failed: {0}")]
    Request(reqwest::Error),

    #[error("token endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("token response has no access_token: {0}")]
    MissingToken(String),
}

/// Failures of the outbound completion call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Built through [`UpstreamError::request`] so the token-bearing URL is dropped.
    #[error("completion request failed: {0}")]
    Request(reqwest::Error),

    #[error("completion endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("completion response has no result field")]
    MissingResult,
}

impl AuthError {
    pub fn request(err: reqwest::Error) -> Self {
        AuthError::Request(err.without_url())
    }
}

impl UpstreamError {
    pub fn request(err: reqwest::Error) -> Self {
        UpstreamError::Request(err.without_url())
    }
}

/// Errors rendered to HTTP clients as `{"detail": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Payload(String),

    #[error("internal server error")]
    Internal,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Payload(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}
