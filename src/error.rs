//! Error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{error, info, warn};

use crate::provider::ProviderError;

/// Error definitions for the studio application.
#[derive(Debug)]
pub enum StudioError {
    /// Malformed or oversized generate request
    InvalidPayload(String),
    /// The image provider failed
    Provider(ProviderError),
    /// When DB operations fail
    DatabaseError(sea_orm::DbErr),
    /// The state document could not be (de)serialized
    Storage(String),
    /// When a requested resource is not found
    NotFound(String),
    /// When you didn't do the right thing
    BadRequest(String),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl StudioError {
    /// HTTP status used when this error reaches the boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Provider(ProviderError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Provider(_)
            | Self::DatabaseError(_)
            | Self::Storage(_)
            | Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for StudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPayload(reason) => write!(f, "INVALID_PAYLOAD: {reason}"),
            Self::Provider(err) => write!(f, "{err}"),
            Self::DatabaseError(err) => write!(f, "Database error: {err}"),
            Self::Storage(message) => write!(f, "Storage error: {message}"),
            Self::NotFound(what) => write!(f, "Not found: {what}"),
            Self::BadRequest(message) => write!(f, "{message}"),
            Self::InternalServerError(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for StudioError {}

impl From<ProviderError> for StudioError {
    fn from(err: ProviderError) -> Self {
        StudioError::Provider(err)
    }
}

impl From<sea_orm::DbErr> for StudioError {
    fn from(err: sea_orm::DbErr) -> Self {
        StudioError::DatabaseError(err)
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        StudioError::Storage(err.to_string())
    }
}

impl From<axum::http::Error> for StudioError {
    fn from(err: axum::http::Error) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for StudioError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        match &self {
            StudioError::InvalidPayload(_) | StudioError::BadRequest(_) => {
                info!("Bad request received: {}", self)
            }
            StudioError::NotFound(what) => info!("404 {what}"),
            StudioError::Provider(ProviderError::RateLimited) => warn!("{}", self),
            _ => error!("Request failed: {}", self),
        }
        (status, Json(json!({ "ok": false, "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(
            StudioError::InvalidPayload("prompt is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StudioError::from(ProviderError::RateLimited).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            StudioError::from(ProviderError::Config("missing env GEMINI_API_KEY".into()))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            StudioError::from(ProviderError::Request("connection reset".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_carry_the_error_code() {
        let err = StudioError::InvalidPayload("prompt too large".into());
        assert_eq!(err.to_string(), "INVALID_PAYLOAD: prompt too large");
        let err = StudioError::from(ProviderError::RateLimited);
        assert!(err.to_string().contains("RATE_LIMIT"));
    }
}
