use super::envelope::ApiResponse;
use crate::clock::InvalidDate;
use crate::provider::ProviderError;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("upstream data provider failed: {0}")]
    Upstream(#[source] ProviderError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn missing_param(name: &str) -> Self {
        ApiError::InvalidInput(format!("query parameter '{name}' is required"))
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            other => ApiError::Upstream(other),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidEmail(_) => ApiError::InvalidInput(e.to_string()),
            StoreError::NotFound(_) => ApiError::NotFound(e.to_string()),
            StoreError::AlreadyExists(_) => ApiError::Conflict(e.to_string()),
            StoreError::Database(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<InvalidDate> for ApiError {
    fn from(e: InvalidDate) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, ApiResponse::error(self.to_string())).into_response()
    }
}
