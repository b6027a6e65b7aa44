use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{models::ApiResponse, rbac::AuthzError, repository::RepositoryError};

/// ApiError
///
/// The failure half of every page operation. Authorization failures come from the
/// policy, `NotFound` from the lifecycle after a successful gate, `BadRequest` from an
/// unreadable request body, and `Internal` from the storage layer.
///
/// The `Display` text is exactly what callers see; `Internal` deliberately displays a
/// fixed message and keeps its cause as the error source.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Page not found")]
    NotFound,
    #[error("Internal error")]
    Internal(#[from] RepositoryError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => ApiError::Unauthenticated,
            forbidden @ AuthzError::Forbidden { .. } => ApiError::Forbidden(forbidden.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(source) = &self {
            // The cause is logged here and never sent to the client.
            tracing::error!(error = %source, "request failed in the storage layer");
        }
        let status = self.status_code();
        let body = ApiResponse::<()>::failure(status.as_u16(), self.to_string());
        (status, Json(body)).into_response()
    }
}
