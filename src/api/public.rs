//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::intake::IntakeError;

// Errors

pub enum ApiError {
    BadRequest(String),
    Internal(anyhow::Error),
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(submit::SubmitEmailResponse::failure(message)),
            )
                .into_response(),
            ApiError::Internal(err) => {
                // Details stay in the server log
                tracing::error!("Error submitting email: {:#}", err);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(submit::SubmitEmailResponse::failure(
                        "Server error. Please try again.",
                    )),
                )
                    .into_response()
            }
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Validation(message) | IntakeError::Conflict(message) => {
                Self::BadRequest(message)
            }
            IntakeError::Upstream(err) => Self::Internal(err),
        }
    }
}

// Re-export public types from each route

pub mod submit {
    pub use crate::api::routes::submit::public::*;
}
