use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fx_core::AppError;

use crate::pages::{error_page, found};

/// Errors a handler can return. Forms that re-render themselves handle their
/// own failures; everything else lands here.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] AppError),

    /// Malformed request data (bad id, unreadable multipart body).
    #[error("bad request: {0}")]
    BadRequest(String),
}

/// The text of an internal error, attached to the generic 500 response so
/// `expose_error_details` can show it when configured to.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                error_page(StatusCode::BAD_REQUEST, "Bad request", &message)
            }
            ApiError::Core(err) => match err {
                AppError::NotFound(entity, _) => error_page(
                    StatusCode::NOT_FOUND,
                    "Not found",
                    &format!("{entity} not found"),
                ),
                AppError::Validation(_) | AppError::Rule(_) => {
                    error_page(StatusCode::BAD_REQUEST, "Bad request", &err.form_message())
                }
                AppError::Unauthorized(_) => found("/auth/login"),
                AppError::Conflict(message) => {
                    error_page(StatusCode::CONFLICT, "Conflict", &message)
                }
                AppError::Internal(inner) => {
                    tracing::error!(error = ?inner, "request failed");
                    let mut response = error_page(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Something went wrong",
                        "The server hit an unexpected error. Please try again.",
                    );
                    response
                        .extensions_mut()
                        .insert(ErrorDetail(format!("{inner:#}")));
                    response
                }
            },
        }
    }
}
