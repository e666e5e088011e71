use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::coffee::CoffeeClientError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Coffee API error: {0}")]
    Upstream(#[from] CoffeeClientError),

    #[error("No recommendation available.")]
    NoRecommendation,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::NoRecommendation => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Upstream(e) => {
                tracing::warn!(error = %e, endpoint = e.endpoint(), "Upstream request failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Coffee service unavailable".to_string(),
                )
            }
            AppError::Internal(_) => {
                tracing::error!("Internal error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// Turn a handler panic into a 500 response.
///
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(format!("handler panicked: {}", message)).into_response()
}
