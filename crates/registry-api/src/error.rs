//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use registry_core::validation::ValidationFailure;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The filing was rejected by its validator.
  #[error("filing failed validation with {} error(s)", .0.errors.len())]
  Invalid(ValidationFailure),

  #[error("core error: {0}")]
  Core(#[from] registry_core::Error),

  #[error("filing queue is closed")]
  QueueClosed,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::Invalid(failure) => {
        let status =
          StatusCode::from_u16(failure.status.code()).unwrap_or(StatusCode::BAD_REQUEST);
        return (status, Json(json!({ "errors": failure.errors }))).into_response();
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Core(e) => (
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        e.to_string(),
      ),
      ApiError::QueueClosed => (StatusCode::SERVICE_UNAVAILABLE, "filing queue is closed".into()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
