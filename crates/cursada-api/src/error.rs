//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cursada_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The operation is not allowed for this kind of item.
  #[error("conflict: {0}")]
  Conflict(String),

  /// Input from an upstream generator could not be understood; the client
  /// may retry.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E: StoreError>(err: E) -> Self { cursada_service::Error::store(err).into() }
}

impl From<cursada_service::Error> for ApiError {
  fn from(err: cursada_service::Error) -> Self {
    use cursada_service::Error as E;
    match err {
      E::Store(e) => Self::Store(e),
      E::NotFound(m) => Self::NotFound(m),
      E::Rejected(reason) => Self::Conflict(reason.to_string()),
      E::Core(e) => e.into(),
      E::Join(e) => Self::Store(Box::new(e)),
    }
  }
}

impl From<cursada_core::Error> for ApiError {
  fn from(err: cursada_core::Error) -> Self {
    match err {
      cursada_core::Error::MalformedExam(m) => {
        Self::Unprocessable(format!("the exam could not be read, please try again ({m})"))
      }
      cursada_core::Error::InvalidFileName(name) => {
        Self::BadRequest(format!("invalid file name: {name:?}"))
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
