//! Error types for `cursada-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The exam payload returned by the generation backend could not be
  /// understood. Callers should offer a retry.
  #[error("malformed exam payload: {0}")]
  MalformedExam(String),

  #[error("invalid file name: {0:?}")]
  InvalidFileName(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
