//! Error type for `cursada-service`.

use std::fmt;

use cursada_core::store::StoreError;
use thiserror::Error;

/// Why an occurrence cannot be deleted from the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRejection {
  RecurringClass,
  GeneralEvent,
}

impl fmt::Display for DeleteRejection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::RecurringClass => {
        "classes come from the subject's schedule; edit the schedule to remove them"
      }
      Self::GeneralEvent => "general events are managed from the general events list",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  Rejected(DeleteRejection),

  #[error(transparent)]
  Core(#[from] cursada_core::Error),

  #[error("background task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

impl Error {
  /// Wrap a backend error, keeping "not found" distinguishable.
  pub fn store<E: StoreError>(err: E) -> Self {
    if err.is_not_found() {
      Self::NotFound(err.to_string())
    } else {
      Self::Store(Box::new(err))
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
