//! Error type for the filer's worker and jobs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] registry_core::Error),

  #[error("filing not found: {0}")]
  FilingNotFound(i64),

  /// The stored document no longer passes validation against its business.
  #[error("filing rejected with {} error(s)", .0.errors.len())]
  Rejected(registry_core::validation::ValidationFailure),

  /// The filing names a business the store does not hold.
  #[error("filing {filing_id} has no business to apply to")]
  BusinessNotFound { filing_id: i64 },

  #[error("publish to {subject} failed: {reason}")]
  Publish { subject: String, reason: String },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
