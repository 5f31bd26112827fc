//! Error types for `registry-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid-identifier-format: {0:?}")]
  InvalidIdentifierFormat(String),

  #[error("unknown legal type code: {0:?}")]
  UnknownLegalType(String),

  #[error("unknown filing type: {0:?}")]
  UnknownFilingType(String),

  #[error("unknown filing status: {0:?}")]
  UnknownFilingStatus(String),

  #[error("filing document is missing {0}")]
  MissingField(&'static str),

  #[error("invalid date in {field}: {value:?}")]
  InvalidDate { field: &'static str, value: String },

  #[error("business {0} is already dissolved")]
  AlreadyDissolved(String),

  #[error("filing {0} is completed and can no longer change")]
  FilingLocked(i64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// HTTP-style status code a caller should surface for this error.
  pub fn status_code(&self) -> u16 {
    match self {
      Self::InvalidIdentifierFormat(_) => 406,
      Self::FilingLocked(_) | Self::AlreadyDissolved(_) => 409,
      Self::Serialization(_) => 500,
      _ => 400,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
