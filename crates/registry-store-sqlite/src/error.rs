//! Error type for `registry-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] registry_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown association type: {0:?}")]
  UnknownAssociationType(String),

  #[error("business not found: {0}")]
  BusinessNotFound(i64),

  #[error("filing not found: {0}")]
  FilingNotFound(i64),

  #[error("identifier {0:?} is already registered")]
  DuplicateIdentifier(String),

  /// Every number under the prefix has been handed out.
  #[error("identifier sequence {0:?} is exhausted")]
  SequenceExhausted(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
