//! Filing validation.
//!
//! Validators inspect a submitted filing document against the current state
//! of its business and report every caller-correctable problem at once as a
//! [`ValidationFailure`]. They never mutate anything.

mod alteration;
mod annual_report;
mod court_order;
mod dissolution;
mod incorporation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  business::Business,
  document::{FilingDocument, FilingEnvelope},
  filing::FilingType,
};

pub const MISSING_BUSINESS_OR_FILING: &str = "A valid business and filing are required.";
pub const MIXED_INCORPORATION: &str =
  "An incorporation application cannot be combined with other filings.";

// ─── Failure payload ─────────────────────────────────────────────────────────

/// Status a failed validation should be reported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum FailureStatus {
  BadRequest,
  Forbidden,
  NotFound,
}

impl FailureStatus {
  pub fn code(self) -> u16 {
    match self {
      Self::BadRequest => 400,
      Self::Forbidden => 403,
      Self::NotFound => 404,
    }
  }
}

impl From<FailureStatus> for u16 {
  fn from(value: FailureStatus) -> Self { value.code() }
}

impl TryFrom<u16> for FailureStatus {
  type Error = String;

  fn try_from(value: u16) -> Result<Self, Self::Error> {
    match value {
      400 => Ok(Self::BadRequest),
      403 => Ok(Self::Forbidden),
      404 => Ok(Self::NotFound),
      other => Err(format!("unsupported failure status {other}")),
    }
  }
}

/// One problem with the submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub error: String,
  /// JSON pointer into the filing document, when the problem is local to a
  /// field.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub path:  Option<String>,
}

impl FieldError {
  pub fn new(error: impl Into<String>) -> Self { Self { error: error.into(), path: None } }

  pub fn at(path: impl Into<String>, error: impl Into<String>) -> Self {
    Self { error: error.into(), path: Some(path.into()) }
  }
}

/// Structured rejection of a filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
  pub status: FailureStatus,
  pub errors: Vec<FieldError>,
}

impl ValidationFailure {
  pub fn new(status: FailureStatus, errors: Vec<FieldError>) -> Self { Self { status, errors } }

  pub fn bad_request(errors: Vec<FieldError>) -> Self {
    Self::new(FailureStatus::BadRequest, errors)
  }

  pub fn missing_business_or_filing() -> Self {
    Self::bad_request(vec![FieldError::new(MISSING_BUSINESS_OR_FILING)])
  }
}

pub type Validation = Result<(), ValidationFailure>;

/// Turn collected field errors into a verdict.
pub(crate) fn verdict(errors: Vec<FieldError>) -> Validation {
  if errors.is_empty() {
    Ok(())
  } else {
    Err(ValidationFailure::bad_request(errors))
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Validate `envelope` against `business` as of `now`.
///
/// Every filing type except an incorporation application requires an
/// existing business. Bodies present beyond the one the header names are
/// validated too.
pub fn validate(
  business: Option<&Business>,
  envelope: Option<&FilingEnvelope>,
  now: DateTime<Utc>,
) -> Validation {
  let Some(envelope) = envelope else {
    return Err(ValidationFailure::missing_business_or_filing());
  };
  let document = &envelope.filing;

  let filing_type = document.filing_type().map_err(|err| {
    ValidationFailure::bad_request(vec![FieldError::at("/filing/header/name", err.to_string())])
  })?;

  let mut types = vec![filing_type];
  types.extend(document.present_types().into_iter().filter(|t| *t != filing_type));

  if types.contains(&FilingType::IncorporationApplication) {
    if types.len() > 1 {
      return Err(ValidationFailure::bad_request(vec![FieldError::at(
        "/filing",
        MIXED_INCORPORATION,
      )]));
    }
    return incorporation::validate(business, document);
  }

  let Some(business) = business else {
    return Err(ValidationFailure::missing_business_or_filing());
  };
  // Processing applies every body present, so each one is checked.
  for filing_type in types {
    validate_for_business(filing_type, business, document, now)?;
  }
  Ok(())
}

fn validate_for_business(
  filing_type: FilingType,
  business: &Business,
  document: &FilingDocument,
  now: DateTime<Utc>,
) -> Validation {
  match filing_type {
    FilingType::Alteration => alteration::validate(business, document, now),
    FilingType::AnnualReport => annual_report::validate(business, document, now),
    FilingType::Dissolution => dissolution::validate(business, document, now),
    FilingType::IncorporationApplication => incorporation::validate(Some(business), document),
  }
}
