//! Validation for the voluntary dissolution filing.

use chrono::{DateTime, Utc};

use super::{FailureStatus, FieldError, Validation, ValidationFailure, court_order, verdict};
use crate::{business::Business, calendar::parse_iso_date, document::FilingDocument};

pub fn validate(business: &Business, document: &FilingDocument, now: DateTime<Utc>) -> Validation {
  let Some(dissolution) = document.dissolution.as_ref() else {
    return Err(ValidationFailure::missing_business_or_filing());
  };

  if business.is_dissolved() {
    return Err(ValidationFailure::new(FailureStatus::Forbidden, vec![FieldError::new(
      "The business is already dissolved.",
    )]));
  }

  let mut errors = Vec::new();

  let path = "/filing/dissolution/dissolutionDate";
  if let Some(raw) = dissolution.dissolution_date.as_deref() {
    match parse_iso_date(raw) {
      None => errors.push(FieldError::at(path, "Invalid dissolution date format.")),
      Some(date) if date < business.founding_date.date_naive() => errors.push(
        FieldError::at(path, "Dissolution date cannot be before the founding date."),
      ),
      Some(_) => {}
    }
  }

  if let Some(order) = dissolution.court_order.as_ref() {
    court_order::validate(order, "/filing/dissolution/courtOrder", now, &mut errors);
  }

  verdict(errors)
}
