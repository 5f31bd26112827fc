//! Validation for the incorporation application.

use super::{FailureStatus, FieldError, Validation, ValidationFailure, verdict};
use crate::{business::Business, document::FilingDocument, legal_type::LegalType};

/// Legal types the registry accepts incorporation applications for.
const INCORPORATING_TYPES: [LegalType; 2] = [LegalType::Coop, LegalType::BenefitCompany];

pub fn validate(business: Option<&Business>, document: &FilingDocument) -> Validation {
  if let Some(existing) = business {
    return Err(ValidationFailure::new(FailureStatus::Forbidden, vec![FieldError::new(
      format!("Business {} is already incorporated.", existing.identifier()),
    )]));
  }

  let Some(application) = document.incorporation_application.as_ref() else {
    return Err(ValidationFailure::missing_business_or_filing());
  };

  let mut errors = Vec::new();
  let name_request = application.name_request.as_ref();

  let path = "/filing/incorporationApplication/nameRequest/legalType";
  match name_request.and_then(|nr| nr.legal_type.as_deref()) {
    None => errors.push(FieldError::at(path, "A legal type is required.")),
    Some(code) => match LegalType::from_code(code) {
      Err(_) => errors.push(FieldError::at(path, format!("Unknown legal type {code:?}."))),
      Ok(legal_type) if !INCORPORATING_TYPES.contains(&legal_type) => {
        errors.push(FieldError::at(
          path,
          format!("Incorporation is not available for legal type {legal_type}."),
        ));
      }
      Ok(_) => {}
    },
  }

  if name_request
    .and_then(|nr| nr.legal_name.as_deref())
    .is_some_and(|name| name.trim().is_empty())
  {
    errors.push(FieldError::at(
      "/filing/incorporationApplication/nameRequest/legalName",
      "Legal name cannot be blank.",
    ));
  }

  verdict(errors)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use crate::{
    legal_type::LegalType,
    validation::{FailureStatus, test_support::*, validate},
  };

  fn application(legal_type: &str) -> serde_json::Value {
    json!({
      "filing": {
        "header": { "name": "incorporationApplication" },
        "incorporationApplication": {
          "nameRequest": { "legalType": legal_type, "legalName": "Bluebird Housing Co-op" }
        }
      }
    })
  }

  #[test]
  fn new_coop_is_valid_without_business() {
    let e = envelope(application("CP"));
    assert!(validate(None, Some(&e), at(2021, 1, 1)).is_ok());
  }

  #[test]
  fn existing_business_is_forbidden() {
    let b = business("CP1234567", LegalType::Coop);
    let e = envelope(application("CP"));
    let failure = validate(Some(&b), Some(&e), at(2021, 1, 1)).unwrap_err();
    assert_eq!(failure.status, FailureStatus::Forbidden);
  }

  #[test]
  fn unsupported_type_is_reported() {
    let e = envelope(application("SP"));
    let failure = validate(None, Some(&e), at(2021, 1, 1)).unwrap_err();
    assert_eq!(
      paths(&failure),
      vec![Some("/filing/incorporationApplication/nameRequest/legalType")]
    );
  }
}
