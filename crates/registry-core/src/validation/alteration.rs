//! Validation for the alteration filing.

use chrono::{DateTime, Utc};

use super::{FailureStatus, FieldError, Validation, ValidationFailure, court_order, verdict};
use crate::{business::Business, document::FilingDocument, legal_type::LegalType};

/// Legal types an alteration may be filed against.
const ALTERABLE_TYPES: [LegalType; 4] = [
  LegalType::Company,
  LegalType::BenefitCompany,
  LegalType::UnlimitedLiabilityCompany,
  LegalType::CommunityContributionCompany,
];

pub fn validate(business: &Business, document: &FilingDocument, now: DateTime<Utc>) -> Validation {
  let Some(alteration) = document.alteration.as_ref() else {
    return Err(ValidationFailure::missing_business_or_filing());
  };

  if !ALTERABLE_TYPES.contains(&business.legal_type) {
    return Err(ValidationFailure::new(FailureStatus::Forbidden, vec![FieldError::new(format!(
      "Alteration is not available for legal type {}.",
      business.legal_type
    ))]));
  }

  let mut errors = Vec::new();

  let path = "/filing/alteration/business/legalType";
  match alteration.business.as_ref().and_then(|b| b.legal_type.as_deref()) {
    // A court order may be filed on its own without changing the type.
    None if alteration.court_order.is_some() => {}
    None => errors.push(FieldError::at(path, "A new legal type is required.")),
    Some(code) if LegalType::from_code(code).is_err() => {
      errors.push(FieldError::at(path, format!("Unknown legal type {code:?}.")));
    }
    Some(_) => {}
  }

  if let Some(order) = alteration.court_order.as_ref() {
    court_order::validate(order, "/filing/alteration/courtOrder", now, &mut errors);
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

  fn alteration(new_type: &str) -> serde_json::Value {
    json!({
      "filing": {
        "header": { "name": "alteration" },
        "business": { "identifier": "BC1234567", "legalType": "BC" },
        "alteration": { "business": { "legalType": new_type } }
      }
    })
  }

  #[test]
  fn bc_to_ben_is_valid() {
    let b = business("BC1234567", LegalType::Company);
    let e = envelope(alteration("BEN"));
    assert!(validate(Some(&b), Some(&e), at(2021, 6, 1)).is_ok());
  }

  #[test]
  fn ben_to_bc_is_valid() {
    let b = business("BC1234567", LegalType::BenefitCompany);
    let e = envelope(alteration("BC"));
    assert!(validate(Some(&b), Some(&e), at(2021, 6, 1)).is_ok());
  }

  #[test]
  fn unknown_target_type_is_reported() {
    let b = business("BC1234567", LegalType::Company);
    let e = envelope(alteration("ZZZ"));
    let failure = validate(Some(&b), Some(&e), at(2021, 6, 1)).unwrap_err();
    assert_eq!(paths(&failure), vec![Some("/filing/alteration/business/legalType")]);
  }

  #[test]
  fn missing_target_type_is_reported() {
    let b = business("BC1234567", LegalType::Company);
    let e = envelope(json!({
      "filing": { "header": { "name": "alteration" }, "alteration": {} }
    }));
    let failure = validate(Some(&b), Some(&e), at(2021, 6, 1)).unwrap_err();
    assert_eq!(failure.errors[0].error, "A new legal type is required.");
  }

  #[test]
  fn court_order_alone_is_valid() {
    let b = business("BC1234567", LegalType::Company);
    let e = envelope(json!({
      "filing": {
        "header": { "name": "alteration" },
        "alteration": { "courtOrder": { "fileNumber": "#1234-5678/90", "effectOfOrder": "hasPlan" } }
      }
    }));
    assert!(validate(Some(&b), Some(&e), at(2021, 6, 1)).is_ok());
  }

  #[test]
  fn coops_cannot_alter() {
    let b = business("CP1234567", LegalType::Coop);
    let e = envelope(alteration("BEN"));
    let failure = validate(Some(&b), Some(&e), at(2021, 6, 1)).unwrap_err();
    assert_eq!(failure.status, FailureStatus::Forbidden);
  }

  #[test]
  fn court_order_errors_are_collected_with_type_errors() {
    let b = business("BC1234567", LegalType::Company);
    let e = envelope(json!({
      "filing": {
        "header": { "name": "alteration" },
        "alteration": {
          "business": { "legalType": "QQ" },
          "courtOrder": { "fileNumber": "12", "orderDate": "2021-01-30T09:56:01+08:00" }
        }
      }
    }));
    let failure = validate(Some(&b), Some(&e), at(2021, 6, 1)).unwrap_err();
    assert_eq!(
      paths(&failure),
      vec![
        Some("/filing/alteration/business/legalType"),
        Some("/filing/alteration/courtOrder/fileNumber"),
      ]
    );
  }
}
