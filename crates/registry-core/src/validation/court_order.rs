//! Court-order checks shared by every filing that can carry one.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};

use super::FieldError;
use crate::{calendar::parse_iso_instant, document::CourtOrderBody};

const FILE_NUMBER_LENGTH: RangeInclusive<usize> = 5..=20;

/// Validate the court order at `base` (a JSON pointer such as
/// `/filing/alteration/courtOrder`), appending any problems to `errors`.
pub fn validate(
  order: &CourtOrderBody,
  base: &str,
  now: DateTime<Utc>,
  errors: &mut Vec<FieldError>,
) {
  match order.file_number.as_deref().map(str::trim) {
    None | Some("") => errors.push(FieldError::at(
      format!("{base}/fileNumber"),
      "Court order file number is required.",
    )),
    Some(number) if !FILE_NUMBER_LENGTH.contains(&number.chars().count()) => {
      errors.push(FieldError::at(
        format!("{base}/fileNumber"),
        "Length of court order file number must be from 5 to 20 characters.",
      ));
    }
    Some(_) => {}
  }

  if let Some(raw) = order.order_date.as_deref() {
    match parse_iso_instant(raw) {
      None => errors.push(FieldError::at(
        format!("{base}/orderDate"),
        "Invalid court order date format.",
      )),
      Some(date) if date > now => errors.push(FieldError::at(
        format!("{base}/orderDate"),
        "Court order date cannot be in the future.",
      )),
      Some(_) => {}
    }
  }

  if order.effect_of_order.as_deref().is_some_and(|e| e.trim().is_empty()) {
    errors.push(FieldError::at(
      format!("{base}/effectOfOrder"),
      "Invalid effect of order.",
    ));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validation::test_support::at;

  const BASE: &str = "/filing/alteration/courtOrder";

  fn order(file_number: Option<&str>, order_date: Option<&str>) -> CourtOrderBody {
    CourtOrderBody {
      file_number:     file_number.map(Into::into),
      order_date:      order_date.map(Into::into),
      effect_of_order: Some("hasPlan".into()),
    }
  }

  fn check(order: &CourtOrderBody) -> Vec<FieldError> {
    let mut errors = Vec::new();
    validate(order, BASE, at(2021, 6, 1), &mut errors);
    errors
  }

  #[test]
  fn well_formed_order_passes() {
    assert!(check(&order(Some("#1234-5678/90"), Some("2021-01-30T09:56:01+08:00"))).is_empty());
  }

  #[test]
  fn file_number_is_required_and_bounded() {
    let errors = check(&order(None, None));
    assert_eq!(errors[0].path.as_deref(), Some("/filing/alteration/courtOrder/fileNumber"));

    assert_eq!(check(&order(Some("1234"), None)).len(), 1);
    assert_eq!(check(&order(Some("123456789012345678901"), None)).len(), 1);
    assert!(check(&order(Some("12345"), None)).is_empty());
  }

  #[test]
  fn order_date_must_parse_and_not_be_future() {
    let errors = check(&order(Some("12345"), Some("last tuesday")));
    assert_eq!(errors[0].error, "Invalid court order date format.");

    let errors = check(&order(Some("12345"), Some("2030-01-01")));
    assert_eq!(errors[0].error, "Court order date cannot be in the future.");
  }

  #[test]
  fn blank_effect_of_order_is_rejected() {
    let mut o = order(Some("12345"), None);
    o.effect_of_order = Some("  ".into());
    assert_eq!(check(&o)[0].path.as_deref(), Some("/filing/alteration/courtOrder/effectOfOrder"));
  }
}
