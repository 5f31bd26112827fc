//! Validation for the annual report filing.

use chrono::{DateTime, Utc};

use super::{FailureStatus, FieldError, Validation, ValidationFailure, verdict};
use crate::{business::Business, calendar::parse_iso_date, document::FilingDocument};

pub fn validate(business: &Business, document: &FilingDocument, now: DateTime<Utc>) -> Validation {
  let Some(report) = document.annual_report.as_ref() else {
    return Err(ValidationFailure::missing_business_or_filing());
  };

  if business.is_dissolved() {
    return Err(ValidationFailure::new(FailureStatus::Forbidden, vec![FieldError::new(
      "An annual report cannot be filed for a dissolved business.",
    )]));
  }

  let mut errors = Vec::new();
  let today = now.date_naive();
  let expected_year = business.next_ar_year();

  if let Some(year) = report.annual_report_year
    && year != expected_year
  {
    errors.push(FieldError::at(
      "/filing/annualReport/annualReportYear",
      format!("The next annual report to file is for {expected_year}."),
    ));
  }

  let path = "/filing/annualReport/annualReportDate";
  match report.annual_report_date.as_deref() {
    None => errors.push(FieldError::at(path, "Annual report date is required.")),
    Some(raw) => match parse_iso_date(raw) {
      None => errors.push(FieldError::at(path, "Invalid annual report date format.")),
      Some(date) => {
        let window = business.ar_dates(expected_year, today);
        if !window.contains(date) {
          errors.push(FieldError::at(
            path,
            format!(
              "Annual report date must be between {} and {}.",
              window.min_date, window.max_date
            ),
          ));
        }
      }
    },
  }

  let path = "/filing/annualReport/annualGeneralMeetingDate";
  if let Some(raw) = report.annual_general_meeting_date.as_deref() {
    match parse_iso_date(raw) {
      None => errors.push(FieldError::at(path, "Invalid annual general meeting date format.")),
      Some(date) if date > today => errors.push(FieldError::at(
        path,
        "Annual general meeting date cannot be in the future.",
      )),
      Some(_) => {}
    }
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

  fn report(ar_date: &str) -> serde_json::Value {
    json!({
      "filing": {
        "header": { "name": "annualReport" },
        "annualReport": { "annualReportDate": ar_date }
      }
    })
  }

  #[test]
  fn date_inside_window_is_valid() {
    // Founded 2019-03-15, no AR yet: next report is for 2020.
    let b = business("CP1234567", LegalType::Coop);
    let e = envelope(report("2021-06-30"));
    assert!(validate(Some(&b), Some(&e), at(2021, 7, 1)).is_ok());
  }

  #[test]
  fn date_after_today_is_outside_the_clamped_window() {
    let b = business("CP1234567", LegalType::Coop);
    let e = envelope(report("2021-07-15"));
    let failure = validate(Some(&b), Some(&e), at(2021, 7, 1)).unwrap_err();
    assert_eq!(
      failure.errors[0].error,
      "Annual report date must be between 2020-01-01 and 2021-07-01."
    );
  }

  #[test]
  fn benefit_company_window_starts_on_anniversary() {
    let b = business("BC1234567", LegalType::BenefitCompany);
    let early = envelope(report("2020-03-14"));
    assert!(validate(Some(&b), Some(&early), at(2021, 1, 1)).is_err());

    let on_time = envelope(report("2020-03-15"));
    assert!(validate(Some(&b), Some(&on_time), at(2021, 1, 1)).is_ok());
  }

  #[test]
  fn wrong_report_year_is_reported() {
    let b = business("BC1234567", LegalType::Company);
    let e = envelope(json!({
      "filing": {
        "header": { "name": "annualReport" },
        "annualReport": { "annualReportDate": "2020-06-01", "annualReportYear": 2019 }
      }
    }));
    let failure = validate(Some(&b), Some(&e), at(2021, 1, 1)).unwrap_err();
    assert_eq!(paths(&failure), vec![Some("/filing/annualReport/annualReportYear")]);
  }

  #[test]
  fn future_agm_and_bad_date_are_both_reported() {
    let b = business("BC1234567", LegalType::Company);
    let e = envelope(json!({
      "filing": {
        "header": { "name": "annualReport" },
        "annualReport": {
          "annualReportDate": "not-a-date",
          "annualGeneralMeetingDate": "2030-01-01"
        }
      }
    }));
    let failure = validate(Some(&b), Some(&e), at(2021, 1, 1)).unwrap_err();
    assert_eq!(failure.errors.len(), 2);
  }

  #[test]
  fn dissolved_business_cannot_file() {
    let mut b = business("BC1234567", LegalType::Company);
    b.dissolve(at(2020, 1, 1)).unwrap();
    let e = envelope(report("2020-06-01"));
    let failure = validate(Some(&b), Some(&e), at(2021, 1, 1)).unwrap_err();
    assert_eq!(failure.status, FailureStatus::Forbidden);
  }
}
