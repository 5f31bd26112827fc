//! Filing processors.
//!
//! A processor applies an already-validated filing to its business. Processors
//! touch only in-memory values; persisting the result is the caller's job.

pub mod alteration;
pub mod annual_report;
pub mod dissolution;
pub mod incorporation;

use crate::{
  Result,
  business::Business,
  document::{CourtOrderBody, FilingDocument},
  filing::{Filing, FilingType},
};

/// Apply every body present in `document` (other than an incorporation,
/// which creates rather than mutates a business) to `business` and `filing`.
///
/// Returns the filing types that were applied, in order.
pub fn process(
  business: &mut Business,
  filing: &mut Filing,
  document: &FilingDocument,
) -> Result<Vec<FilingType>> {
  let mut applied = Vec::new();

  if let Some(body) = document.alteration.as_ref() {
    alteration::process(business, filing, body)?;
    applied.push(FilingType::Alteration);
  }
  if let Some(body) = document.annual_report.as_ref() {
    annual_report::process(business, body)?;
    applied.push(FilingType::AnnualReport);
  }
  if let Some(body) = document.dissolution.as_ref() {
    dissolution::process(business, filing, body)?;
    applied.push(FilingType::Dissolution);
  }

  Ok(applied)
}

/// Copy a submitted court order onto the filing record.
pub(crate) fn attach_court_order(filing: &mut Filing, body: Option<&CourtOrderBody>) -> Result<()> {
  if let Some(body) = body {
    filing.attach_court_order(body.to_court_order()?);
  }
  Ok(())
}


#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::{test_support::*, *};
  use crate::{document::FilingEnvelope, legal_type::LegalType};

  #[test]
  fn applies_every_present_body() {
    let mut b = business(LegalType::Company);
    let mut f = filing(FilingType::Alteration, at(2021, 2, 1));
    let envelope = FilingEnvelope::from_json(json!({
      "filing": {
        "header": { "name": "alteration" },
        "alteration": { "business": { "legalType": "BEN" } },
        "annualReport": { "annualReportDate": "2020-06-01" }
      }
    }))
    .unwrap();

    let applied = process(&mut b, &mut f, &envelope.filing).unwrap();
    assert_eq!(applied, vec![FilingType::Alteration, FilingType::AnnualReport]);
    assert_eq!(b.legal_type, LegalType::BenefitCompany);
    assert_eq!(b.last_ar_year, Some(2020));
  }
}
