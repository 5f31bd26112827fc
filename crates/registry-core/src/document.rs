//! Typed view of a submitted filing document.
//!
//! Leaf values the validators must report on (dates, legal-type codes) stay
//! as raw strings here so that a malformed value becomes a field-level
//! validation error rather than a decode failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  calendar::parse_iso_instant,
  filing::{CourtOrder, FilingType},
};

/// Outer wrapper: `{"filing": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilingEnvelope {
  pub filing: FilingDocument,
}

impl FilingEnvelope {
  pub fn from_json(value: serde_json::Value) -> Result<Self> {
    Ok(serde_json::from_value(value)?)
  }
}

/// The body of a filing, keyed by filing type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingDocument {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub header:                    Option<FilingHeader>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub business:                  Option<BusinessRef>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alteration:                Option<Alteration>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub annual_report:             Option<AnnualReport>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dissolution:               Option<Dissolution>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub incorporation_application: Option<IncorporationApplication>,
}

impl FilingDocument {
  /// Filing types with a body present, in processing order.
  pub fn present_types(&self) -> Vec<FilingType> {
    let mut types = Vec::new();
    if self.incorporation_application.is_some() {
      types.push(FilingType::IncorporationApplication);
    }
    if self.alteration.is_some() {
      types.push(FilingType::Alteration);
    }
    if self.annual_report.is_some() {
      types.push(FilingType::AnnualReport);
    }
    if self.dissolution.is_some() {
      types.push(FilingType::Dissolution);
    }
    types
  }

  /// The primary filing type: the header name if it is a known type,
  /// otherwise the single body present.
  pub fn filing_type(&self) -> Result<FilingType> {
    if let Some(name) = self.header.as_ref().and_then(|h| h.name.as_deref()) {
      return FilingType::from_name(name);
    }
    match self.present_types().as_slice() {
      [only] => Ok(*only),
      _ => Err(Error::MissingField("header.name")),
    }
  }

  /// The requested effective date from the header, if any and parseable.
  pub fn effective_date(&self) -> Option<DateTime<Utc>> {
    self
      .header
      .as_ref()
      .and_then(|h| h.effective_date.as_deref())
      .and_then(parse_iso_instant)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingHeader {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub effective_date: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub certified_by:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:          Option<String>,
}

/// The business the filing is made against, as the filer saw it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRef {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub identifier:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub legal_type:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub legal_name:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub founding_date: Option<String>,
}

// ─── Bodies ──────────────────────────────────────────────────────────────────

/// Court-order block as submitted; see [`CourtOrder`] for the stored form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtOrderBody {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_number:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order_date:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub effect_of_order: Option<String>,
}

impl CourtOrderBody {
  /// Convert to the stored form. Fails on an unparseable order date.
  pub fn to_court_order(&self) -> Result<CourtOrder> {
    let order_date = self
      .order_date
      .as_deref()
      .map(|raw| {
        parse_iso_instant(raw).ok_or_else(|| Error::InvalidDate {
          field: "courtOrder.orderDate",
          value: raw.to_owned(),
        })
      })
      .transpose()?;

    Ok(CourtOrder {
      file_number: self.file_number.clone(),
      order_date,
      effect_of_order: self.effect_of_order.clone(),
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPoint {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alteration {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub business:      Option<BusinessRef>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_point: Option<ContactPoint>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub court_order:   Option<CourtOrderBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualReport {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub annual_report_date:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub annual_general_meeting_date: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub annual_report_year:          Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dissolution {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dissolution_date: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dissolution_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub has_liabilities:  Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub court_order:      Option<CourtOrderBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameRequest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub nr_number:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub legal_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub legal_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncorporationApplication {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name_request: Option<NameRequest>,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn decodes_alteration_with_court_order() {
    let envelope = FilingEnvelope::from_json(json!({
      "filing": {
        "header": { "name": "alteration", "date": "2021-01-30" },
        "business": { "identifier": "BC1234567", "legalType": "BC" },
        "alteration": {
          "business": { "legalType": "BEN" },
          "courtOrder": {
            "fileNumber": "#1234-5678/90",
            "orderDate": "2021-01-30T09:56:01+08:00",
            "effectOfOrder": "hasPlan"
          }
        }
      }
    }))
    .unwrap();

    let doc = &envelope.filing;
    assert_eq!(doc.filing_type().unwrap(), FilingType::Alteration);
    let alteration = doc.alteration.as_ref().unwrap();
    assert_eq!(
      alteration.business.as_ref().unwrap().legal_type.as_deref(),
      Some("BEN")
    );

    let order = alteration.court_order.as_ref().unwrap().to_court_order().unwrap();
    assert_eq!(order.file_number.as_deref(), Some("#1234-5678/90"));
    assert_eq!(order.order_date.unwrap().to_rfc3339(), "2021-01-30T01:56:01+00:00");
  }

  #[test]
  fn unknown_keys_are_ignored() {
    let envelope = FilingEnvelope::from_json(json!({
      "filing": { "header": { "name": "dissolution" }, "dissolution": {}, "payment": {} }
    }))
    .unwrap();
    assert_eq!(envelope.filing.present_types(), vec![FilingType::Dissolution]);
  }

  #[test]
  fn filing_type_falls_back_to_single_body() {
    let doc = FilingDocument { annual_report: Some(AnnualReport::default()), ..Default::default() };
    assert_eq!(doc.filing_type().unwrap(), FilingType::AnnualReport);

    let empty = FilingDocument::default();
    assert!(matches!(empty.filing_type(), Err(Error::MissingField(_))));
  }

  #[test]
  fn unknown_header_name_is_an_error() {
    let doc = FilingDocument {
      header: Some(FilingHeader { name: Some("changeOfAddress".into()), ..Default::default() }),
      ..Default::default()
    };
    assert!(matches!(doc.filing_type(), Err(Error::UnknownFilingType(n)) if n == "changeOfAddress"));
  }

  #[test]
  fn bad_court_order_date_is_reported() {
    let body = CourtOrderBody { order_date: Some("soon".into()), ..Default::default() };
    assert!(matches!(body.to_court_order(), Err(Error::InvalidDate { .. })));
  }
}
