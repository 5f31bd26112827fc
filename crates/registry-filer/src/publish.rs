//! Outbound notifications.
//!
//! The worker and the reminder job announce what they did through a
//! [`Publisher`]. Payloads are JSON; the subject names the stream they go to.

use std::future::Future;

use chrono::{DateTime, Utc};
use registry_core::{
  business::Business,
  filing::{Filing, FilingType},
};
use serde_json::{Value, json};
use tracing::info;

use crate::error::Result;

/// Subject carrying email requests.
pub const EMAIL_SUBJECT: &str = "entity.email";
/// Subject carrying business-change events.
pub const EVENT_SUBJECT: &str = "entity.events";

pub trait Publisher: Send + Sync {
  fn publish<'a>(
    &'a self,
    subject: &'a str,
    payload: Value,
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}

/// Writes every message to the log instead of a broker.
#[derive(Debug, Clone, Default)]
pub struct TracingPublisher;

impl Publisher for TracingPublisher {
  async fn publish(&self, subject: &str, payload: Value) -> Result<()> {
    info!(subject, %payload, "published");
    Ok(())
  }
}

// ─── Payloads ────────────────────────────────────────────────────────────────

/// `{"email": {"filingId", "type", "option"}}` for a processed filing.
pub fn filing_email(filing: &Filing) -> Value {
  json!({
    "email": {
      "filingId": filing.id,
      "type":     filing.filing_type.name(),
      "option":   filing.status.code(),
    }
  })
}

/// Business-change event announcing the filings applied to `business`.
pub fn business_event(
  business: &Business,
  filing: &Filing,
  applied: &[FilingType],
  at: DateTime<Utc>,
) -> Value {
  let identifier = business.identifier();
  let legal_filings: Vec<&str> = applied.iter().map(|t| t.name()).collect();
  json!({
    "specversion":     "1.x-wip",
    "type":            format!("bc.registry.business.{}", filing.filing_type.name()),
    "source":          format!("/businesses/{identifier}/filings/{}", filing.id),
    "id":              format!("{identifier}-{}", filing.id),
    "time":            at.to_rfc3339(),
    "datacontenttype": "application/json",
    "identifier":      identifier,
    "data": {
      "filing": {
        "header":       { "filingId": filing.id },
        "business":     { "identifier": identifier },
        "legalFilings": legal_filings,
      }
    }
  })
}

/// Annual report reminder for the business with internal id `business_id`.
pub fn ar_reminder_email(business_id: i64, ar_fee: &str, ar_year: i32) -> Value {
  json!({
    "email": {
      "businessId": business_id,
      "type":       "annualReport",
      "option":     "reminder",
      "arFee":      ar_fee,
      "arYear":     ar_year.to_string(),
    }
  })
}

// ─── Test double ─────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use registry_core::legal_type::LegalType;

  #[test]
  fn reminder_shape() {
    assert_eq!(
      ar_reminder_email(12, "43.39", 2021),
      json!({
        "email": {
          "businessId": 12,
          "type": "annualReport",
          "option": "reminder",
          "arFee": "43.39",
          "arYear": "2021"
        }
      })
    );
  }

  #[test]
  fn event_names_the_filing() {
    let at = Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap();
    let business = Business::new("BC1234567", "Event Ltd.", LegalType::Company, at).unwrap();
    let filing = Filing {
      id:             9,
      business_id:    Some(1),
      filing_type:    FilingType::Alteration,
      filing_json:    json!({}),
      status:         registry_core::filing::FilingStatus::Completed,
      filing_date:    at,
      effective_date: at,
      completed_date: Some(at),
      court_order:    Default::default(),
    };
    let event = business_event(&business, &filing, &[FilingType::Alteration], at);
    assert_eq!(event["type"], "bc.registry.business.alteration");
    assert_eq!(event["source"], "/businesses/BC1234567/filings/9");
    assert_eq!(event["data"]["filing"]["legalFilings"], json!(["alteration"]));
    assert_eq!(filing_email(&filing)["email"]["option"], "COMPLETED");
  }
}
