//! Filing records, one per submitted regulatory document.
//!
//! A filing is append-only: once it reaches [`FilingStatus::Completed`] only
//! its court-order metadata may still change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result, document::FilingEnvelope, legal_type::LegalType};

// ─── FilingType ──────────────────────────────────────────────────────────────

/// The filing-type tag; matches the key of the body in the filing document.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FilingType {
  Alteration,
  AnnualReport,
  Dissolution,
  IncorporationApplication,
}

impl FilingType {
  pub fn name(self) -> &'static str { self.into() }

  pub fn from_name(name: &str) -> Result<Self> {
    name
      .parse()
      .map_err(|_| Error::UnknownFilingType(name.to_owned()))
  }

  /// Fee code the payment service charges this filing under for `legal_type`,
  /// if the combination is billable.
  pub fn fee_code(self, legal_type: LegalType) -> Option<&'static str> {
    use LegalType::*;
    match (self, legal_type) {
      (Self::AnnualReport, Coop) => Some("OTANN"),
      (Self::AnnualReport, BenefitCompany | Company | UnlimitedLiabilityCompany) => {
        Some("BCANN")
      }
      (Self::AnnualReport, CommunityContributionCompany) => Some("BCANN"),
      (Self::Alteration, BenefitCompany | Company | UnlimitedLiabilityCompany) => {
        Some("ALTER")
      }
      (Self::Alteration, CommunityContributionCompany) => Some("ALTER"),
      (Self::Dissolution, Coop | BenefitCompany | Company) => Some("DIS_VOL"),
      (Self::IncorporationApplication, Coop) => Some("OTINC"),
      (Self::IncorporationApplication, BenefitCompany) => Some("BCINC"),
      _ => None,
    }
  }
}

// ─── FilingStatus ────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  AsRefStr,
  Display,
  EnumString,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FilingStatus {
  Draft,
  Pending,
  Completed,
  Error,
}

impl FilingStatus {
  pub fn code(self) -> &'static str { self.into() }

  pub fn from_code(code: &str) -> Result<Self> {
    code
      .parse()
      .map_err(|_| Error::UnknownFilingStatus(code.to_owned()))
  }
}

// ─── CourtOrder ──────────────────────────────────────────────────────────────

/// Court-order metadata attached to a filing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtOrder {
  pub file_number:     Option<String>,
  pub order_date:      Option<DateTime<Utc>>,
  pub effect_of_order: Option<String>,
}

impl CourtOrder {
  pub fn is_empty(&self) -> bool {
    self.file_number.is_none() && self.order_date.is_none() && self.effect_of_order.is_none()
  }
}

// ─── Filing ──────────────────────────────────────────────────────────────────

/// A submitted filing, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filing {
  pub id:             i64,
  /// Owning business. Unset only for an incorporation that has not yet been
  /// processed.
  pub business_id:    Option<i64>,
  pub filing_type:    FilingType,
  pub filing_json:    serde_json::Value,
  pub status:         FilingStatus,
  pub filing_date:    DateTime<Utc>,
  pub effective_date: DateTime<Utc>,
  pub completed_date: Option<DateTime<Utc>>,
  pub court_order:    CourtOrder,
}

impl Filing {
  /// Decode the stored filing document.
  pub fn document(&self) -> Result<FilingEnvelope> {
    Ok(serde_json::from_value(self.filing_json.clone())?)
  }

  pub fn is_completed(&self) -> bool { self.status == FilingStatus::Completed }

  /// Mark the filing completed at `at`. Completing twice is an error.
  pub fn complete(&mut self, at: DateTime<Utc>) -> Result<()> {
    if self.is_completed() {
      return Err(Error::FilingLocked(self.id));
    }
    self.status = FilingStatus::Completed;
    self.completed_date = Some(at);
    Ok(())
  }

  /// Attach court-order metadata. Allowed at any status.
  pub fn attach_court_order(&mut self, order: CourtOrder) { self.court_order = order; }

  /// The submitted document with the record's bookkeeping merged into its
  /// header: `filingId`, `status`, `date`, `effectiveDate` and, once set,
  /// `completedDate`. A recorded court order is exposed as
  /// `filing.courtOrder`.
  pub fn to_json(&self) -> serde_json::Value {
    let mut value = self.filing_json.clone();
    if !value.is_object() {
      value = serde_json::json!({});
    }
    let filing = value
      .as_object_mut()
      .map(|root| root.entry("filing").or_insert_with(|| serde_json::json!({})));

    if let Some(filing) = filing.and_then(serde_json::Value::as_object_mut) {
      let header = filing
        .entry("header")
        .or_insert_with(|| serde_json::json!({}));
      if let Some(header) = header.as_object_mut() {
        header.insert("name".into(), self.filing_type.name().into());
        header.insert("filingId".into(), self.id.into());
        header.insert("status".into(), self.status.code().into());
        header.insert("date".into(), self.filing_date.to_rfc3339().into());
        header.insert("effectiveDate".into(), self.effective_date.to_rfc3339().into());
        if let Some(completed) = self.completed_date {
          header.insert("completedDate".into(), completed.to_rfc3339().into());
        }
      }
      if !self.court_order.is_empty()
        && let Ok(order) = serde_json::to_value(&self.court_order)
      {
        filing.insert("courtOrder".into(), order);
      }
    }
    value
  }
}

// ─── NewFiling ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::RegistryStore::add_filing`]. The store assigns the
/// id and the filing date.
#[derive(Debug, Clone)]
pub struct NewFiling {
  pub business_id:    Option<i64>,
  pub filing_type:    FilingType,
  pub filing_json:    serde_json::Value,
  pub status:         FilingStatus,
  pub effective_date: Option<DateTime<Utc>>,
}

impl NewFiling {
  /// A pending filing whose type is taken from the document header. The
  /// submitted JSON is stored as given, including keys the typed document
  /// does not model.
  pub fn pending(business_id: Option<i64>, filing_json: serde_json::Value) -> Result<Self> {
    let envelope = FilingEnvelope::from_json(filing_json.clone())?;
    Ok(Self {
      business_id,
      filing_type: envelope.filing.filing_type()?,
      filing_json,
      status: FilingStatus::Pending,
      effective_date: envelope.filing.effective_date(),
    })
  }
}

// ─── Queue message ───────────────────────────────────────────────────────────

/// Queue payload announcing that a filing is ready to be processed:
/// `{"filing": {"id": 42}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingMessage {
  pub filing: FilingRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRef {
  pub id: i64,
}

impl FilingMessage {
  pub fn new(filing_id: i64) -> Self { Self { filing: FilingRef { id: filing_id } } }

  pub fn filing_id(&self) -> i64 { self.filing.id }
}
