//! The `Business` entity: the registry's record of one legal entity.
//!
//! A business is created by an incorporation filing and mutated by every
//! filing after it. It is never physically removed; dissolution is recorded by
//! setting [`Business::dissolution_date`].

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  annual_report::ArDateWindow,
  calendar::{DateDelta, add_years_clamped, legislation_midnight_utc},
  legal_type::{AssociationType, LegalType},
};

/// Identifier prefixes the registry numbers businesses under.
pub const IDENTIFIER_PREFIXES: [&str; 3] = ["CP", "XCP", "BC"];

/// Prefix of name-request reservation codes.
pub const NAME_REQUEST_PREFIX: &str = "NR";

/// Check `identifier` against the registry naming scheme: a known prefix
/// followed by a non-zero 7-digit sequence (`CP1234567`, `XCP1234567`), or any
/// name-request reservation code (`NR...`).
pub fn validate_identifier(identifier: &str) -> bool {
  if identifier.starts_with(NAME_REQUEST_PREFIX) {
    return true;
  }
  if identifier.len() < 9 || !identifier.is_ascii() {
    return false;
  }

  let (prefix, sequence) = identifier.split_at(identifier.len() - 7);
  match sequence.parse::<u32>() {
    Ok(0) | Err(_) => return false,
    Ok(_) => {}
  }

  IDENTIFIER_PREFIXES.contains(&prefix)
}

// ─── Business ────────────────────────────────────────────────────────────────

/// Base record for a registered legal entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
  /// Internal key assigned by the store; `None` until first saved.
  pub id:                    Option<i64>,
  identifier:                String,
  pub legal_name:            String,
  pub legal_type:            LegalType,
  pub founding_date:         DateTime<Utc>,
  pub last_ar_date:          Option<DateTime<Utc>>,
  pub last_ar_year:          Option<i32>,
  pub last_agm_date:         Option<DateTime<Utc>>,
  pub dissolution_date:      Option<DateTime<Utc>>,
  pub fiscal_year_end_date:  Option<DateTime<Utc>>,
  pub tax_id:                Option<String>,
  pub restriction_ind:       bool,
  pub association_type:      Option<AssociationType>,
  pub last_modified:         DateTime<Utc>,
  pub last_ledger_id:        Option<i64>,
  pub last_remote_ledger_id: i64,
  pub last_ledger_timestamp: DateTime<Utc>,
  pub submitter_userid:      Option<i64>,
}

impl Business {
  /// Build an unsaved business. Fails if `identifier` does not follow the
  /// registry naming scheme.
  pub fn new(
    identifier: impl Into<String>,
    legal_name: impl Into<String>,
    legal_type: LegalType,
    founding_date: DateTime<Utc>,
  ) -> Result<Self> {
    let identifier = identifier.into();
    if !validate_identifier(&identifier) {
      return Err(Error::InvalidIdentifierFormat(identifier));
    }

    let now = Utc::now();
    Ok(Self {
      id: None,
      identifier,
      legal_name: legal_name.into(),
      legal_type,
      founding_date,
      last_ar_date: None,
      last_ar_year: None,
      last_agm_date: None,
      dissolution_date: None,
      fiscal_year_end_date: Some(founding_date),
      tax_id: None,
      restriction_ind: false,
      association_type: None,
      last_modified: now,
      last_ledger_id: None,
      last_remote_ledger_id: 0,
      last_ledger_timestamp: now,
      submitter_userid: None,
    })
  }

  pub fn identifier(&self) -> &str { &self.identifier }

  /// Replace the identifier, rejecting values outside the naming scheme.
  pub fn set_identifier(&mut self, value: impl Into<String>) -> Result<()> {
    let value = value.into();
    if !validate_identifier(&value) {
      return Err(Error::InvalidIdentifierFormat(value));
    }
    self.identifier = value;
    Ok(())
  }

  pub fn is_dissolved(&self) -> bool { self.dissolution_date.is_some() }

  /// Record a dissolution. The first recorded date wins.
  pub fn dissolve(&mut self, at: DateTime<Utc>) -> Result<()> {
    if self.is_dissolved() {
      return Err(Error::AlreadyDissolved(self.identifier.clone()));
    }
    self.dissolution_date = Some(at);
    Ok(())
  }

  // ── Annual reports ────────────────────────────────────────────────────

  /// Date of the last annual report, or the founding date if none was filed.
  pub fn last_anniversary(&self) -> DateTime<Utc> {
    self.last_ar_date.unwrap_or(self.founding_date)
  }

  /// The next anniversary for which an annual report is due.
  pub fn next_anniversary(&self) -> DateTime<Utc> {
    DateDelta::years(1).add_to_instant(self.last_anniversary())
  }

  /// The report year the next annual report covers.
  pub fn next_ar_year(&self) -> i32 {
    self.last_ar_year.unwrap_or_else(|| self.founding_date.year()) + 1
  }

  /// Filing window for the annual report covering `year`.
  pub fn ar_dates(&self, year: i32, today: NaiveDate) -> ArDateWindow {
    ArDateWindow::compute(self.legal_type, self.founding_date.date_naive(), year, today)
  }

  /// True when `today` is exactly one year after the anniversary the last
  /// annual report covered. That is the day a reminder goes out. Leap-day
  /// anniversaries fall on Feb 28 in other years.
  pub fn ar_reminder_due(&self, today: NaiveDate) -> bool {
    let founding = self.founding_date.date_naive();
    let shift = match self.last_ar_year {
      Some(year) => match u32::try_from(year - founding.year()) {
        Ok(years) => years,
        Err(_) => return false,
      },
      None => 0,
    };
    add_years_clamped(add_years_clamped(founding, shift), 1) == today
  }

  // ── Good standing ─────────────────────────────────────────────────────

  /// A business is in good standing while its last annual report (or its
  /// founding, if none) is less than one year, two months and one day old.
  pub fn good_standing_at(&self, now: DateTime<Utc>) -> bool {
    DateDelta::GOOD_STANDING.add_to_instant(self.last_anniversary()) > now
  }

  pub fn good_standing(&self) -> bool { self.good_standing_at(Utc::now()) }

  // ── Projection ────────────────────────────────────────────────────────

  /// External JSON projection evaluated at `now`.
  pub fn to_json_at(&self, now: DateTime<Utc>) -> BusinessJson {
    let window = self.ar_dates(self.next_ar_year(), now.date_naive());
    let next_anniversary = self.next_anniversary().date_naive();

    BusinessJson {
      founding_date:                    self.founding_date.to_rfc3339(),
      identifier:                       self.identifier.clone(),
      last_modified:                    self.last_modified.to_rfc3339(),
      last_annual_report:               iso_date_or_empty(self.last_ar_date),
      next_annual_report:               legislation_midnight_utc(next_anniversary).to_rfc3339(),
      last_annual_general_meeting_date: iso_date_or_empty(self.last_agm_date),
      last_ledger_timestamp:            self.last_ledger_timestamp.to_rfc3339(),
      legal_name:                       self.legal_name.clone(),
      legal_type:                       self.legal_type,
      has_restrictions:                 self.restriction_ind,
      good_standing:                    self.good_standing_at(now),
      ar_min_date:                      window.min_date.to_string(),
      ar_max_date:                      window.max_date.to_string(),
      dissolution_date:                 self.dissolution_date.map(iso_date),
      fiscal_year_end_date:             self.fiscal_year_end_date.map(iso_date),
      tax_id:                           self.tax_id.clone(),
    }
  }

  pub fn to_json(&self) -> BusinessJson { self.to_json_at(Utc::now()) }
}

fn iso_date(at: DateTime<Utc>) -> String { at.date_naive().to_string() }

fn iso_date_or_empty(at: Option<DateTime<Utc>>) -> String {
  at.map(iso_date).unwrap_or_default()
}

// ─── BusinessJson ────────────────────────────────────────────────────────────

/// The public view of a business. Optional fields are omitted when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessJson {
  pub founding_date:                    String,
  pub identifier:                       String,
  pub last_modified:                    String,
  pub last_annual_report:               String,
  pub next_annual_report:               String,
  pub last_annual_general_meeting_date: String,
  pub last_ledger_timestamp:            String,
  pub legal_name:                       String,
  pub legal_type:                       LegalType,
  pub has_restrictions:                 bool,
  pub good_standing:                    bool,
  pub ar_min_date:                      String,
  pub ar_max_date:                      String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dissolution_date:                 Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fiscal_year_end_date:             Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tax_id:                           Option<String>,
}
