//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enumerations are stored as
//! their registry codes. The filing document is stored as compact JSON.

use chrono::{DateTime, Utc};
use registry_core::{
  business::Business,
  filing::{CourtOrder, Filing, FilingStatus, FilingType},
  legal_type::{AssociationType, LegalType},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── AssociationType ─────────────────────────────────────────────────────────

fn decode_association_type(s: &str) -> Result<AssociationType> {
  s.parse().map_err(|_| Error::UnknownAssociationType(s.to_owned()))
}

// ─── Business rows ───────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that feeds [`RawBusiness::from_row`].
pub const BUSINESS_COLUMNS: &str = "id, identifier, legal_name, legal_type, founding_date,
  last_ar_date, last_ar_year, last_agm_date, dissolution_date, fiscal_year_end_date,
  tax_id, restriction_ind, association_type, last_modified, last_ledger_id,
  last_remote_ledger_id, last_ledger_timestamp, submitter_userid";

/// Raw values read directly from a `businesses` row.
pub struct RawBusiness {
  pub id:                    i64,
  pub identifier:            String,
  pub legal_name:            String,
  pub legal_type:            String,
  pub founding_date:         String,
  pub last_ar_date:          Option<String>,
  pub last_ar_year:          Option<i32>,
  pub last_agm_date:         Option<String>,
  pub dissolution_date:      Option<String>,
  pub fiscal_year_end_date:  Option<String>,
  pub tax_id:                Option<String>,
  pub restriction_ind:       bool,
  pub association_type:      Option<String>,
  pub last_modified:         String,
  pub last_ledger_id:        Option<i64>,
  pub last_remote_ledger_id: i64,
  pub last_ledger_timestamp: String,
  pub submitter_userid:      Option<i64>,
}

impl RawBusiness {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                    row.get(0)?,
      identifier:            row.get(1)?,
      legal_name:            row.get(2)?,
      legal_type:            row.get(3)?,
      founding_date:         row.get(4)?,
      last_ar_date:          row.get(5)?,
      last_ar_year:          row.get(6)?,
      last_agm_date:         row.get(7)?,
      dissolution_date:      row.get(8)?,
      fiscal_year_end_date:  row.get(9)?,
      tax_id:                row.get(10)?,
      restriction_ind:       row.get(11)?,
      association_type:      row.get(12)?,
      last_modified:         row.get(13)?,
      last_ledger_id:        row.get(14)?,
      last_remote_ledger_id: row.get(15)?,
      last_ledger_timestamp: row.get(16)?,
      submitter_userid:      row.get(17)?,
    })
  }

  pub fn into_business(self) -> Result<Business> {
    let legal_type = LegalType::from_code(&self.legal_type)?;
    let founding_date = decode_dt(&self.founding_date)?;

    let mut business =
      Business::new(self.identifier, self.legal_name, legal_type, founding_date)?;
    business.id = Some(self.id);
    business.last_ar_date = decode_opt_dt(self.last_ar_date)?;
    business.last_ar_year = self.last_ar_year;
    business.last_agm_date = decode_opt_dt(self.last_agm_date)?;
    business.dissolution_date = decode_opt_dt(self.dissolution_date)?;
    business.fiscal_year_end_date = decode_opt_dt(self.fiscal_year_end_date)?;
    business.tax_id = self.tax_id;
    business.restriction_ind = self.restriction_ind;
    business.association_type = self
      .association_type
      .as_deref()
      .map(decode_association_type)
      .transpose()?;
    business.last_modified = decode_dt(&self.last_modified)?;
    business.last_ledger_id = self.last_ledger_id;
    business.last_remote_ledger_id = self.last_remote_ledger_id;
    business.last_ledger_timestamp = decode_dt(&self.last_ledger_timestamp)?;
    business.submitter_userid = self.submitter_userid;
    Ok(business)
  }
}

/// Column values for an `INSERT`/`UPDATE` of a business, in
/// [`BUSINESS_COLUMNS`] order minus the id.
pub struct BusinessParams {
  pub identifier:            String,
  pub legal_name:            String,
  pub legal_type:            &'static str,
  pub founding_date:         String,
  pub last_ar_date:          Option<String>,
  pub last_ar_year:          Option<i32>,
  pub last_agm_date:         Option<String>,
  pub dissolution_date:      Option<String>,
  pub fiscal_year_end_date:  Option<String>,
  pub tax_id:                Option<String>,
  pub restriction_ind:       bool,
  pub association_type:      Option<&'static str>,
  pub last_modified:         String,
  pub last_ledger_id:        Option<i64>,
  pub last_remote_ledger_id: i64,
  pub last_ledger_timestamp: String,
  pub submitter_userid:      Option<i64>,
}

impl BusinessParams {
  pub fn new(b: &Business) -> Self {
    Self {
      identifier:            b.identifier().to_owned(),
      legal_name:            b.legal_name.clone(),
      legal_type:            b.legal_type.code(),
      founding_date:         encode_dt(b.founding_date),
      last_ar_date:          b.last_ar_date.map(encode_dt),
      last_ar_year:          b.last_ar_year,
      last_agm_date:         b.last_agm_date.map(encode_dt),
      dissolution_date:      b.dissolution_date.map(encode_dt),
      fiscal_year_end_date:  b.fiscal_year_end_date.map(encode_dt),
      tax_id:                b.tax_id.clone(),
      restriction_ind:       b.restriction_ind,
      association_type:      b.association_type.map(AssociationType::code),
      last_modified:         encode_dt(b.last_modified),
      last_ledger_id:        b.last_ledger_id,
      last_remote_ledger_id: b.last_remote_ledger_id,
      last_ledger_timestamp: encode_dt(b.last_ledger_timestamp),
      submitter_userid:      b.submitter_userid,
    }
  }
}

// ─── Filing rows ─────────────────────────────────────────────────────────────

pub const FILING_COLUMNS: &str = "id, business_id, filing_type, filing_json, status,
  filing_date, effective_date, completed_date, court_order_file_number,
  court_order_date, court_order_effect_of_order";

/// Raw values read directly from a `filings` row.
pub struct RawFiling {
  pub id:                          i64,
  pub business_id:                 Option<i64>,
  pub filing_type:                 String,
  pub filing_json:                 String,
  pub status:                      String,
  pub filing_date:                 String,
  pub effective_date:              String,
  pub completed_date:              Option<String>,
  pub court_order_file_number:     Option<String>,
  pub court_order_date:            Option<String>,
  pub court_order_effect_of_order: Option<String>,
}

impl RawFiling {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                          row.get(0)?,
      business_id:                 row.get(1)?,
      filing_type:                 row.get(2)?,
      filing_json:                 row.get(3)?,
      status:                      row.get(4)?,
      filing_date:                 row.get(5)?,
      effective_date:              row.get(6)?,
      completed_date:              row.get(7)?,
      court_order_file_number:     row.get(8)?,
      court_order_date:            row.get(9)?,
      court_order_effect_of_order: row.get(10)?,
    })
  }

  pub fn into_filing(self) -> Result<Filing> {
    Ok(Filing {
      id:             self.id,
      business_id:    self.business_id,
      filing_type:    FilingType::from_name(&self.filing_type)?,
      filing_json:    serde_json::from_str(&self.filing_json)?,
      status:         FilingStatus::from_code(&self.status)?,
      filing_date:    decode_dt(&self.filing_date)?,
      effective_date: decode_dt(&self.effective_date)?,
      completed_date: decode_opt_dt(self.completed_date)?,
      court_order:    CourtOrder {
        file_number:     self.court_order_file_number,
        order_date:      decode_opt_dt(self.court_order_date)?,
        effect_of_order: self.court_order_effect_of_order,
      },
    })
  }
}

/// Column values for an `UPDATE` of a filing. The filing date never changes.
pub struct FilingParams {
  pub id:                          i64,
  pub business_id:                 Option<i64>,
  pub filing_json:                 String,
  pub status:                      &'static str,
  pub effective_date:              String,
  pub completed_date:              Option<String>,
  pub court_order_file_number:     Option<String>,
  pub court_order_date:            Option<String>,
  pub court_order_effect_of_order: Option<String>,
}

impl FilingParams {
  pub fn new(f: &Filing) -> Result<Self> {
    Ok(Self {
      id:                          f.id,
      business_id:                 f.business_id,
      filing_json:                 serde_json::to_string(&f.filing_json)?,
      status:                      f.status.code(),
      effective_date:              encode_dt(f.effective_date),
      completed_date:              f.completed_date.map(encode_dt),
      court_order_file_number:     f.court_order.file_number.clone(),
      court_order_date:            f.court_order.order_date.map(encode_dt),
      court_order_effect_of_order: f.court_order.effect_of_order.clone(),
    })
  }
}
