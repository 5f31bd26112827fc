//! [`SqliteStore`]: the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::{debug, info, warn};

use registry_core::{
  business::Business,
  filing::{Filing, NewFiling},
  legal_type::LegalType,
  store::RegistryStore,
};

use crate::{
  Error, Result,
  encode::{
    BUSINESS_COLUMNS, BusinessParams, FILING_COLUMNS, FilingParams, RawBusiness, RawFiling, encode_dt,
  },
  schema::SCHEMA,
};

/// Largest number that fits the seven-digit identifier suffix.
const MAX_SEQUENCE: i64 = 9_999_999;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A business registry backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `SELECT <business columns> ... WHERE <filter>` ordered by identifier.
  async fn select_businesses(&self, filter: String, params: Vec<Value>) -> Result<Vec<Business>> {
    let raws = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {BUSINESS_COLUMNS} FROM businesses WHERE {filter} ORDER BY identifier");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawBusiness::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBusiness::into_business).collect()
  }

  /// Run `SELECT <filing columns> ... WHERE <filter>` ordered oldest first.
  async fn select_filings(&self, filter: &'static str, params: Vec<Value>) -> Result<Vec<Filing>> {
    let raws = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {FILING_COLUMNS} FROM filings WHERE {filter} ORDER BY filing_date, id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawFiling::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFiling::into_filing).collect()
  }

  async fn select_active_legal_types(&self, legal_types: &[LegalType]) -> Result<Vec<Business>> {
    if legal_types.is_empty() {
      return Ok(Vec::new());
    }
    let placeholders = vec!["?"; legal_types.len()].join(", ");
    let params = legal_types.iter().map(|t| Value::from(t.code().to_owned())).collect();
    self
      .select_businesses(
        format!("dissolution_date IS NULL AND legal_type IN ({placeholders})"),
        params,
      )
      .await
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = Error;

  // ── Businesses ────────────────────────────────────────────────────────────

  async fn save_business(&self, mut business: Business) -> Result<Business> {
    business.last_modified = Utc::now();
    let id = business.id;
    let p = BusinessParams::new(&business);

    let saved: Result<i64> = self
      .conn
      .call(move |conn| Ok(upsert_business(conn, id, &p)?))
      .await?;

    business.id = Some(saved?);
    debug!(identifier = business.identifier(), id = ?business.id, "saved business");
    Ok(business)
  }

  async fn delete_business(&self, business: Business) -> Result<Business> {
    if !business.is_dissolved() {
      return Ok(business);
    }
    info!(identifier = business.identifier(), "recording dissolution");
    self.save_business(business).await
  }

  async fn find_business_by_identifier(&self, identifier: &str) -> Result<Option<Business>> {
    let found = self
      .select_businesses("identifier = ?1".into(), vec![Value::from(identifier.to_owned())])
      .await?;
    Ok(found.into_iter().next())
  }

  async fn find_business_by_legal_name(&self, legal_name: &str) -> Option<Business> {
    let found = self
      .select_businesses(
        "legal_name = ?1 AND dissolution_date IS NULL".into(),
        vec![Value::from(legal_name.to_owned())],
      )
      .await;
    match found {
      Ok(found) => found.into_iter().next(),
      Err(err) => {
        warn!(legal_name, error = %err, "business lookup by legal name failed");
        None
      }
    }
  }

  async fn find_business_by_internal_id(&self, id: i64) -> Result<Option<Business>> {
    let found = self
      .select_businesses("id = ?1".into(), vec![Value::from(id)])
      .await?;
    Ok(found.into_iter().next())
  }

  async fn businesses_without_tax_id(&self) -> Result<Vec<Business>> {
    let legal_types = LegalType::tax_id_types();
    let placeholders = vec!["?"; legal_types.len()].join(", ");
    let params = legal_types.iter().map(|t| Value::from(t.code().to_owned())).collect();
    self
      .select_businesses(format!("tax_id IS NULL AND legal_type IN ({placeholders})"), params)
      .await
  }

  async fn list_businesses_by_legal_types(&self, legal_types: &[LegalType]) -> Result<Vec<Business>> {
    self.select_active_legal_types(legal_types).await
  }

  async fn next_identifier(&self, legal_type: LegalType) -> Result<String> {
    let prefix = legal_type.identifier_prefix();

    let drawn: Result<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT OR IGNORE INTO identifier_sequences (prefix, next_value) VALUES (?1, 1)",
          rusqlite::params![prefix],
        )?;
        let mut value: i64 = tx.query_row(
          "SELECT next_value FROM identifier_sequences WHERE prefix = ?1",
          rusqlite::params![prefix],
          |r| r.get(0),
        )?;

        // Skip numbers already taken by businesses imported with explicit
        // identifiers.
        loop {
          if value > MAX_SEQUENCE {
            return Ok(Err(Error::SequenceExhausted(prefix)));
          }
          let candidate = format!("{prefix}{value:07}");
          value += 1;
          let taken = tx
            .query_row(
              "SELECT 1 FROM businesses WHERE identifier = ?1",
              rusqlite::params![candidate],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if !taken {
            tx.execute(
              "UPDATE identifier_sequences SET next_value = ?2 WHERE prefix = ?1",
              rusqlite::params![prefix, value],
            )?;
            tx.commit()?;
            return Ok(Ok(candidate));
          }
        }
      })
      .await?;

    drawn
  }

  // ── Filings ───────────────────────────────────────────────────────────────

  async fn add_filing(&self, input: NewFiling) -> Result<Filing> {
    let filing_date = Utc::now();
    let filing = Filing {
      id: 0,
      business_id: input.business_id,
      filing_type: input.filing_type,
      filing_json: input.filing_json,
      status: input.status,
      filing_date,
      effective_date: input.effective_date.unwrap_or(filing_date),
      completed_date: None,
      court_order: Default::default(),
    };

    let business_id   = filing.business_id;
    let filing_type   = filing.filing_type.name();
    let json_str      = serde_json::to_string(&filing.filing_json)?;
    let status        = filing.status.code();
    let filing_str    = encode_dt(filing.filing_date);
    let effective_str = encode_dt(filing.effective_date);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO filings (business_id, filing_type, filing_json, status, filing_date, effective_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![business_id, filing_type, json_str, status, filing_str, effective_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    debug!(id, filing_type, "added filing");
    Ok(Filing { id, ..filing })
  }

  async fn get_filing(&self, id: i64) -> Result<Option<Filing>> {
    let found = self.select_filings("id = ?1", vec![Value::from(id)]).await?;
    Ok(found.into_iter().next())
  }

  async fn get_filing_for_business(&self, identifier: &str, filing_id: i64) -> Result<Option<Filing>> {
    let found = self
      .select_filings(
        "id = ?2 AND business_id = (SELECT id FROM businesses WHERE identifier = ?1)",
        vec![Value::from(identifier.to_owned()), Value::from(filing_id)],
      )
      .await?;
    Ok(found.into_iter().next())
  }

  async fn list_filings(&self, business_id: i64) -> Result<Vec<Filing>> {
    self
      .select_filings("business_id = ?1", vec![Value::from(business_id)])
      .await
  }

  async fn save_filing(&self, filing: Filing) -> Result<Filing> {
    let p = FilingParams::new(&filing)?;

    let saved: Result<Filing> = self
      .conn
      .call(move |conn| {
        if let Err(err) = check_filing_writable(conn, &filing)? {
          return Ok(Err(err));
        }
        write_filing(conn, &p)?;
        Ok(Ok(filing))
      })
      .await?;

    let filing = saved?;
    debug!(id = filing.id, status = filing.status.code(), "saved filing");
    Ok(filing)
  }

  async fn apply_filing(&self, mut business: Business, mut filing: Filing) -> Result<(Business, Filing)> {
    business.last_modified = Utc::now();
    let business_id = business.id;
    let bp = BusinessParams::new(&business);
    let mut fp = FilingParams::new(&filing)?;

    let applied: Result<(i64, Filing)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id = match upsert_business(&tx, business_id, &bp)? {
          Ok(id) => id,
          Err(err) => return Ok(Err(err)),
        };
        filing.business_id = Some(id);
        fp.business_id = Some(id);
        if let Err(err) = check_filing_writable(&tx, &filing)? {
          return Ok(Err(err));
        }
        write_filing(&tx, &fp)?;
        tx.commit()?;
        Ok(Ok((id, filing)))
      })
      .await?;

    let (id, filing) = applied?;
    business.id = Some(id);
    info!(
      identifier = business.identifier(),
      filing_id = filing.id,
      status = filing.status.code(),
      "applied filing"
    );
    Ok((business, filing))
  }
}

// ─── Row writers ─────────────────────────────────────────────────────────────

/// Insert or update one business row, returning its id. The inner error is a
/// rejection the caller should report as-is.
fn upsert_business(
  conn: &rusqlite::Connection,
  id: Option<i64>,
  p: &BusinessParams,
) -> rusqlite::Result<Result<i64>> {
  let holder: Option<i64> = conn
    .query_row(
      "SELECT id FROM businesses WHERE identifier = ?1",
      rusqlite::params![p.identifier],
      |r| r.get(0),
    )
    .optional()?;
  if let Some(holder) = holder
    && Some(holder) != id
  {
    return Ok(Err(Error::DuplicateIdentifier(p.identifier.clone())));
  }

  let Some(id) = id else {
    conn.execute(
      "INSERT INTO businesses (
         identifier, legal_name, legal_type, founding_date,
         last_ar_date, last_ar_year, last_agm_date, dissolution_date,
         fiscal_year_end_date, tax_id, restriction_ind, association_type,
         last_modified, last_ledger_id, last_remote_ledger_id,
         last_ledger_timestamp, submitter_userid
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
      rusqlite::params![
        p.identifier,
        p.legal_name,
        p.legal_type,
        p.founding_date,
        p.last_ar_date,
        p.last_ar_year,
        p.last_agm_date,
        p.dissolution_date,
        p.fiscal_year_end_date,
        p.tax_id,
        p.restriction_ind,
        p.association_type,
        p.last_modified,
        p.last_ledger_id,
        p.last_remote_ledger_id,
        p.last_ledger_timestamp,
        p.submitter_userid,
      ],
    )?;
    return Ok(Ok(conn.last_insert_rowid()));
  };

  let updated = conn.execute(
    "UPDATE businesses SET
       identifier = ?1, legal_name = ?2, legal_type = ?3, founding_date = ?4,
       last_ar_date = ?5, last_ar_year = ?6, last_agm_date = ?7,
       dissolution_date = ?8, fiscal_year_end_date = ?9, tax_id = ?10,
       restriction_ind = ?11, association_type = ?12, last_modified = ?13,
       last_ledger_id = ?14, last_remote_ledger_id = ?15,
       last_ledger_timestamp = ?16, submitter_userid = ?17
     WHERE id = ?18",
    rusqlite::params![
      p.identifier,
      p.legal_name,
      p.legal_type,
      p.founding_date,
      p.last_ar_date,
      p.last_ar_year,
      p.last_agm_date,
      p.dissolution_date,
      p.fiscal_year_end_date,
      p.tax_id,
      p.restriction_ind,
      p.association_type,
      p.last_modified,
      p.last_ledger_id,
      p.last_remote_ledger_id,
      p.last_ledger_timestamp,
      p.submitter_userid,
      id,
    ],
  )?;
  if updated == 0 {
    return Ok(Err(Error::BusinessNotFound(id)));
  }
  Ok(Ok(id))
}

/// Reject a write to a missing filing, or one that changes anything but the
/// court order of a completed filing.
fn check_filing_writable(conn: &rusqlite::Connection, filing: &Filing) -> rusqlite::Result<Result<()>> {
  let raw = conn
    .query_row(
      &format!("SELECT {FILING_COLUMNS} FROM filings WHERE id = ?1"),
      rusqlite::params![filing.id],
      RawFiling::from_row,
    )
    .optional()?;
  let Some(raw) = raw else {
    return Ok(Err(Error::FilingNotFound(filing.id)));
  };
  let existing = match raw.into_filing() {
    Ok(existing) => existing,
    Err(err) => return Ok(Err(err)),
  };

  if existing.is_completed()
    && (existing.filing_json != filing.filing_json
      || existing.status != filing.status
      || existing.business_id != filing.business_id
      || existing.effective_date != filing.effective_date
      || existing.completed_date != filing.completed_date)
  {
    return Ok(Err(registry_core::Error::FilingLocked(filing.id).into()));
  }
  Ok(Ok(()))
}

fn write_filing(conn: &rusqlite::Connection, p: &FilingParams) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE filings SET
       business_id = ?2, filing_json = ?3, status = ?4, effective_date = ?5,
       completed_date = ?6, court_order_file_number = ?7, court_order_date = ?8,
       court_order_effect_of_order = ?9
     WHERE id = ?1",
    rusqlite::params![
      p.id,
      p.business_id,
      p.filing_json,
      p.status,
      p.effective_date,
      p.completed_date,
      p.court_order_file_number,
      p.court_order_date,
      p.court_order_effect_of_order,
    ],
  )?;
  Ok(())
}
