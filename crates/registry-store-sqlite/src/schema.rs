//! SQL schema for the registry SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Rows are never deleted; dissolution is recorded in dissolution_date.
CREATE TABLE IF NOT EXISTS businesses (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier            TEXT    NOT NULL UNIQUE,
    legal_name            TEXT    NOT NULL,
    legal_type            TEXT    NOT NULL,   -- registry code, e.g. 'BC'
    founding_date         TEXT    NOT NULL,   -- RFC 3339 UTC
    last_ar_date          TEXT,
    last_ar_year          INTEGER,
    last_agm_date         TEXT,
    dissolution_date      TEXT,
    fiscal_year_end_date  TEXT,
    tax_id                TEXT,
    restriction_ind       INTEGER NOT NULL DEFAULT 0,
    association_type      TEXT,
    last_modified         TEXT    NOT NULL,
    last_ledger_id        INTEGER,
    last_remote_ledger_id INTEGER NOT NULL DEFAULT 0,
    last_ledger_timestamp TEXT    NOT NULL,
    submitter_userid      INTEGER
);

CREATE TABLE IF NOT EXISTS filings (
    id                          INTEGER PRIMARY KEY AUTOINCREMENT,
    business_id                 INTEGER REFERENCES businesses(id),
    filing_type                 TEXT NOT NULL,   -- header name, e.g. 'annualReport'
    filing_json                 TEXT NOT NULL,
    status                      TEXT NOT NULL,   -- DRAFT | PENDING | COMPLETED | ERROR
    filing_date                 TEXT NOT NULL,
    effective_date              TEXT NOT NULL,
    completed_date              TEXT,
    court_order_file_number     TEXT,
    court_order_date            TEXT,
    court_order_effect_of_order TEXT
);

-- One counter per identifier prefix ('CP', 'BC', ...).
CREATE TABLE IF NOT EXISTS identifier_sequences (
    prefix     TEXT    PRIMARY KEY,
    next_value INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS businesses_legal_name_idx ON businesses(legal_name);
CREATE INDEX IF NOT EXISTS businesses_legal_type_idx ON businesses(legal_type);
CREATE INDEX IF NOT EXISTS filings_business_idx      ON filings(business_id);

PRAGMA user_version = 1;
";
