//! The `RegistryStore` trait.
//!
//! Implemented by storage backends (e.g. `registry-store-sqlite`). The API and
//! the filer depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  business::Business,
  filing::{Filing, NewFiling},
  legal_type::LegalType,
};

/// Abstraction over a registry storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Businesses ────────────────────────────────────────────────────────

  /// Insert or update a business and return it with its internal id set.
  /// Fails if another business already holds the identifier.
  fn save_business(
    &self,
    business: Business,
  ) -> impl Future<Output = Result<Business, Self::Error>> + Send + '_;

  /// Businesses are never removed from the register. A dissolved business is
  /// saved with its dissolution date; anything else is left untouched.
  fn delete_business(
    &self,
    business: Business,
  ) -> impl Future<Output = Result<Business, Self::Error>> + Send + '_;

  fn find_business_by_identifier<'a>(
    &'a self,
    identifier: &'a str,
  ) -> impl Future<Output = Result<Option<Business>, Self::Error>> + Send + 'a;

  /// Look up an active (undissolved) business by its exact legal name.
  ///
  /// Backend failures are logged and reported as "not found".
  fn find_business_by_legal_name<'a>(
    &'a self,
    legal_name: &'a str,
  ) -> impl Future<Output = Option<Business>> + Send + 'a;

  fn find_business_by_internal_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Business>, Self::Error>> + Send + '_;

  /// Businesses of a type that carries a tax id but has none recorded,
  /// dissolved ones included.
  fn businesses_without_tax_id(
    &self,
  ) -> impl Future<Output = Result<Vec<Business>, Self::Error>> + Send + '_;

  /// Active businesses of any of the given types, ordered by identifier.
  fn list_businesses_by_legal_types<'a>(
    &'a self,
    legal_types: &'a [LegalType],
  ) -> impl Future<Output = Result<Vec<Business>, Self::Error>> + Send + 'a;

  /// Draw the next unused identifier for a business of `legal_type`.
  fn next_identifier(
    &self,
    legal_type: LegalType,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  // ── Filings ───────────────────────────────────────────────────────────

  /// Persist a new filing. The store assigns the id and the filing date; the
  /// effective date defaults to the filing date.
  fn add_filing(
    &self,
    filing: NewFiling,
  ) -> impl Future<Output = Result<Filing, Self::Error>> + Send + '_;

  fn get_filing(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Filing>, Self::Error>> + Send + '_;

  /// A filing, but only if it belongs to the business with `identifier`.
  fn get_filing_for_business<'a>(
    &'a self,
    identifier: &'a str,
    filing_id: i64,
  ) -> impl Future<Output = Result<Option<Filing>, Self::Error>> + Send + 'a;

  /// All filings for a business, oldest first.
  fn list_filings(
    &self,
    business_id: i64,
  ) -> impl Future<Output = Result<Vec<Filing>, Self::Error>> + Send + '_;

  /// Update a filing's status, dates, business link and court order.
  ///
  /// The filing document itself is immutable once the filing is completed;
  /// saving a completed filing whose document differs fails.
  fn save_filing(
    &self,
    filing: Filing,
  ) -> impl Future<Output = Result<Filing, Self::Error>> + Send + '_;

  /// Save a processed business together with the filing that changed it, in
  /// one transaction. The filing is linked to the business. If either write
  /// is rejected neither is kept.
  fn apply_filing(
    &self,
    business: Business,
    filing: Filing,
  ) -> impl Future<Output = Result<(Business, Filing), Self::Error>> + Send + '_;
}
