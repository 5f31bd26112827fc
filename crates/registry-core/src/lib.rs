//! Domain model for the business registry.
//!
//! Businesses, filings, the calendar rules that govern annual reports and good
//! standing, and the validators and processors for each filing type. This
//! crate has no HTTP or database dependencies; storage is reached through the
//! [`store::RegistryStore`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod annual_report;
pub mod business;
pub mod calendar;
pub mod document;
pub mod error;
pub mod filing;
pub mod legal_type;
pub mod processing;
pub mod store;
pub mod validation;

pub use error::{Error, Result};
