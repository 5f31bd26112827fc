//! Filer service for the business registry.
//!
//! Serves the registry API, drains the filing queue with a single worker, and
//! runs the annual report reminder job. The binary in `main.rs` wires these
//! together from [`FilerConfig`].

pub mod error;
pub mod publish;
pub mod reminder;
pub mod worker;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, routing::get};
use config::{ConfigBuilder, ConfigError, Environment, builder::DefaultState};
use registry_core::{filing::FilingMessage, legal_type::LegalType, store::RegistryStore};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `registry.toml` and `REGISTRY_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct FilerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Bound on filings accepted but not yet picked up by the worker.
  #[serde(default = "default_queue_capacity")]
  pub queue_capacity: usize,
  #[serde(default)]
  pub reminder:       ReminderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReminderConfig {
  /// Legal types that receive annual report reminders.
  #[serde(default = "default_reminder_types")]
  pub legal_types: Vec<LegalType>,
  /// Fee quoted in the reminder, as the payment service formats it.
  #[serde(default = "default_ar_fee")]
  pub ar_fee:      String,
}

impl Default for ReminderConfig {
  fn default() -> Self {
    Self { legal_types: default_reminder_types(), ar_fee: default_ar_fee() }
  }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("registry.db") }
fn default_queue_capacity() -> usize { 64 }
fn default_reminder_types() -> Vec<LegalType> { vec![LegalType::BenefitCompany] }
fn default_ar_fee() -> String { "43.39".into() }

impl FilerConfig {
  /// Read `file` if it exists, then let `REGISTRY_*` variables override it.
  /// Nested keys use a double underscore: `REGISTRY_REMINDER__AR_FEE`.
  pub fn load(file: PathBuf) -> Result<Self, ConfigError> {
    Self::from_builder(config::Config::builder().add_source(config::File::from(file).required(false)))
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder
      .add_source(
        Environment::with_prefix("REGISTRY")
          .prefix_separator("_")
          .separator("__")
          .list_separator(",")
          .with_list_parse_key("reminder.legal_types")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The registry API plus a liveness endpoint, with request tracing.
pub fn router<S>(store: Arc<S>, queue: mpsc::Sender<FilingMessage>) -> Router
where
  S: RegistryStore + Clone + Send + Sync + 'static,
{
  registry_api::api_router(store, queue)
    .route("/health", get(health))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::FileFormat;
  use registry_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  fn from_toml(toml: &str) -> FilerConfig {
    FilerConfig::from_builder(
      config::Config::builder().add_source(config::File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.queue_capacity, 64);
    assert_eq!(cfg.reminder.legal_types, vec![LegalType::BenefitCompany]);
  }

  #[test]
  fn reminder_types_are_read_as_codes() {
    let cfg = from_toml(
      r#"
        port = 9000
        store_path = "/var/lib/registry.db"

        [reminder]
        legal_types = ["BEN", "CP"]
        ar_fee = "70.00"
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/registry.db"));
    assert_eq!(cfg.reminder.legal_types, vec![LegalType::BenefitCompany, LegalType::Coop]);
    assert_eq!(cfg.reminder.ar_fee, "70.00");
  }

  #[test]
  fn unknown_reminder_type_is_rejected() {
    let result = FilerConfig::from_builder(config::Config::builder().add_source(
      config::File::from_str("[reminder]\nlegal_types = [\"NOPE\"]", FileFormat::Toml),
    ));
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn health_is_ok() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let (tx, _rx) = mpsc::channel(1);
    let resp = router(store, tx)
      .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn api_routes_are_mounted() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let (tx, _rx) = mpsc::channel(1);
    let resp = router(store, tx)
      .oneshot(Request::builder().uri("/businesses/BC1234567").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
