//! JSON REST API for the business registry.
//!
//! Exposes an axum [`Router`] backed by any [`registry_core::store::RegistryStore`].
//! Accepted filings are persisted as `PENDING` and announced on a filing queue
//! for the worker to process. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(registry_api::api_router(store.clone(), queue_tx))
//! ```

pub mod businesses;
pub mod error;
pub mod filings;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use registry_core::{filing::FilingMessage, store::RegistryStore};
use tokio::sync::mpsc;

pub use error::ApiError;

/// Shared state threaded through the API handlers.
#[derive(Clone)]
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub queue: mpsc::Sender<FilingMessage>,
}

/// Build a fully-materialised API router for `store`, announcing accepted
/// filings on `queue`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, queue: mpsc::Sender<FilingMessage>) -> Router<()>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/businesses/filings", post(filings::incorporate::<S>))
    .route("/businesses/{identifier}", get(businesses::get_one::<S>))
    .route(
      "/businesses/{identifier}/filings",
      get(filings::list::<S>).post(filings::create::<S>),
    )
    .route("/businesses/{identifier}/filings/{id}", get(filings::get_one::<S>))
    .with_state(ApiState { store, queue })
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use chrono::{Datelike, Duration, TimeZone, Utc};
  use registry_core::{business::Business, legal_type::LegalType};
  use registry_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  struct Harness {
    store: Arc<SqliteStore>,
    queue: mpsc::Sender<FilingMessage>,
    rx:    mpsc::Receiver<FilingMessage>,
  }

  impl Harness {
    async fn new() -> Self {
      let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
      let (queue, rx) = mpsc::channel(8);
      Self { store, queue, rx }
    }

    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> Response {
      let builder = Request::builder().method(method).uri(uri);
      let req = match body {
        Some(v) => builder
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from(v.to_string()))
          .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
      };
      api_router(self.store.clone(), self.queue.clone())
        .oneshot(req)
        .await
        .unwrap()
    }
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn seed(store: &SqliteStore, identifier: &str, legal_type: LegalType) -> Business {
    // Founded a little over a year ago so the current AR window is open.
    let founded = Utc::now() - Duration::days(400);
    let b = Business::new(identifier, "Seeded Ltd.", legal_type, founded).unwrap();
    store.save_business(b).await.unwrap()
  }

  // ── Businesses ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_business_wraps_projection() {
    let h = Harness::new().await;
    seed(&h.store, "BC1234567", LegalType::Company).await;

    let resp = h.request("GET", "/businesses/BC1234567", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["business"]["identifier"], "BC1234567");
    assert_eq!(body["business"]["legalType"], "BC");
    assert_eq!(body["business"]["goodStanding"], true);
  }

  #[tokio::test]
  async fn unknown_business_is_404() {
    let h = Harness::new().await;
    let resp = h.request("GET", "/businesses/BC7654321", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Filing submission ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn valid_alteration_is_persisted_and_enqueued() {
    let mut h = Harness::new().await;
    seed(&h.store, "BC1234567", LegalType::Company).await;

    let resp = h
      .request(
        "POST",
        "/businesses/BC1234567/filings",
        Some(json!({
          "filing": {
            "header": { "name": "alteration" },
            "business": { "identifier": "BC1234567", "legalType": "BC" },
            "alteration": { "business": { "legalType": "BEN" } }
          }
        })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["filing"]["header"]["status"], "PENDING");
    let id = body["filing"]["header"]["filingId"].as_i64().unwrap();

    let msg = h.rx.try_recv().expect("filing enqueued");
    assert_eq!(msg.filing_id(), id);

    let resp = h
      .request("GET", &format!("/businesses/BC1234567/filings/{id}"), None)
      .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = h.request("GET", "/businesses/BC1234567/filings", None).await;
    let body = json_body(resp).await;
    assert_eq!(body["filings"].as_array().map(Vec::len), Some(1));
  }

  #[tokio::test]
  async fn submitted_document_is_stored_verbatim() {
    let h = Harness::new().await;
    seed(&h.store, "BC1234567", LegalType::Company).await;

    let resp = h
      .request(
        "POST",
        "/businesses/BC1234567/filings",
        Some(json!({
          "filing": {
            "header": { "name": "dissolution", "routingSlipNumber": "123456789" },
            "dissolution": {
              "dissolutionType": "voluntary",
              "parties": [{ "officer": { "firstName": "Jo" }, "roles": ["Custodian"] }]
            }
          }
        })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = json_body(resp).await["filing"]["header"]["filingId"].as_i64().unwrap();

    let resp = h
      .request("GET", &format!("/businesses/BC1234567/filings/{id}"), None)
      .await;
    let body = json_body(resp).await;
    assert_eq!(body["filing"]["header"]["routingSlipNumber"], "123456789");
    assert_eq!(body["filing"]["dissolution"]["parties"][0]["roles"][0], "Custodian");
  }

  #[tokio::test]
  async fn invalid_filing_returns_errors_and_is_not_enqueued() {
    let mut h = Harness::new().await;
    seed(&h.store, "BC1234567", LegalType::Company).await;

    let resp = h
      .request(
        "POST",
        "/businesses/BC1234567/filings",
        Some(json!({
          "filing": {
            "header": { "name": "alteration" },
            "alteration": { "business": { "legalType": "ZZZ" } }
          }
        })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["errors"][0]["path"], "/filing/alteration/business/legalType");
    assert!(h.rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn forbidden_filing_uses_validator_status() {
    let h = Harness::new().await;
    seed(&h.store, "CP1234567", LegalType::Coop).await;

    let resp = h
      .request(
        "POST",
        "/businesses/CP1234567/filings",
        Some(json!({
          "filing": {
            "header": { "name": "alteration" },
            "alteration": { "business": { "legalType": "BEN" } }
          }
        })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn mismatched_business_identifier_is_rejected() {
    let h = Harness::new().await;
    seed(&h.store, "BC1234567", LegalType::Company).await;

    let resp = h
      .request(
        "POST",
        "/businesses/BC1234567/filings",
        Some(json!({
          "filing": {
            "header": { "name": "alteration" },
            "business": { "identifier": "BC7654321" },
            "alteration": { "business": { "legalType": "BEN" } }
          }
        })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn annual_report_for_current_year_is_accepted() {
    let h = Harness::new().await;
    let b = seed(&h.store, "BC1234567", LegalType::Company).await;
    let year = b.next_ar_year();
    let today = Utc::now().date_naive();
    // Any day in the window works; today is inside it once the year has begun.
    let date = if today.year() == year {
      today
    } else {
      Utc.with_ymd_and_hms(year, 12, 31, 0, 0, 0).unwrap().date_naive().min(today)
    };

    let resp = h
      .request(
        "POST",
        "/businesses/BC1234567/filings",
        Some(json!({
          "filing": {
            "header": { "name": "annualReport" },
            "annualReport": {
              "annualReportDate": date.format("%Y-%m-%d").to_string(),
              "annualReportYear": year
            }
          }
        })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  // ── Incorporation ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn incorporation_is_accepted_without_business() {
    let mut h = Harness::new().await;
    let resp = h
      .request(
        "POST",
        "/businesses/filings",
        Some(json!({
          "filing": {
            "header": { "name": "incorporationApplication" },
            "incorporationApplication": {
              "nameRequest": { "legalType": "BEN", "legalName": "Fresh Start Ltd." }
            }
          }
        })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(h.rx.try_recv().is_ok());
  }

  #[tokio::test]
  async fn incorporation_with_taken_name_is_rejected() {
    let h = Harness::new().await;
    seed(&h.store, "BC1234567", LegalType::BenefitCompany).await;

    let resp = h
      .request(
        "POST",
        "/businesses/filings",
        Some(json!({
          "filing": {
            "header": { "name": "incorporationApplication" },
            "incorporationApplication": {
              "nameRequest": { "legalType": "BEN", "legalName": "Seeded Ltd." }
            }
          }
        })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(
      body["errors"][0]["path"],
      "/filing/incorporationApplication/nameRequest/legalName"
    );
  }

  #[tokio::test]
  async fn only_incorporations_may_skip_the_business() {
    let h = Harness::new().await;
    let resp = h
      .request(
        "POST",
        "/businesses/filings",
        Some(json!({
          "filing": {
            "header": { "name": "alteration" },
            "alteration": { "business": { "legalType": "BEN" } }
          }
        })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn closed_queue_is_reported() {
    let h = Harness::new().await;
    seed(&h.store, "BC1234567", LegalType::Company).await;
    let Harness { store, queue, rx } = h;
    drop(rx);

    let req = Request::builder()
      .method("POST")
      .uri("/businesses/BC1234567/filings")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(
        json!({
          "filing": {
            "header": { "name": "alteration" },
            "alteration": { "business": { "legalType": "BEN" } }
          }
        })
        .to_string(),
      ))
      .unwrap();
    let resp = api_router(store, queue).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  }
}
