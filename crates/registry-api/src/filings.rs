//! Handlers for filing endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/businesses/{identifier}/filings` | `{"filings": [...]}` |
//! | `GET`  | `/businesses/{identifier}/filings/{id}` | 404 if not found |
//! | `POST` | `/businesses/{identifier}/filings` | Validate, persist, enqueue |
//! | `POST` | `/businesses/filings` | Incorporation application |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use chrono::Utc;
use registry_core::{
  business::Business,
  document::FilingEnvelope,
  filing::{FilingMessage, FilingType, NewFiling},
  store::RegistryStore,
  validation::{self, FieldError, ValidationFailure},
};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::{ApiState, businesses::find, error::ApiError};

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /businesses/{identifier}/filings`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Path(identifier): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: RegistryStore,
{
  let business = find(state.store.as_ref(), &identifier).await?;
  let Some(business_id) = business.id else {
    return Ok(Json(json!({ "filings": [] })));
  };
  let filings = state
    .store
    .list_filings(business_id)
    .await
    .map_err(ApiError::store)?;
  let views: Vec<Value> = filings.iter().map(|f| f.to_json()).collect();
  Ok(Json(json!({ "filings": views })))
}

/// `GET /businesses/{identifier}/filings/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path((identifier, id)): Path<(String, i64)>,
) -> Result<Json<Value>, ApiError>
where
  S: RegistryStore,
{
  let filing = state
    .store
    .get_filing_for_business(&identifier, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("filing {id} not found for {identifier}")))?;
  Ok(Json(filing.to_json()))
}

// ─── Submission ───────────────────────────────────────────────────────────────

fn parse_envelope(body: &Value) -> Result<FilingEnvelope, ApiError> {
  FilingEnvelope::from_json(body.clone()).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Validate, persist the submitted body as `PENDING` and hand the filing to
/// the worker.
async fn submit<S: RegistryStore>(
  state: &ApiState<S>,
  business: Option<&Business>,
  envelope: &FilingEnvelope,
  body: Value,
) -> Result<(StatusCode, Json<Value>), ApiError> {
  validation::validate(business, Some(envelope), Utc::now()).map_err(ApiError::Invalid)?;

  let new = NewFiling::pending(business.and_then(|b| b.id), body)?;
  let filing = state.store.add_filing(new).await.map_err(ApiError::store)?;

  state
    .queue
    .send(FilingMessage::new(filing.id))
    .await
    .map_err(|_| {
      error!(filing_id = filing.id, "filing queue closed; filing left pending");
      ApiError::QueueClosed
    })?;

  info!(filing_id = filing.id, filing_type = filing.filing_type.name(), "filing accepted");
  Ok((StatusCode::CREATED, Json(filing.to_json())))
}

/// `POST /businesses/{identifier}/filings`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Path(identifier): Path<String>,
  Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
  S: RegistryStore,
{
  let business = find(state.store.as_ref(), &identifier).await?;
  let envelope = parse_envelope(&body)?;

  if let Some(claimed) = envelope
    .filing
    .business
    .as_ref()
    .and_then(|b| b.identifier.as_deref())
    && claimed != identifier
  {
    return Err(ApiError::BadRequest(format!(
      "filing is for {claimed} but was submitted to {identifier}"
    )));
  }

  submit(&state, Some(&business), &envelope, body).await
}

/// `POST /businesses/filings`: an incorporation application creates the
/// business, so there is none to look up yet.
pub async fn incorporate<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
  S: RegistryStore,
{
  let envelope = parse_envelope(&body)?;
  if envelope.filing.filing_type()? != FilingType::IncorporationApplication {
    return Err(ApiError::BadRequest(
      "only an incorporation application may be filed without a business".into(),
    ));
  }

  let requested_name = envelope
    .filing
    .incorporation_application
    .as_ref()
    .and_then(|ia| ia.name_request.as_ref())
    .and_then(|nr| nr.legal_name.as_deref());
  if let Some(name) = requested_name
    && state.store.find_business_by_legal_name(name).await.is_some()
  {
    return Err(ApiError::Invalid(ValidationFailure::bad_request(vec![FieldError::at(
      "/filing/incorporationApplication/nameRequest/legalName",
      format!("{name} is already in use by an active business."),
    )])));
  }

  submit(&state, None, &envelope, body).await
}
