//! Handlers for `/businesses/{identifier}`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/businesses/{identifier}` | `{"business": ...}`; 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
};
use registry_core::{business::Business, store::RegistryStore};
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError};

/// Load a business by identifier or fail with 404.
pub(crate) async fn find<S: RegistryStore>(store: &S, identifier: &str) -> Result<Business, ApiError> {
  store
    .find_business_by_identifier(identifier)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("business {identifier} not found")))
}

/// `GET /businesses/{identifier}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(identifier): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: RegistryStore,
{
  let business = find(state.store.as_ref(), &identifier).await?;
  Ok(Json(json!({ "business": business.to_json() })))
}
