//! Filing-queue worker.
//!
//! Drains [`FilingMessage`]s, re-validates each filing against the current
//! state of its business, applies it and publishes the result. Delivery is at-least-once: a filing that is already
//! completed is acknowledged and skipped. A filing that fails is marked
//! `ERROR` and the worker moves on.

use chrono::Utc;
use registry_core::{
  business::Business,
  filing::{Filing, FilingMessage, FilingStatus, FilingType},
  processing::{self, incorporation},
  store::RegistryStore,
  validation,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
  error::{Error, Result},
  publish::{EMAIL_SUBJECT, EVENT_SUBJECT, Publisher, business_event, filing_email},
};

/// What happened to one queue message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  /// The filing was applied and is now `COMPLETED`.
  Completed { filing_id: i64, identifier: String },
  /// The filing was completed by an earlier delivery.
  AlreadyCompleted { filing_id: i64 },
}

/// Receive messages until every sender is dropped.
pub async fn run<S, P>(store: &S, publisher: &P, mut rx: mpsc::Receiver<FilingMessage>)
where
  S: RegistryStore,
  P: Publisher,
{
  info!("filing worker started");
  while let Some(message) = rx.recv().await {
    let filing_id = message.filing_id();
    match process_filing(store, publisher, message).await {
      Ok(outcome) => debug!(?outcome, "message handled"),
      Err(err) => {
        error!(filing_id, error = %err, "filing failed");
        if let Err(mark_err) = mark_error(store, filing_id).await {
          error!(filing_id, error = %mark_err, "could not mark filing as ERROR");
        }
      }
    }
  }
  info!("filing queue closed; worker stopping");
}

/// Apply the filing named by `message` to its business.
pub async fn process_filing<S, P>(store: &S, publisher: &P, message: FilingMessage) -> Result<Outcome>
where
  S: RegistryStore,
  P: Publisher,
{
  let filing_id = message.filing_id();
  let mut filing = store
    .get_filing(filing_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::FilingNotFound(filing_id))?;

  if filing.is_completed() {
    info!(filing_id, "filing already completed; skipping");
    return Ok(Outcome::AlreadyCompleted { filing_id });
  }

  let envelope = filing.document()?;
  let document = &envelope.filing;
  let now = Utc::now();

  let (business, applied) = if filing.filing_type == FilingType::IncorporationApplication {
    validation::validate(None, Some(&envelope), now).map_err(Error::Rejected)?;
    let legal_type = incorporation::legal_type(document)?;
    let identifier = store
      .next_identifier(legal_type)
      .await
      .map_err(Error::store)?;
    let business = incorporation::process(identifier, &filing, document)?;
    (business, vec![FilingType::IncorporationApplication])
  } else {
    let mut business = load_business(store, &filing).await?;
    validation::validate(Some(&business), Some(&envelope), now).map_err(Error::Rejected)?;
    let applied = processing::process(&mut business, &mut filing, document)?;
    (business, applied)
  };

  filing.complete(now)?;
  let (business, filing) = store
    .apply_filing(business, filing)
    .await
    .map_err(Error::store)?;
  info!(filing_id, identifier = business.identifier(), ?applied, "filing completed");

  // The filing is already committed; a lost notification is not a filing error.
  if let Err(err) = publisher.publish(EMAIL_SUBJECT, filing_email(&filing)).await {
    warn!(filing_id, error = %err, "email notification not published");
  }
  let event = business_event(&business, &filing, &applied, now);
  if let Err(err) = publisher.publish(EVENT_SUBJECT, event).await {
    warn!(filing_id, error = %err, "business event not published");
  }

  Ok(Outcome::Completed { filing_id, identifier: business.identifier().to_owned() })
}

async fn load_business<S: RegistryStore>(store: &S, filing: &Filing) -> Result<Business> {
  let missing = || Error::BusinessNotFound { filing_id: filing.id };
  let business_id = filing.business_id.ok_or_else(missing)?;
  store
    .find_business_by_internal_id(business_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(missing)
}

/// Flag a filing that could not be processed. Completed filings are left alone.
async fn mark_error<S: RegistryStore>(store: &S, filing_id: i64) -> Result<()> {
  let Some(mut filing) = store.get_filing(filing_id).await.map_err(Error::store)? else {
    return Ok(());
  };
  if filing.is_completed() {
    return Ok(());
  }
  filing.status = FilingStatus::Error;
  store.save_filing(filing).await.map_err(Error::store)?;
  Ok(())
}
