//! Annual report reminder job.
//!
//! Finds businesses whose annual report anniversary falls on a given day and
//! publishes a reminder email request for each.

use chrono::NaiveDate;
use registry_core::store::RegistryStore;
use tracing::{debug, info, warn};

use crate::{
  ReminderConfig,
  error::{Error, Result},
  publish::{EMAIL_SUBJECT, Publisher, ar_reminder_email},
};

/// Send reminders for `today`. Returns the number of reminders published; a
/// business whose reminder fails to publish is logged and skipped.
pub async fn send_ar_reminders<S, P>(
  store: &S,
  publisher: &P,
  config: &ReminderConfig,
  today: NaiveDate,
) -> Result<usize>
where
  S: RegistryStore,
  P: Publisher,
{
  debug!(%today, legal_types = ?config.legal_types, "finding businesses due for an AR reminder");
  let candidates = store
    .list_businesses_by_legal_types(&config.legal_types)
    .await
    .map_err(Error::store)?;

  let mut sent = 0;
  for business in candidates.iter().filter(|b| b.ar_reminder_due(today)) {
    let Some(business_id) = business.id else { continue };
    let ar_year = business.next_ar_year();
    let payload = ar_reminder_email(business_id, &config.ar_fee, ar_year);
    match publisher.publish(EMAIL_SUBJECT, payload).await {
      Ok(()) => {
        debug!(identifier = business.identifier(), ar_year, "queued AR reminder");
        sent += 1;
      }
      Err(err) => {
        warn!(identifier = business.identifier(), error = %err, "AR reminder not published");
      }
    }
  }

  info!(sent, "AR reminders published");
  Ok(sent)
}
