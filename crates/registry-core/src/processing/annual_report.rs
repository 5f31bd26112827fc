//! Annual report: advances the business's AR and AGM dates.

use chrono::Datelike;

use crate::{
  Error, Result,
  business::Business,
  calendar::parse_iso_instant,
  document::AnnualReport,
};

pub fn process(business: &mut Business, body: &AnnualReport) -> Result<()> {
  let raw = body
    .annual_report_date
    .as_deref()
    .ok_or(Error::MissingField("annualReport.annualReportDate"))?;
  let ar_date = parse_iso_instant(raw).ok_or_else(|| Error::InvalidDate {
    field: "annualReport.annualReportDate",
    value: raw.to_owned(),
  })?;

  let agm_date = body
    .annual_general_meeting_date
    .as_deref()
    .map(|raw| {
      parse_iso_instant(raw).ok_or_else(|| Error::InvalidDate {
        field: "annualReport.annualGeneralMeetingDate",
        value: raw.to_owned(),
      })
    })
    .transpose()?;

  business.last_ar_date = Some(ar_date);
  business.last_ar_year = Some(body.annual_report_year.unwrap_or_else(|| ar_date.year()));
  if agm_date.is_some() {
    business.last_agm_date = agm_date;
  }
  Ok(())
}
