//! Calendar arithmetic and date parsing shared by the business rules.
//!
//! Statutory offsets ("one year, two months and one day") are applied field by
//! field: years and months first, then days. A day-of-month that does not
//! exist in the target month rolls over into the following month, so
//! Feb 29 plus one year is Mar 1.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

// ─── DateDelta ───────────────────────────────────────────────────────────────

/// A calendar offset of whole years, months and days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateDelta {
  pub years:  u32,
  pub months: u32,
  pub days:   u64,
}

impl DateDelta {
  pub const fn years(years: u32) -> Self { Self { years, months: 0, days: 0 } }

  pub const fn days(days: u64) -> Self { Self { years: 0, months: 0, days } }

  /// Grace period after an annual report before good standing lapses.
  pub const GOOD_STANDING: Self = Self { years: 1, months: 2, days: 1 };

  /// Apply to a calendar date. Saturates at [`NaiveDate::MAX`].
  pub fn add_to_date(self, date: NaiveDate) -> NaiveDate {
    self.checked_add(date).unwrap_or(NaiveDate::MAX)
  }

  /// Apply to an instant, keeping its UTC time of day.
  pub fn add_to_instant(self, instant: DateTime<Utc>) -> DateTime<Utc> {
    let naive = instant.naive_utc();
    match self.checked_add(naive.date()) {
      Some(date) => date.and_time(naive.time()).and_utc(),
      None => DateTime::<Utc>::MAX_UTC,
    }
  }

  fn checked_add(self, date: NaiveDate) -> Option<NaiveDate> {
    // Step from the first of the month so chrono never clamps the day, then
    // add the original day back on; an overlong day spills into next month.
    let months = self.years.checked_mul(12)?.checked_add(self.months)?;
    date
      .with_day(1)?
      .checked_add_months(Months::new(months))?
      .checked_add_days(Days::new(u64::from(date.day0())))?
      .checked_add_days(Days::new(self.days))
  }
}

/// Shift `date` by whole years, clamping a day past the end of the target
/// month to its last day (Feb 29 + 1 year is Feb 28). This is the interval
/// arithmetic the reminder schedule is defined with.
pub fn add_years_clamped(date: NaiveDate, years: u32) -> NaiveDate {
  years
    .checked_mul(12)
    .and_then(|months| date.checked_add_months(Months::new(months)))
    .unwrap_or(NaiveDate::MAX)
}

/// The month/day of `anchor` in `year`, rolling Feb 29 into Mar 1 for non-leap
/// years.
pub fn anniversary_in(anchor: NaiveDate, year: i32) -> NaiveDate {
  let shift = i64::from(year) - i64::from(anchor.year());
  let shifted = if shift >= 0 {
    u32::try_from(shift).ok().map(|y| DateDelta::years(y).add_to_date(anchor))
  } else {
    NaiveDate::from_ymd_opt(year, anchor.month(), anchor.day())
      .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
  };
  shifted.unwrap_or(NaiveDate::MAX)
}

// ─── Legislation timezone ────────────────────────────────────────────────────

/// Zone in which statutory dates are interpreted.
pub const LEGISLATION_TZ: Tz = chrono_tz::America::Vancouver;

/// Midnight of `date` in the legislation timezone, expressed as a UTC instant.
/// Transitions happen at 02:00 local, so midnight always exists; an ambiguous
/// midnight resolves to the earlier instant.
pub fn legislation_midnight_utc(date: NaiveDate) -> DateTime<Utc> {
  let local_midnight = date.and_time(NaiveTime::MIN);
  LEGISLATION_TZ
    .from_local_datetime(&local_midnight)
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(|| local_midnight.and_utc())
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Parse an ISO-8601 calendar date. Full timestamps are accepted and reduced
/// to their date component as written.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Some(date);
  }
  DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

/// Parse an ISO-8601 instant. A bare date is read as midnight UTC.
pub fn parse_iso_instant(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}
