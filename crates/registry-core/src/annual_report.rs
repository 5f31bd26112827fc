//! Annual-report filing windows.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  calendar::{DateDelta, anniversary_in},
  legal_type::LegalType,
};

/// The report year cooperatives were granted a COVID filing extension for.
pub const COOP_EXTENSION_YEAR: i32 = 2020;

/// Window within which an annual report for one year may be filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArDateWindow {
  pub min_date: NaiveDate,
  pub max_date: NaiveDate,
}

impl ArDateWindow {
  /// Compute the window for `year`, clamping the upper bound to `today`.
  ///
  /// | Legal type      | min                | max                          |
  /// |-----------------|--------------------|------------------------------|
  /// | cooperative     | Jan 1 of `year`    | Apr 30 of `year + 1` (Oct 31 for 2020) |
  /// | benefit company | founding anniversary in `year` | min + 60 days    |
  /// | everything else | Jan 1 of `year`    | Dec 31 of `year`             |
  pub fn compute(
    legal_type: LegalType,
    founding_date: NaiveDate,
    year: i32,
    today: NaiveDate,
  ) -> Self {
    let jan_1 = ymd(year, 1, 1);

    let (min_date, max_date) = match legal_type {
      LegalType::Coop if year == COOP_EXTENSION_YEAR => (jan_1, ymd(year + 1, 10, 31)),
      LegalType::Coop => (jan_1, ymd(year + 1, 4, 30)),
      LegalType::BenefitCompany => {
        let anniversary = anniversary_in(founding_date, year);
        (anniversary, DateDelta::days(60).add_to_date(anniversary))
      }
      _ => (jan_1, ymd(year, 12, 31)),
    };

    Self { min_date, max_date: max_date.min(today) }
  }

  /// Same as [`ArDateWindow::compute`], clamped against the current UTC date.
  pub fn compute_now(legal_type: LegalType, founding_date: NaiveDate, year: i32) -> Self {
    Self::compute(legal_type, founding_date, year, Utc::now().date_naive())
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.min_date <= date && date <= self.max_date
  }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}
