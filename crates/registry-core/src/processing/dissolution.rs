//! Dissolution: records the date the business was wound up.

use crate::{
  Error, Result,
  business::Business,
  calendar::parse_iso_instant,
  document::Dissolution,
  filing::Filing,
};

pub fn process(business: &mut Business, filing: &mut Filing, body: &Dissolution) -> Result<()> {
  let dissolved_at = match body.dissolution_date.as_deref() {
    Some(raw) => parse_iso_instant(raw).ok_or_else(|| Error::InvalidDate {
      field: "dissolution.dissolutionDate",
      value: raw.to_owned(),
    })?,
    None => filing.effective_date,
  };

  business.dissolve(dissolved_at)?;
  super::attach_court_order(filing, body.court_order.as_ref())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{filing::FilingType, legal_type::LegalType, processing::test_support::*};

  #[test]
  fn uses_requested_date() {
    let mut b = business(LegalType::Coop);
    let mut f = filing(FilingType::Dissolution, at(2021, 3, 1));
    let body = Dissolution { dissolution_date: Some("2021-02-15".into()), ..Default::default() };
    process(&mut b, &mut f, &body).unwrap();
    assert_eq!(b.dissolution_date, Some(at(2021, 2, 15)));
  }

  #[test]
  fn falls_back_to_effective_date() {
    let mut b = business(LegalType::Coop);
    let mut f = filing(FilingType::Dissolution, at(2021, 3, 1));
    process(&mut b, &mut f, &Dissolution::default()).unwrap();
    assert_eq!(b.dissolution_date, Some(at(2021, 3, 1)));
  }

  #[test]
  fn second_dissolution_is_rejected() {
    let mut b = business(LegalType::Coop);
    b.dissolve(at(2020, 1, 1)).unwrap();
    let mut f = filing(FilingType::Dissolution, at(2021, 3, 1));
    assert!(matches!(
      process(&mut b, &mut f, &Dissolution::default()),
      Err(Error::AlreadyDissolved(_))
    ));
    assert_eq!(b.dissolution_date, Some(at(2020, 1, 1)));
  }
}
