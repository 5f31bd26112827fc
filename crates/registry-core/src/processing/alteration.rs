//! Alteration: changes the business's legal type.

use crate::{
  Error, Result,
  business::Business,
  document::Alteration,
  filing::Filing,
  legal_type::LegalType,
};

pub fn process(business: &mut Business, filing: &mut Filing, body: &Alteration) -> Result<()> {
  if let Some(code) = body.business.as_ref().and_then(|b| b.legal_type.as_deref()) {
    business.legal_type = LegalType::from_code(code)?;
  } else if body.court_order.is_none() {
    return Err(Error::MissingField("alteration.business.legalType"));
  }

  super::attach_court_order(filing, body.court_order.as_ref())
}
