//! Incorporation: brings a new business into existence.

use crate::{
  Error, Result,
  business::Business,
  document::{FilingDocument, IncorporationApplication},
  filing::Filing,
  legal_type::LegalType,
};

fn application(document: &FilingDocument) -> Result<&IncorporationApplication> {
  document
    .incorporation_application
    .as_ref()
    .ok_or(Error::MissingField("incorporationApplication"))
}

/// The legal type requested by the application's name request.
pub fn legal_type(document: &FilingDocument) -> Result<LegalType> {
  let code = application(document)?
    .name_request
    .as_ref()
    .and_then(|nr| nr.legal_type.as_deref())
    .ok_or(Error::MissingField("incorporationApplication.nameRequest.legalType"))?;
  LegalType::from_code(code)
}

/// Name used when the application carries no approved name: the identifier's
/// sequence number followed by the jurisdiction suffix.
pub fn numbered_name(identifier: &str) -> String {
  let number = identifier.trim_start_matches(|c: char| c.is_ascii_alphabetic());
  format!("{number} B.C. LTD.")
}

/// Build the business an incorporation filing creates. `identifier` is the
/// registry number assigned to it; the founding date is the filing's
/// effective date.
pub fn process(identifier: String, filing: &Filing, document: &FilingDocument) -> Result<Business> {
  let legal_type = legal_type(document)?;
  let legal_name = application(document)?
    .name_request
    .as_ref()
    .and_then(|nr| nr.legal_name.clone())
    .unwrap_or_else(|| numbered_name(&identifier));

  Business::new(identifier, legal_name, legal_type, filing.effective_date)
}
