//! Legal-entity taxonomy.
//!
//! Every business carries exactly one [`LegalType`]. The string codes are the
//! registry's own and are what gets stored and serialised; the variant names
//! are only for Rust callers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result};

// ─── LegalType ───────────────────────────────────────────────────────────────

/// The legal form of a business, keyed by its registry code.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[serde(try_from = "String", into = "&'static str")]
pub enum LegalType {
  #[strum(serialize = "CP")]
  Coop,
  #[strum(serialize = "BEN")]
  BenefitCompany,
  #[strum(serialize = "BC")]
  Company,
  #[strum(serialize = "C")]
  ContinueIn,
  #[strum(serialize = "QA")]
  Co1860,
  #[strum(serialize = "QB")]
  Co1862,
  #[strum(serialize = "QC")]
  Co1878,
  #[strum(serialize = "QD")]
  Co1890,
  #[strum(serialize = "QE")]
  Co1897,
  #[strum(serialize = "ULC")]
  UnlimitedLiabilityCompany,
  #[strum(serialize = "CUL")]
  UlcContinueIn,
  #[strum(serialize = "UQA")]
  UlcCo1860,
  #[strum(serialize = "UQB")]
  UlcCo1862,
  #[strum(serialize = "UQC")]
  UlcCo1878,
  #[strum(serialize = "UQD")]
  UlcCo1890,
  #[strum(serialize = "UQE")]
  UlcCo1897,
  #[strum(serialize = "CC")]
  CommunityContributionCompany,
  #[strum(serialize = "A")]
  ExtraProvincialA,
  #[strum(serialize = "B")]
  ExtraProvincialB,
  #[strum(serialize = "CEM")]
  Cemetery,
  #[strum(serialize = "EPR")]
  ExtraProvincialRegistration,
  #[strum(serialize = "FOR")]
  Foreign,
  #[strum(serialize = "LIC")]
  Licensed,
  #[strum(serialize = "LIB")]
  Library,
  #[strum(serialize = "LLC")]
  LimitedCo,
  #[strum(serialize = "PA")]
  PrivateAct,
  #[strum(serialize = "PAR")]
  Parishes,
  #[strum(serialize = "PFS")]
  PensionFundSociety,
  #[strum(serialize = "REG")]
  Registration,
  #[strum(serialize = "RLY")]
  Railways,
  #[strum(serialize = "SB")]
  SocietyBranch,
  #[strum(serialize = "T")]
  Trust,
  #[strum(serialize = "TMY")]
  Tramways,
  #[strum(serialize = "XCP")]
  ExtraProvincialCoop,
  #[strum(serialize = "CCC")]
  CccContinueIn,
  #[strum(serialize = "S")]
  Society,
  #[strum(serialize = "XS")]
  ExtraProvincialSociety,
  #[strum(serialize = "SP")]
  SoleProprietorship,
  #[strum(serialize = "GP")]
  Partnership,
  #[strum(serialize = "LP")]
  LimitedPartnership,
  #[strum(serialize = "XP")]
  ExtraProvincialLimitedPartnership,
  #[strum(serialize = "LL")]
  LimitedLiabilityPartnership,
  #[strum(serialize = "XL")]
  ExtraProvincialLlPartnership,
  #[strum(serialize = "MF")]
  MiscFirm,
  #[strum(serialize = "FI")]
  Financial,
  #[strum(serialize = "CS")]
  ContinueInSociety,
}

impl LegalType {
  /// Limited companies, including the historical incorporation variants.
  pub const LIMITED_COMPANIES: [Self; 7] = [
    Self::Company,
    Self::ContinueIn,
    Self::Co1860,
    Self::Co1862,
    Self::Co1878,
    Self::Co1890,
    Self::Co1897,
  ];

  /// Unlimited liability companies, including the historical variants.
  pub const UNLIMITED_COMPANIES: [Self; 7] = [
    Self::UnlimitedLiabilityCompany,
    Self::UlcContinueIn,
    Self::UlcCo1860,
    Self::UlcCo1862,
    Self::UlcCo1878,
    Self::UlcCo1890,
    Self::UlcCo1897,
  ];

  /// The registry code, e.g. `"CP"` or `"BEN"`.
  pub fn code(self) -> &'static str { self.into() }

  /// Parse a registry code.
  pub fn from_code(code: &str) -> Result<Self> {
    Self::from_str(code).map_err(|_| Error::UnknownLegalType(code.to_owned()))
  }

  pub fn is_limited_company(self) -> bool {
    Self::LIMITED_COMPANIES.contains(&self)
  }

  pub fn is_unlimited_company(self) -> bool {
    Self::UNLIMITED_COMPANIES.contains(&self)
  }

  /// Cooperatives are the only entities registered without a tax id.
  pub fn expects_tax_id(self) -> bool { self != Self::Coop }

  /// All legal types that are expected to carry a tax id.
  pub fn tax_id_types() -> Vec<Self> {
    Self::iter().filter(|t| t.expects_tax_id()).collect()
  }

  /// The identifier prefix new businesses of this type are numbered under.
  pub fn identifier_prefix(self) -> &'static str {
    match self {
      Self::Coop => "CP",
      Self::ExtraProvincialCoop => "XCP",
      _ => "BC",
    }
  }
}

impl TryFrom<String> for LegalType {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::from_code(&value) }
}

// ─── AssociationType ─────────────────────────────────────────────────────────

/// Sub-classification of cooperatives.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  AsRefStr,
  EnumIter,
  EnumString,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
pub enum AssociationType {
  #[strum(serialize = "CP")]
  #[serde(rename = "CP")]
  Cooperative,
  #[strum(serialize = "HC")]
  #[serde(rename = "HC")]
  HousingCooperative,
  #[strum(serialize = "CSC")]
  #[serde(rename = "CSC")]
  CommunityServiceCooperative,
}

impl AssociationType {
  pub fn code(self) -> &'static str { self.into() }

  pub fn description(self) -> &'static str {
    match self {
      Self::Cooperative => "Cooperative Without a Special Purpose",
      Self::HousingCooperative => "Special Purpose - Housing Cooperative",
      Self::CommunityServiceCooperative => {
        "Special Purpose - Community Service Cooperative"
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codes_round_trip_through_from_code() {
    for t in LegalType::iter() {
      assert_eq!(LegalType::from_code(t.code()).unwrap(), t);
    }
  }

  #[test]
  fn unknown_code_is_rejected() {
    let err = LegalType::from_code("XCR").unwrap_err();
    assert!(matches!(err, Error::UnknownLegalType(code) if code == "XCR"));
  }

  #[test]
  fn serde_uses_registry_codes() {
    let json = serde_json::to_string(&LegalType::BenefitCompany).unwrap();
    assert_eq!(json, "\"BEN\"");
    let back: LegalType = serde_json::from_str("\"ULC\"").unwrap();
    assert_eq!(back, LegalType::UnlimitedLiabilityCompany);
    assert!(serde_json::from_str::<LegalType>("\"nope\"").is_err());
  }

  #[test]
  fn only_coops_skip_tax_ids() {
    let types = LegalType::tax_id_types();
    assert!(!types.contains(&LegalType::Coop));
    assert!(types.contains(&LegalType::BenefitCompany));
    assert_eq!(types.len(), LegalType::iter().count() - 1);
  }

  #[test]
  fn company_groupings() {
    assert!(LegalType::Co1897.is_limited_company());
    assert!(!LegalType::Co1897.is_unlimited_company());
    assert!(LegalType::UlcContinueIn.is_unlimited_company());
    assert!(!LegalType::BenefitCompany.is_limited_company());
  }

  #[test]
  fn association_descriptions() {
    assert_eq!(
      AssociationType::HousingCooperative.description(),
      "Special Purpose - Housing Cooperative"
    );
    assert_eq!(AssociationType::CommunityServiceCooperative.code(), "CSC");
  }
}
