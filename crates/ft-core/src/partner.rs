//! Partner (farmer / dealer) domain model.
//!
//! Farmers and dealers share one data shape and one set of workflows;
//! the kind only selects backend routes, storage keys and a couple of
//! UX policies. Encoding those policies here keeps the asymmetries in
//! one place instead of scattered through screens.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which directory a partner belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerKind {
    Farmer,
    Dealer,
}

impl PartnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PartnerKind::Farmer => "farmer",
            PartnerKind::Dealer => "dealer",
        }
    }

    /// Storage key under which the open visit session id for this kind
    /// is kept.
    pub fn visit_storage_key(self) -> &'static str {
        match self {
            PartnerKind::Farmer => "FARMER_VISIT",
            PartnerKind::Dealer => "DEALER_VISIT",
        }
    }

    /// Copy shown when a proximity query comes back empty. Dealer
    /// searches alert the operator; farmer searches stay silent and let
    /// the empty list speak for itself. The asymmetry is deliberate.
    pub fn empty_nearby_notice(self) -> Option<&'static str> {
        match self {
            PartnerKind::Farmer => None,
            PartnerKind::Dealer => Some("Dealer not found"),
        }
    }
}

impl fmt::Display for PartnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-issued partner identifier. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(String);

impl PartnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contact number normalized to bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("phone number has no digits")]
    Empty,
    #[error("phone number must have {min} to {max} digits, got {0}", min = Phone::MIN_DIGITS, max = Phone::MAX_DIGITS)]
    Length(usize),
}

impl Phone {
    pub const MIN_DIGITS: usize = 6;
    pub const MAX_DIGITS: usize = 15;

    /// Strips everything that is not an ASCII digit, then validates the
    /// remaining length. `+91 98765-43210` and `9876543210` normalize
    /// to the same value.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneError::Length(digits.len()));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration form payload for a new partner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerDraft {
    pub name: String,
    pub phone: Phone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl PartnerDraft {
    pub fn new(name: impl Into<String>, phone: Phone) -> Self {
        Self {
            name: name.into(),
            phone,
            address: None,
        }
    }
}

/// What the backend reports after creating a partner: the issued id and
/// the phone it actually stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPartner {
    pub id: PartnerId,
    pub phone: Phone,
}

/// One row of a proximity query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSummary {
    pub id: PartnerId,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub distance_km: Option<f64>,
}
