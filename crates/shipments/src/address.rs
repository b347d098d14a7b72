//! Address snapshot value object.

use serde::{Deserialize, Serialize};

use shiplane_core::{DomainError, DomainResult, ValueObject};

/// A postal address, frozen onto the shipment at creation time (a snapshot,
/// not a live reference to an address book entry).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    /// ISO-3166 alpha-2.
    pub country: String,
    #[serde(default)]
    pub residential: bool,
}

impl Address {
    pub fn validate(&self, label: &str) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation(format!("{label} address: name is required")));
        }
        if self.line1.trim().is_empty() {
            return Err(DomainError::validation(format!("{label} address: line1 is required")));
        }
        if self.city.trim().is_empty() {
            return Err(DomainError::validation(format!("{label} address: city is required")));
        }
        if self.postal_code.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "{label} address: postal_code is required"
            )));
        }
        let country = self.country.trim();
        if country.len() != 2 || !country.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(DomainError::validation(format!(
                "{label} address: invalid country '{}'",
                self.country
            )));
        }
        Ok(())
    }
}

impl ValueObject for Address {}
