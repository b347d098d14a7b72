//! Delivery zones domain module.
//!
//! This crate contains the zone catalog entity and the geo matcher that
//! resolves a destination (country + postal code) to the best zone,
//! implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod matcher;
pub mod pattern;
pub mod zone;

pub use matcher::{resolve, AddressNotServiceable};
pub use pattern::PostalPattern;
pub use zone::{Zone, ZoneDefinition, ZoneId};
