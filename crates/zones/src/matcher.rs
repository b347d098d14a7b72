//! Geo matcher: destination → best zone.

use thiserror::Error;

use crate::zone::Zone;

/// No active zone serves the destination.
///
/// This is the single hard failure mode of zone matching; callers surface it
/// so the address can be corrected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no zone serves the destination address")]
pub struct AddressNotServiceable;

/// Resolve a destination to the best-matching zone.
///
/// Candidates are the active zones serving `country`, tried in ascending
/// priority order (stable: ties keep the input order, so resolution is
/// deterministic for a given zone list). The first zone whose allow/deny
/// patterns admit `postal` wins.
pub fn resolve<'a>(
    zones: &'a [Zone],
    country: &str,
    postal: &str,
) -> Result<&'a Zone, AddressNotServiceable> {
    let mut candidates: Vec<&Zone> = zones
        .iter()
        .filter(|z| z.is_active() && z.serves_country(country))
        .collect();
    candidates.sort_by_key(|z| z.priority());

    match candidates.into_iter().find(|z| z.matches_postal(postal)) {
        Some(zone) => Ok(zone),
        None => {
            tracing::debug!(country, postal, "no zone matched destination");
            Err(AddressNotServiceable)
        }
    }
}
