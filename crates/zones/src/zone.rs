//! Zone catalog entity.

use serde::{Deserialize, Serialize};

use shiplane_core::{AggregateId, DomainError, DomainResult, Entity, TenantId};

use crate::pattern::PostalPattern;

/// Zone identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub AggregateId);

impl ZoneId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Caller-supplied zone fields (create/update payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    pub code: String,
    pub name: String,
    /// ISO-3166 alpha-2 country codes; stored uppercase.
    pub countries: Vec<String>,
    /// Empty = every postal code in the countries (minus exclusions).
    #[serde(default)]
    pub allowed: Vec<PostalPattern>,
    #[serde(default)]
    pub excluded: Vec<PostalPattern>,
    /// Ascending priority: lower values are tried first.
    #[serde(default)]
    pub priority: i32,
}

/// A delivery zone: a named group of destination postal ranges used to
/// scope tariffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    id: ZoneId,
    tenant_id: TenantId,
    code: String,
    name: String,
    countries: Vec<String>,
    allowed: Vec<PostalPattern>,
    excluded: Vec<PostalPattern>,
    priority: i32,
    active: bool,
    version: u64,
}

impl Zone {
    pub fn new(id: ZoneId, tenant_id: TenantId, def: ZoneDefinition) -> DomainResult<Self> {
        let def = validate(def)?;
        Ok(Self {
            id,
            tenant_id,
            code: def.code,
            name: def.name,
            countries: def.countries,
            allowed: def.allowed,
            excluded: def.excluded,
            priority: def.priority,
            active: true,
            version: 1,
        })
    }

    /// Replace the caller-supplied fields; bumps the version.
    pub fn update(&mut self, def: ZoneDefinition) -> DomainResult<()> {
        let def = validate(def)?;
        self.code = def.code;
        self.name = def.name;
        self.countries = def.countries;
        self.allowed = def.allowed;
        self.excluded = def.excluded;
        self.priority = def.priority;
        self.version += 1;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.version += 1;
    }

    pub fn restore(&mut self) {
        self.active = true;
        self.version += 1;
    }

    pub fn id_typed(&self) -> ZoneId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn allowed(&self) -> &[PostalPattern] {
        &self.allowed
    }

    pub fn excluded(&self) -> &[PostalPattern] {
        &self.excluded
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn serves_country(&self, country: &str) -> bool {
        self.countries.iter().any(|c| c.eq_ignore_ascii_case(country))
    }

    /// Whether `postal` falls inside this zone.
    ///
    /// Exclusions take precedence over the allow-list; an empty allow-list
    /// admits every code that is not excluded.
    pub fn matches_postal(&self, postal: &str) -> bool {
        if self.excluded.iter().any(|p| p.matches(postal)) {
            return false;
        }
        if self.allowed.is_empty() {
            return true;
        }
        self.allowed.iter().any(|p| p.matches(postal))
    }
}

impl Entity for Zone {
    type Id = ZoneId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate(mut def: ZoneDefinition) -> DomainResult<ZoneDefinition> {
    let code = def.code.trim();
    if code.is_empty() {
        return Err(DomainError::validation("zone code must not be empty"));
    }
    def.code = code.to_string();

    if def.name.trim().is_empty() {
        return Err(DomainError::validation("zone name must not be empty"));
    }

    if def.countries.is_empty() {
        return Err(DomainError::validation(
            "zone must list at least one country",
        ));
    }
    for country in &mut def.countries {
        let c = country.trim();
        if c.len() != 2 || !c.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(DomainError::validation(format!(
                "invalid country code '{country}': expected ISO-3166 alpha-2"
            )));
        }
        *country = c.to_ascii_uppercase();
    }

    Ok(def)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> ZoneDefinition {
        ZoneDefinition {
            code: "fr".to_string(),
            name: "France métropolitaine".to_string(),
            countries: vec!["fr".to_string()],
            allowed: vec![],
            excluded: vec![
                PostalPattern::parse("97*").unwrap(),
                PostalPattern::parse("98*").unwrap(),
            ],
            priority: 10,
        }
    }

    #[test]
    fn new_zone_normalizes_and_starts_at_version_one() {
        let zone = Zone::new(ZoneId::new(AggregateId::new()), TenantId::new(), definition()).unwrap();
        assert_eq!(zone.countries(), ["FR"]);
        assert_eq!(zone.code(), "fr");
        assert!(zone.is_active());
        assert_eq!(zone.version(), 1);
    }

    #[test]
    fn empty_country_list_is_rejected() {
        let mut def = definition();
        def.countries.clear();
        let err = Zone::new(ZoneId::new(AggregateId::new()), TenantId::new(), def).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn malformed_country_code_is_rejected() {
        let mut def = definition();
        def.countries = vec!["FRA".to_string()];
        assert!(Zone::new(ZoneId::new(AggregateId::new()), TenantId::new(), def).is_err());
    }

    #[test]
    fn exclusions_take_precedence_over_allow_list() {
        let mut def = definition();
        def.allowed = vec![PostalPattern::parse("97*").unwrap()];
        let zone = Zone::new(ZoneId::new(AggregateId::new()), TenantId::new(), def).unwrap();

        // "97110" matches the allow pattern and an exclusion pattern.
        assert!(!zone.matches_postal("97110"));
    }

    #[test]
    fn empty_allow_list_matches_everything_except_exclusions() {
        let zone = Zone::new(ZoneId::new(AggregateId::new()), TenantId::new(), definition()).unwrap();
        assert!(zone.matches_postal("75001"));
        assert!(zone.matches_postal("13001"));
        assert!(!zone.matches_postal("97110"));
        assert!(!zone.matches_postal("98000"));
    }

    #[test]
    fn update_and_deactivate_bump_version() {
        let mut zone =
            Zone::new(ZoneId::new(AggregateId::new()), TenantId::new(), definition()).unwrap();
        zone.update(definition()).unwrap();
        assert_eq!(zone.version(), 2);
        zone.deactivate();
        assert_eq!(zone.version(), 3);
        assert!(!zone.is_active());
        zone.restore();
        assert!(zone.is_active());
        assert_eq!(zone.version(), 4);
    }
}
