//! Tariff catalog entity: one carrier, one pricing method, one validity window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shiplane_carriers::CarrierId;
use shiplane_core::{AggregateId, DomainError, DomainResult, Entity, TenantId};
use shiplane_zones::ZoneId;

/// Tariff identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TariffId(pub AggregateId);

impl TariffId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TariffId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Weight tier: fixed rate up to and including `ceiling_g`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTier {
    pub ceiling_g: u64,
    /// Rate in smallest currency unit (e.g., cents).
    pub rate: u64,
}

/// Order-total bracket `[min, max)`; `max: None` = unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBracket {
    pub min: u64,
    pub max: Option<u64>,
    /// Rate in smallest currency unit (e.g., cents).
    pub rate: u64,
}

/// How a tariff turns a consignment into a price.
///
/// All amounts are in the tariff currency's smallest unit; per-kg rates are
/// applied to billable weight in grams with half-up rounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PricingMethod {
    Flat { base: u64 },
    PerWeight {
        base: u64,
        per_kg: u64,
        #[serde(default)]
        tiers: Vec<WeightTier>,
    },
    PerPriceBracket {
        base: u64,
        brackets: Vec<PriceBracket>,
    },
    PerItem { base: u64, per_item: u64 },
    Volumetric { base: u64, per_kg: u64 },
}

impl PricingMethod {
    /// Stable label used in quotes and tracking payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flat { .. } => "flat",
            Self::PerWeight { .. } => "per_weight",
            Self::PerPriceBracket { .. } => "per_price_bracket",
            Self::PerItem { .. } => "per_item",
            Self::Volumetric { .. } => "volumetric",
        }
    }
}

/// Optional surcharge rules applied after the method dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Surcharges {
    /// Fuel surcharge in basis points (500 = 5 %).
    pub fuel_pct_bp: u32,
    /// Flat residential-delivery surcharge, smallest currency unit.
    pub residential: u64,
    /// Flat oversize surcharge, smallest currency unit.
    pub oversize: u64,
}

/// Caller-supplied tariff fields (create/update payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffDefinition {
    pub code: String,
    pub name: String,
    pub carrier_id: CarrierId,
    /// None = the tariff applies to any zone.
    pub zone_id: Option<ZoneId>,
    #[serde(flatten)]
    pub method: PricingMethod,
    pub currency: String,
    #[serde(default)]
    pub surcharges: Surcharges,
    pub free_shipping_threshold: Option<u64>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
}

/// A priced shipping option tied to one carrier and pricing method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tariff {
    id: TariffId,
    tenant_id: TenantId,
    code: String,
    name: String,
    carrier_id: CarrierId,
    zone_id: Option<ZoneId>,
    method: PricingMethod,
    currency: String,
    surcharges: Surcharges,
    free_shipping_threshold: Option<u64>,
    valid_from: Option<NaiveDate>,
    valid_until: Option<NaiveDate>,
    active: bool,
    version: u64,
}

impl Tariff {
    pub fn new(id: TariffId, tenant_id: TenantId, def: TariffDefinition) -> DomainResult<Self> {
        let def = validate(def)?;
        Ok(Self {
            id,
            tenant_id,
            code: def.code,
            name: def.name,
            carrier_id: def.carrier_id,
            zone_id: def.zone_id,
            method: def.method,
            currency: def.currency,
            surcharges: def.surcharges,
            free_shipping_threshold: def.free_shipping_threshold,
            valid_from: def.valid_from,
            valid_until: def.valid_until,
            active: true,
            version: 1,
        })
    }

    /// Replace the caller-supplied fields; bumps the version.
    pub fn update(&mut self, def: TariffDefinition) -> DomainResult<()> {
        let def = validate(def)?;
        self.code = def.code;
        self.name = def.name;
        self.carrier_id = def.carrier_id;
        self.zone_id = def.zone_id;
        self.method = def.method;
        self.currency = def.currency;
        self.surcharges = def.surcharges;
        self.free_shipping_threshold = def.free_shipping_threshold;
        self.valid_from = def.valid_from;
        self.valid_until = def.valid_until;
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

    pub fn id_typed(&self) -> TariffId {
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

    pub fn carrier_id(&self) -> CarrierId {
        self.carrier_id
    }

    pub fn zone_id(&self) -> Option<ZoneId> {
        self.zone_id
    }

    pub fn method(&self) -> &PricingMethod {
        &self.method
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn surcharges(&self) -> Surcharges {
        self.surcharges
    }

    pub fn free_shipping_threshold(&self) -> Option<u64> {
        self.free_shipping_threshold
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Usable only while `today` falls inside the validity window (inclusive,
    /// open ends allowed) and the tariff is active.
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        if let Some(from) = self.valid_from {
            if today < from {
                return false;
            }
        }
        if let Some(until) = self.valid_until {
            if today > until {
                return false;
            }
        }
        true
    }

    /// Whether this tariff applies when `zone` was resolved for the destination.
    pub fn applies_to_zone(&self, zone: ZoneId) -> bool {
        match self.zone_id {
            Some(scoped) => scoped == zone,
            None => true,
        }
    }
}

impl Entity for Tariff {
    type Id = TariffId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate(mut def: TariffDefinition) -> DomainResult<TariffDefinition> {
    let code = def.code.trim();
    if code.is_empty() {
        return Err(DomainError::validation("tariff code must not be empty"));
    }
    def.code = code.to_string();

    if def.name.trim().is_empty() {
        return Err(DomainError::validation("tariff name must not be empty"));
    }

    let currency = def.currency.trim();
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(DomainError::validation(format!(
            "invalid currency '{}': expected ISO-4217 alpha-3",
            def.currency
        )));
    }
    def.currency = currency.to_ascii_uppercase();

    if let (Some(from), Some(until)) = (def.valid_from, def.valid_until) {
        if from > until {
            return Err(DomainError::validation(
                "validity window: valid_from must not be after valid_until",
            ));
        }
    }

    match &mut def.method {
        PricingMethod::PerWeight { tiers, .. } => {
            tiers.sort_by_key(|t| t.ceiling_g);
            if tiers.windows(2).any(|w| w[0].ceiling_g == w[1].ceiling_g) {
                return Err(DomainError::validation(
                    "weight tiers must have distinct ceilings",
                ));
            }
        }
        PricingMethod::PerPriceBracket { brackets, .. } => {
            if brackets.is_empty() {
                return Err(DomainError::validation(
                    "price-bracket tariff requires at least one bracket",
                ));
            }
            for b in brackets.iter() {
                if let Some(max) = b.max {
                    if max <= b.min {
                        return Err(DomainError::validation(format!(
                            "bracket [{}, {max}) is empty",
                            b.min
                        )));
                    }
                }
            }
            brackets.sort_by_key(|b| b.min);
        }
        _ => {}
    }

    Ok(def)
}
