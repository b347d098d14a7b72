//! Carrier catalog entity.

use serde::{Deserialize, Serialize};

use shiplane_core::{AggregateId, DomainError, DomainResult, Entity, TenantId};

/// Carrier identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarrierId(pub AggregateId);

impl CarrierId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CarrierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// What the carrier's network supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CarrierCapabilities {
    pub tracking: bool,
    pub labels: bool,
    pub returns: bool,
    pub pickup_points: bool,
    pub insurance: bool,
}

/// Hard physical limits of the carrier's service. `None` = unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceLimits {
    /// Maximum billable weight, grams.
    pub max_weight_g: Option<u64>,
    /// Maximum single linear dimension, millimetres.
    pub max_dimension_mm: Option<u32>,
    /// Maximum girth (2×width + 2×height + length), millimetres.
    pub max_girth_mm: Option<u32>,
}

/// Standard delivery-day range quoted to customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEstimate {
    pub min_days: u8,
    pub max_days: u8,
}

/// Caller-supplied carrier fields (create/update payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierDefinition {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub capabilities: CarrierCapabilities,
    #[serde(default)]
    pub limits: ServiceLimits,
    pub delivery: DeliveryEstimate,
}

/// A transport operator offering one or more tariffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    id: CarrierId,
    tenant_id: TenantId,
    code: String,
    name: String,
    capabilities: CarrierCapabilities,
    limits: ServiceLimits,
    delivery: DeliveryEstimate,
    active: bool,
    version: u64,
}

impl Carrier {
    pub fn new(id: CarrierId, tenant_id: TenantId, def: CarrierDefinition) -> DomainResult<Self> {
        let def = validate(def)?;
        Ok(Self {
            id,
            tenant_id,
            code: def.code,
            name: def.name,
            capabilities: def.capabilities,
            limits: def.limits,
            delivery: def.delivery,
            active: true,
            version: 1,
        })
    }

    /// Replace the caller-supplied fields; bumps the version.
    pub fn update(&mut self, def: CarrierDefinition) -> DomainResult<()> {
        let def = validate(def)?;
        self.code = def.code;
        self.name = def.name;
        self.capabilities = def.capabilities;
        self.limits = def.limits;
        self.delivery = def.delivery;
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

    pub fn id_typed(&self) -> CarrierId {
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

    pub fn capabilities(&self) -> CarrierCapabilities {
        self.capabilities
    }

    pub fn limits(&self) -> ServiceLimits {
        self.limits
    }

    pub fn delivery(&self) -> DeliveryEstimate {
        self.delivery
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether a consignment of `billable_weight_g` fits the weight limit.
    pub fn accepts_weight(&self, billable_weight_g: u64) -> bool {
        match self.limits.max_weight_g {
            Some(max) => billable_weight_g <= max,
            None => true,
        }
    }
}

impl Entity for Carrier {
    type Id = CarrierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate(mut def: CarrierDefinition) -> DomainResult<CarrierDefinition> {
    let code = def.code.trim();
    if code.is_empty() {
        return Err(DomainError::validation("carrier code must not be empty"));
    }
    def.code = code.to_string();

    if def.name.trim().is_empty() {
        return Err(DomainError::validation("carrier name must not be empty"));
    }

    if def.delivery.min_days > def.delivery.max_days {
        return Err(DomainError::validation(
            "delivery estimate: min_days must not exceed max_days",
        ));
    }

    Ok(def)
}
