//! Catalog repositories: zones, carriers, tariffs.
//!
//! Create enforces per-tenant code uniqueness; update/deactivate/restore
//! take an [`ExpectedVersion`] so concurrent editors get a typed conflict;
//! deactivation is blocked while another active record still references the
//! target (referential guard).

use shiplane_carriers::{Carrier, CarrierDefinition, CarrierId};
use shiplane_core::{AggregateId, DomainError, DomainResult, ExpectedVersion, TenantId};
use shiplane_rates::{Tariff, TariffDefinition, TariffId};
use shiplane_zones::{Zone, ZoneDefinition, ZoneId};

use crate::store::{InMemoryTenantStore, TenantStore};

/// Tenant-scoped catalog of zones, carriers and tariffs.
#[derive(Debug, Default)]
pub struct Catalog {
    zones: InMemoryTenantStore<ZoneId, Zone>,
    carriers: InMemoryTenantStore<CarrierId, Carrier>,
    tariffs: InMemoryTenantStore<TariffId, Tariff>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- zones ----

    pub fn create_zone(&self, tenant_id: TenantId, def: ZoneDefinition) -> DomainResult<Zone> {
        self.ensure_zone_code_free(tenant_id, &def.code, None)?;
        let zone = Zone::new(ZoneId::new(AggregateId::new()), tenant_id, def)?;
        self.zones.upsert(tenant_id, zone.id_typed(), zone.clone());
        Ok(zone)
    }

    pub fn get_zone(&self, tenant_id: TenantId, id: ZoneId) -> DomainResult<Zone> {
        self.zones.get(tenant_id, &id).ok_or(DomainError::NotFound)
    }

    pub fn list_zones(&self, tenant_id: TenantId) -> Vec<Zone> {
        let mut zones = self.zones.list(tenant_id);
        zones.sort_by_key(|z| (z.priority(), z.code().to_string()));
        zones
    }

    pub fn update_zone(
        &self,
        tenant_id: TenantId,
        id: ZoneId,
        def: ZoneDefinition,
        expected: ExpectedVersion,
    ) -> DomainResult<Zone> {
        let mut zone = self.get_zone(tenant_id, id)?;
        expected.check(zone.version())?;
        self.ensure_zone_code_free(tenant_id, &def.code, Some(id))?;
        zone.update(def)?;
        self.zones.upsert(tenant_id, id, zone.clone());
        Ok(zone)
    }

    pub fn deactivate_zone(
        &self,
        tenant_id: TenantId,
        id: ZoneId,
        expected: ExpectedVersion,
    ) -> DomainResult<Zone> {
        let mut zone = self.get_zone(tenant_id, id)?;
        expected.check(zone.version())?;

        let blocking: Vec<String> = self
            .tariffs
            .list(tenant_id)
            .into_iter()
            .filter(|t| t.is_active() && t.zone_id() == Some(id))
            .map(|t| t.code().to_string())
            .collect();
        if !blocking.is_empty() {
            return Err(DomainError::in_use(format!(
                "zone '{}' is referenced by active tariffs: {}",
                zone.code(),
                blocking.join(", ")
            )));
        }

        zone.deactivate();
        self.zones.upsert(tenant_id, id, zone.clone());
        Ok(zone)
    }

    pub fn restore_zone(
        &self,
        tenant_id: TenantId,
        id: ZoneId,
        expected: ExpectedVersion,
    ) -> DomainResult<Zone> {
        let mut zone = self.get_zone(tenant_id, id)?;
        expected.check(zone.version())?;
        zone.restore();
        self.zones.upsert(tenant_id, id, zone.clone());
        Ok(zone)
    }

    fn ensure_zone_code_free(
        &self,
        tenant_id: TenantId,
        code: &str,
        except: Option<ZoneId>,
    ) -> DomainResult<()> {
        let code = code.trim();
        let taken = self
            .zones
            .list(tenant_id)
            .into_iter()
            .any(|z| z.code() == code && Some(z.id_typed()) != except);
        if taken {
            return Err(DomainError::duplicate(format!("zone code '{code}' already exists")));
        }
        Ok(())
    }

    // ---- carriers ----

    pub fn create_carrier(
        &self,
        tenant_id: TenantId,
        def: CarrierDefinition,
    ) -> DomainResult<Carrier> {
        self.ensure_carrier_code_free(tenant_id, &def.code, None)?;
        let carrier = Carrier::new(CarrierId::new(AggregateId::new()), tenant_id, def)?;
        self.carriers.upsert(tenant_id, carrier.id_typed(), carrier.clone());
        Ok(carrier)
    }

    pub fn get_carrier(&self, tenant_id: TenantId, id: CarrierId) -> DomainResult<Carrier> {
        self.carriers.get(tenant_id, &id).ok_or(DomainError::NotFound)
    }

    pub fn list_carriers(&self, tenant_id: TenantId) -> Vec<Carrier> {
        let mut carriers = self.carriers.list(tenant_id);
        carriers.sort_by_key(|c| c.code().to_string());
        carriers
    }

    pub fn update_carrier(
        &self,
        tenant_id: TenantId,
        id: CarrierId,
        def: CarrierDefinition,
        expected: ExpectedVersion,
    ) -> DomainResult<Carrier> {
        let mut carrier = self.get_carrier(tenant_id, id)?;
        expected.check(carrier.version())?;
        self.ensure_carrier_code_free(tenant_id, &def.code, Some(id))?;
        carrier.update(def)?;
        self.carriers.upsert(tenant_id, id, carrier.clone());
        Ok(carrier)
    }

    pub fn deactivate_carrier(
        &self,
        tenant_id: TenantId,
        id: CarrierId,
        expected: ExpectedVersion,
    ) -> DomainResult<Carrier> {
        let mut carrier = self.get_carrier(tenant_id, id)?;
        expected.check(carrier.version())?;

        let blocking: Vec<String> = self
            .tariffs
            .list(tenant_id)
            .into_iter()
            .filter(|t| t.is_active() && t.carrier_id() == id)
            .map(|t| t.code().to_string())
            .collect();
        if !blocking.is_empty() {
            return Err(DomainError::in_use(format!(
                "carrier '{}' is referenced by active tariffs: {}",
                carrier.code(),
                blocking.join(", ")
            )));
        }

        carrier.deactivate();
        self.carriers.upsert(tenant_id, id, carrier.clone());
        Ok(carrier)
    }

    pub fn restore_carrier(
        &self,
        tenant_id: TenantId,
        id: CarrierId,
        expected: ExpectedVersion,
    ) -> DomainResult<Carrier> {
        let mut carrier = self.get_carrier(tenant_id, id)?;
        expected.check(carrier.version())?;
        carrier.restore();
        self.carriers.upsert(tenant_id, id, carrier.clone());
        Ok(carrier)
    }

    fn ensure_carrier_code_free(
        &self,
        tenant_id: TenantId,
        code: &str,
        except: Option<CarrierId>,
    ) -> DomainResult<()> {
        let code = code.trim();
        let taken = self
            .carriers
            .list(tenant_id)
            .into_iter()
            .any(|c| c.code() == code && Some(c.id_typed()) != except);
        if taken {
            return Err(DomainError::duplicate(format!(
                "carrier code '{code}' already exists"
            )));
        }
        Ok(())
    }

    // ---- tariffs ----

    pub fn create_tariff(&self, tenant_id: TenantId, def: TariffDefinition) -> DomainResult<Tariff> {
        self.ensure_tariff_code_free(tenant_id, &def.code, None)?;
        self.ensure_tariff_references(tenant_id, &def)?;
        let tariff = Tariff::new(TariffId::new(AggregateId::new()), tenant_id, def)?;
        self.tariffs.upsert(tenant_id, tariff.id_typed(), tariff.clone());
        Ok(tariff)
    }

    pub fn get_tariff(&self, tenant_id: TenantId, id: TariffId) -> DomainResult<Tariff> {
        self.tariffs.get(tenant_id, &id).ok_or(DomainError::NotFound)
    }

    pub fn list_tariffs(&self, tenant_id: TenantId) -> Vec<Tariff> {
        let mut tariffs = self.tariffs.list(tenant_id);
        tariffs.sort_by_key(|t| t.code().to_string());
        tariffs
    }

    pub fn update_tariff(
        &self,
        tenant_id: TenantId,
        id: TariffId,
        def: TariffDefinition,
        expected: ExpectedVersion,
    ) -> DomainResult<Tariff> {
        let mut tariff = self.get_tariff(tenant_id, id)?;
        expected.check(tariff.version())?;
        self.ensure_tariff_code_free(tenant_id, &def.code, Some(id))?;
        self.ensure_tariff_references(tenant_id, &def)?;
        tariff.update(def)?;
        self.tariffs.upsert(tenant_id, id, tariff.clone());
        Ok(tariff)
    }

    pub fn deactivate_tariff(
        &self,
        tenant_id: TenantId,
        id: TariffId,
        expected: ExpectedVersion,
    ) -> DomainResult<Tariff> {
        let mut tariff = self.get_tariff(tenant_id, id)?;
        expected.check(tariff.version())?;
        tariff.deactivate();
        self.tariffs.upsert(tenant_id, id, tariff.clone());
        Ok(tariff)
    }

    pub fn restore_tariff(
        &self,
        tenant_id: TenantId,
        id: TariffId,
        expected: ExpectedVersion,
    ) -> DomainResult<Tariff> {
        let mut tariff = self.get_tariff(tenant_id, id)?;
        expected.check(tariff.version())?;
        tariff.restore();
        self.tariffs.upsert(tenant_id, id, tariff.clone());
        Ok(tariff)
    }

    fn ensure_tariff_code_free(
        &self,
        tenant_id: TenantId,
        code: &str,
        except: Option<TariffId>,
    ) -> DomainResult<()> {
        let code = code.trim();
        let taken = self
            .tariffs
            .list(tenant_id)
            .into_iter()
            .any(|t| t.code() == code && Some(t.id_typed()) != except);
        if taken {
            return Err(DomainError::duplicate(format!(
                "tariff code '{code}' already exists"
            )));
        }
        Ok(())
    }

    /// A tariff must point at an existing carrier, and at an existing zone
    /// when scoped.
    fn ensure_tariff_references(
        &self,
        tenant_id: TenantId,
        def: &TariffDefinition,
    ) -> DomainResult<()> {
        if self.carriers.get(tenant_id, &def.carrier_id).is_none() {
            return Err(DomainError::validation("tariff references an unknown carrier"));
        }
        if let Some(zone_id) = def.zone_id {
            if self.zones.get(tenant_id, &zone_id).is_none() {
                return Err(DomainError::validation("tariff references an unknown zone"));
            }
        }
        Ok(())
    }
}
