//! Shipment aggregate root.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shiplane_carriers::CarrierId;
use shiplane_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use shiplane_rates::Dimensions;

use crate::address::Address;
use crate::package::{Package, PackageDraft};
use crate::status::ShipmentStatus;
use crate::tracking::TrackingEvent;

/// Shipment identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentId(pub AggregateId);

impl ShipmentId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Cost breakdown frozen onto the shipment from the selected quote.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub base: u64,
    pub insurance: u64,
    pub surcharges: u64,
    pub total: u64,
    pub currency: String,
}

impl CostBreakdown {
    pub fn check(&self) -> Result<(), DomainError> {
        if self.base + self.insurance + self.surcharges != self.total {
            return Err(DomainError::validation(
                "cost breakdown does not add up: base + insurance + surcharges must equal total",
            ));
        }
        Ok(())
    }
}

/// Aggregate root: Shipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipment {
    id: ShipmentId,
    tenant_id: Option<TenantId>,
    shipment_number: String,
    carrier_id: Option<CarrierId>,
    tariff_code: String,
    method: String,
    origin: Address,
    destination: Address,
    pickup_point: Option<String>,
    status: ShipmentStatus,
    packages: Vec<Package>,
    cost: CostBreakdown,
    events: Vec<TrackingEvent>,
    master_tracking_number: Option<String>,
    delivered_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Shipment {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ShipmentId) -> Self {
        Self {
            id,
            tenant_id: None,
            shipment_number: String::new(),
            carrier_id: None,
            tariff_code: String::new(),
            method: String::new(),
            origin: Address::default(),
            destination: Address::default(),
            pickup_point: None,
            status: ShipmentStatus::Pending,
            packages: Vec::new(),
            cost: CostBreakdown::default(),
            events: Vec::new(),
            master_tracking_number: None,
            delivered_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ShipmentId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn shipment_number(&self) -> &str {
        &self.shipment_number
    }

    pub fn carrier_id(&self) -> Option<CarrierId> {
        self.carrier_id
    }

    pub fn tariff_code(&self) -> &str {
        &self.tariff_code
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn origin(&self) -> &Address {
        &self.origin
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    pub fn pickup_point(&self) -> Option<&str> {
        self.pickup_point.as_deref()
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn cost(&self) -> &CostBreakdown {
        &self.cost
    }

    /// The append-only tracking log, oldest first.
    pub fn tracking_events(&self) -> &[TrackingEvent] {
        &self.events
    }

    pub fn master_tracking_number(&self) -> Option<&str> {
        self.master_tracking_number.as_deref()
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Combined billable weight across packages, grams.
    pub fn billable_weight_g(&self) -> u64 {
        self.packages.iter().map(|p| p.billable_weight_g).sum()
    }
}

impl AggregateRoot for Shipment {
    type Id = ShipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateShipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateShipment {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub shipment_number: String,
    pub carrier_id: CarrierId,
    pub tariff_code: String,
    pub method: String,
    pub origin: Address,
    pub destination: Address,
    pub pickup_point: Option<String>,
    pub packages: Vec<PackageDraft>,
    pub cost: CostBreakdown,
    pub occurred_at: DateTime<Utc>,
}

/// Command: GenerateLabel. Tracking numbers come from the carrier gateway;
/// the aggregate only records them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateLabel {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub master_tracking_number: String,
    pub package_tracking_numbers: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordTrackingScan (carrier scan feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTrackingScan {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub status: ShipmentStatus,
    pub description: String,
    pub location: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkPickedUp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkPickedUp {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub location: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkDelivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkDelivered {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub location: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelShipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelShipment {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemeasurePackage (warehouse re-weigh before label creation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemeasurePackage {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub package_index: usize,
    pub dimensions: Dimensions,
    pub actual_weight_g: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentCommand {
    CreateShipment(CreateShipment),
    GenerateLabel(GenerateLabel),
    RecordTrackingScan(RecordTrackingScan),
    MarkPickedUp(MarkPickedUp),
    MarkDelivered(MarkDelivered),
    CancelShipment(CancelShipment),
    RemeasurePackage(RemeasurePackage),
}

/// Event: ShipmentCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentCreated {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub shipment_number: String,
    pub carrier_id: CarrierId,
    pub tariff_code: String,
    pub method: String,
    pub origin: Address,
    pub destination: Address,
    pub pickup_point: Option<String>,
    pub packages: Vec<PackageDraft>,
    pub cost: CostBreakdown,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LabelGenerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelGenerated {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub master_tracking_number: String,
    pub package_tracking_numbers: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TrackingScanRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingScanRecorded {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub status: ShipmentStatus,
    pub description: String,
    pub location: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ShipmentPickedUp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentPickedUp {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub location: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ShipmentDelivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentDelivered {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub location: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ShipmentCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentCancelled {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PackageRemeasured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRemeasured {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub package_index: usize,
    pub dimensions: Dimensions,
    pub actual_weight_g: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentEvent {
    ShipmentCreated(ShipmentCreated),
    LabelGenerated(LabelGenerated),
    TrackingScanRecorded(TrackingScanRecorded),
    ShipmentPickedUp(ShipmentPickedUp),
    ShipmentDelivered(ShipmentDelivered),
    ShipmentCancelled(ShipmentCancelled),
    PackageRemeasured(PackageRemeasured),
}

impl ShipmentEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ShipmentCreated(_) => "shipments.shipment.created",
            Self::LabelGenerated(_) => "shipments.shipment.label_generated",
            Self::TrackingScanRecorded(_) => "shipments.shipment.scan_recorded",
            Self::ShipmentPickedUp(_) => "shipments.shipment.picked_up",
            Self::ShipmentDelivered(_) => "shipments.shipment.delivered",
            Self::ShipmentCancelled(_) => "shipments.shipment.cancelled",
            Self::PackageRemeasured(_) => "shipments.shipment.package_remeasured",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::ShipmentCreated(e) => e.occurred_at,
            Self::LabelGenerated(e) => e.occurred_at,
            Self::TrackingScanRecorded(e) => e.occurred_at,
            Self::ShipmentPickedUp(e) => e.occurred_at,
            Self::ShipmentDelivered(e) => e.occurred_at,
            Self::ShipmentCancelled(e) => e.occurred_at,
            Self::PackageRemeasured(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Shipment {
    type Command = ShipmentCommand;
    type Event = ShipmentEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ShipmentEvent::ShipmentCreated(e) => {
                self.id = e.shipment_id;
                self.tenant_id = Some(e.tenant_id);
                self.shipment_number = e.shipment_number.clone();
                self.carrier_id = Some(e.carrier_id);
                self.tariff_code = e.tariff_code.clone();
                self.method = e.method.clone();
                self.origin = e.origin.clone();
                self.destination = e.destination.clone();
                self.pickup_point = e.pickup_point.clone();
                self.status = ShipmentStatus::Pending;
                self.packages = e.packages.iter().cloned().map(Package::from_draft).collect();
                self.cost = e.cost.clone();
                self.created = true;
                self.push_event(ShipmentStatus::Pending, "shipment created", None, e.occurred_at);
            }
            ShipmentEvent::LabelGenerated(e) => {
                self.status = ShipmentStatus::LabelCreated;
                self.master_tracking_number = Some(e.master_tracking_number.clone());
                for (pkg, number) in
                    self.packages.iter_mut().zip(e.package_tracking_numbers.iter())
                {
                    pkg.tracking_number = Some(number.clone());
                }
                self.push_event(
                    ShipmentStatus::LabelCreated,
                    "label_created",
                    None,
                    e.occurred_at,
                );
            }
            ShipmentEvent::TrackingScanRecorded(e) => {
                self.status = e.status;
                if e.status == ShipmentStatus::Delivered {
                    self.delivered_at = Some(e.occurred_at);
                }
                self.push_event(e.status, &e.description, e.location.clone(), e.occurred_at);
            }
            ShipmentEvent::ShipmentPickedUp(e) => {
                self.status = ShipmentStatus::PickedUp;
                self.push_event(
                    ShipmentStatus::PickedUp,
                    "picked up by carrier",
                    e.location.clone(),
                    e.occurred_at,
                );
            }
            ShipmentEvent::ShipmentDelivered(e) => {
                self.status = ShipmentStatus::Delivered;
                self.delivered_at = Some(e.occurred_at);
                self.push_event(
                    ShipmentStatus::Delivered,
                    "delivered",
                    e.location.clone(),
                    e.occurred_at,
                );
            }
            ShipmentEvent::ShipmentCancelled(e) => {
                self.status = ShipmentStatus::Cancelled;
                self.push_event(
                    ShipmentStatus::Cancelled,
                    &format!("cancelled: {}", e.reason),
                    None,
                    e.occurred_at,
                );
            }
            ShipmentEvent::PackageRemeasured(e) => {
                if let Some(pkg) = self.packages.get_mut(e.package_index) {
                    pkg.remeasure(e.dimensions, e.actual_weight_g);
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ShipmentCommand::CreateShipment(cmd) => self.handle_create(cmd),
            ShipmentCommand::GenerateLabel(cmd) => self.handle_generate_label(cmd),
            ShipmentCommand::RecordTrackingScan(cmd) => self.handle_scan(cmd),
            ShipmentCommand::MarkPickedUp(cmd) => self.handle_mark_picked_up(cmd),
            ShipmentCommand::MarkDelivered(cmd) => self.handle_mark_delivered(cmd),
            ShipmentCommand::CancelShipment(cmd) => self.handle_cancel(cmd),
            ShipmentCommand::RemeasurePackage(cmd) => self.handle_remeasure(cmd),
        }
    }
}

impl Shipment {
    fn push_event(
        &mut self,
        status: ShipmentStatus,
        description: &str,
        location: Option<String>,
        occurred_at: DateTime<Utc>,
    ) {
        self.events.push(TrackingEvent {
            status,
            description: description.to_string(),
            location,
            occurred_at,
        });
    }

    fn ensure_exists(&self, tenant_id: TenantId, shipment_id: ShipmentId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        if self.id != shipment_id {
            return Err(DomainError::invariant("shipment_id mismatch"));
        }
        Ok(())
    }

    fn ensure_transition(&self, target: ShipmentStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::invalid_transition(
                self.status.as_str(),
                target.as_str(),
            ));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateShipment) -> Result<Vec<ShipmentEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("shipment already exists"));
        }

        if cmd.shipment_number.trim().is_empty() {
            return Err(DomainError::validation("shipment_number is required"));
        }
        if cmd.packages.is_empty() {
            return Err(DomainError::validation(
                "shipment requires at least one package",
            ));
        }
        for draft in &cmd.packages {
            draft.validate()?;
        }
        cmd.origin.validate("origin")?;
        cmd.destination.validate("destination")?;
        cmd.cost.check()?;

        Ok(vec![ShipmentEvent::ShipmentCreated(ShipmentCreated {
            tenant_id: cmd.tenant_id,
            shipment_id: cmd.shipment_id,
            shipment_number: cmd.shipment_number.clone(),
            carrier_id: cmd.carrier_id,
            tariff_code: cmd.tariff_code.clone(),
            method: cmd.method.clone(),
            origin: cmd.origin.clone(),
            destination: cmd.destination.clone(),
            pickup_point: cmd.pickup_point.clone(),
            packages: cmd.packages.clone(),
            cost: cmd.cost.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_generate_label(
        &self,
        cmd: &GenerateLabel,
    ) -> Result<Vec<ShipmentEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.shipment_id)?;

        // Label issuance is only legal from Pending; a repeat request shows
        // up as LabelCreated → LabelCreated and is rejected here.
        self.ensure_transition(ShipmentStatus::LabelCreated)?;

        if cmd.master_tracking_number.trim().is_empty() {
            return Err(DomainError::validation("master tracking number is required"));
        }
        if cmd.package_tracking_numbers.len() != self.packages.len() {
            return Err(DomainError::validation(format!(
                "expected {} package tracking numbers, got {}",
                self.packages.len(),
                cmd.package_tracking_numbers.len()
            )));
        }

        Ok(vec![ShipmentEvent::LabelGenerated(LabelGenerated {
            tenant_id: cmd.tenant_id,
            shipment_id: cmd.shipment_id,
            master_tracking_number: cmd.master_tracking_number.clone(),
            package_tracking_numbers: cmd.package_tracking_numbers.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_scan(&self, cmd: &RecordTrackingScan) -> Result<Vec<ShipmentEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.shipment_id)?;

        // Label issuance and cancellation have dedicated commands with their
        // own guards; a scan feed cannot smuggle them in.
        if matches!(
            cmd.status,
            ShipmentStatus::LabelCreated | ShipmentStatus::Cancelled | ShipmentStatus::Pending
        ) {
            return Err(DomainError::validation(format!(
                "tracking scans cannot move a shipment to '{}'",
                cmd.status
            )));
        }

        self.ensure_transition(cmd.status)?;

        Ok(vec![ShipmentEvent::TrackingScanRecorded(TrackingScanRecorded {
            tenant_id: cmd.tenant_id,
            shipment_id: cmd.shipment_id,
            status: cmd.status,
            description: cmd.description.clone(),
            location: cmd.location.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_picked_up(
        &self,
        cmd: &MarkPickedUp,
    ) -> Result<Vec<ShipmentEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.shipment_id)?;
        self.ensure_transition(ShipmentStatus::PickedUp)?;

        Ok(vec![ShipmentEvent::ShipmentPickedUp(ShipmentPickedUp {
            tenant_id: cmd.tenant_id,
            shipment_id: cmd.shipment_id,
            location: cmd.location.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_delivered(
        &self,
        cmd: &MarkDelivered,
    ) -> Result<Vec<ShipmentEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.shipment_id)?;
        self.ensure_transition(ShipmentStatus::Delivered)?;

        Ok(vec![ShipmentEvent::ShipmentDelivered(ShipmentDelivered {
            tenant_id: cmd.tenant_id,
            shipment_id: cmd.shipment_id,
            location: cmd.location.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelShipment) -> Result<Vec<ShipmentEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.shipment_id)?;

        // Once a shipment has moved past pickup it cannot be cancelled.
        if !self.status.can_transition_to(ShipmentStatus::Cancelled) {
            return Err(DomainError::CannotCancel(self.status.as_str().to_string()));
        }

        Ok(vec![ShipmentEvent::ShipmentCancelled(ShipmentCancelled {
            tenant_id: cmd.tenant_id,
            shipment_id: cmd.shipment_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remeasure(
        &self,
        cmd: &RemeasurePackage,
    ) -> Result<Vec<ShipmentEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.shipment_id)?;

        if self.status != ShipmentStatus::Pending {
            return Err(DomainError::invariant(
                "packages can only be re-measured before the label is created",
            ));
        }
        if cmd.package_index >= self.packages.len() {
            return Err(DomainError::validation(format!(
                "no package at index {}",
                cmd.package_index
            )));
        }
        if cmd.actual_weight_g == 0 && cmd.dimensions.volume_mm3() == 0 {
            return Err(DomainError::validation(
                "package needs an actual weight or dimensions",
            ));
        }

        Ok(vec![ShipmentEvent::PackageRemeasured(PackageRemeasured {
            tenant_id: cmd.tenant_id,
            shipment_id: cmd.shipment_id,
            package_index: cmd.package_index,
            dimensions: cmd.dimensions,
            actual_weight_g: cmd.actual_weight_g,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_shipment_id() -> ShipmentId {
        ShipmentId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn address(postal: &str) -> Address {
        Address {
            name: "Jean Dupont".to_string(),
            line1: "10 rue de Rivoli".to_string(),
            line2: None,
            city: "Paris".to_string(),
            postal_code: postal.to_string(),
            country: "FR".to_string(),
            residential: true,
        }
    }

    fn draft() -> PackageDraft {
        PackageDraft {
            dimensions: Dimensions { length_mm: 200, width_mm: 150, height_mm: 100 },
            actual_weight_g: 1_500,
            declared_value: 2_000,
            contents: vec!["book".to_string()],
        }
    }

    fn create_cmd(tenant_id: TenantId, shipment_id: ShipmentId) -> CreateShipment {
        CreateShipment {
            tenant_id,
            shipment_id,
            shipment_number: "SHP-0001".to_string(),
            carrier_id: CarrierId::new(AggregateId::new()),
            tariff_code: "colissimo-home".to_string(),
            method: "per_weight".to_string(),
            origin: address("75001"),
            destination: address("69001"),
            pickup_point: None,
            packages: vec![draft()],
            cost: CostBreakdown {
                base: 695,
                insurance: 0,
                surcharges: 35,
                total: 730,
                currency: "EUR".to_string(),
            },
            occurred_at: test_time(),
        }
    }

    fn created_shipment(tenant_id: TenantId, shipment_id: ShipmentId) -> Shipment {
        let mut shipment = Shipment::empty(shipment_id);
        let events = shipment
            .handle(&ShipmentCommand::CreateShipment(create_cmd(tenant_id, shipment_id)))
            .unwrap();
        shipment.apply(&events[0]);
        shipment
    }

    fn labelled_shipment(tenant_id: TenantId, shipment_id: ShipmentId) -> Shipment {
        let mut shipment = created_shipment(tenant_id, shipment_id);
        let events = shipment
            .handle(&ShipmentCommand::GenerateLabel(GenerateLabel {
                tenant_id,
                shipment_id,
                master_tracking_number: "SL1234567890AB".to_string(),
                package_tracking_numbers: vec!["SL1234567890A1".to_string()],
                occurred_at: test_time(),
            }))
            .unwrap();
        shipment.apply(&events[0]);
        shipment
    }

    /// Drive a shipment into an arbitrary state by applying events directly.
    fn shipment_in(status: ShipmentStatus) -> (Shipment, TenantId, ShipmentId) {
        let tenant_id = test_tenant_id();
        let shipment_id = test_shipment_id();

        let mut shipment = created_shipment(tenant_id, shipment_id);
        if status == ShipmentStatus::Pending {
            return (shipment, tenant_id, shipment_id);
        }

        if status == ShipmentStatus::Cancelled {
            shipment.apply(&ShipmentEvent::ShipmentCancelled(ShipmentCancelled {
                tenant_id,
                shipment_id,
                reason: "test".to_string(),
                occurred_at: test_time(),
            }));
            return (shipment, tenant_id, shipment_id);
        }

        shipment.apply(&ShipmentEvent::LabelGenerated(LabelGenerated {
            tenant_id,
            shipment_id,
            master_tracking_number: "SL1234567890AB".to_string(),
            package_tracking_numbers: vec!["SL1234567890A1".to_string()],
            occurred_at: test_time(),
        }));
        if status == ShipmentStatus::LabelCreated {
            return (shipment, tenant_id, shipment_id);
        }

        shipment.apply(&ShipmentEvent::TrackingScanRecorded(TrackingScanRecorded {
            tenant_id,
            shipment_id,
            status,
            description: "scan".to_string(),
            location: None,
            occurred_at: test_time(),
        }));
        (shipment, tenant_id, shipment_id)
    }

    #[test]
    fn create_validates_and_freezes_state() {
        let tenant_id = test_tenant_id();
        let shipment_id = test_shipment_id();
        let shipment = created_shipment(tenant_id, shipment_id);

        assert_eq!(shipment.status(), ShipmentStatus::Pending);
        assert_eq!(shipment.shipment_number(), "SHP-0001");
        assert_eq!(shipment.packages().len(), 1);
        assert_eq!(shipment.packages()[0].billable_weight_g, 1_500);
        assert_eq!(shipment.billable_weight_g(), 1_500);
        assert_eq!(shipment.tracking_events().len(), 1);
        assert_eq!(shipment.tracking_events()[0].status, ShipmentStatus::Pending);
        assert_eq!(shipment.version(), 1);
    }

    #[test]
    fn create_rejects_empty_packages_and_bad_cost() {
        let tenant_id = test_tenant_id();
        let shipment_id = test_shipment_id();
        let shipment = Shipment::empty(shipment_id);

        let mut cmd = create_cmd(tenant_id, shipment_id);
        cmd.packages.clear();
        let err = shipment
            .handle(&ShipmentCommand::CreateShipment(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut cmd = create_cmd(tenant_id, shipment_id);
        cmd.cost.total = 9_999;
        let err = shipment
            .handle(&ShipmentCommand::CreateShipment(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn label_assigns_tracking_numbers_and_logs_event() {
        let tenant_id = test_tenant_id();
        let shipment_id = test_shipment_id();
        let shipment = labelled_shipment(tenant_id, shipment_id);

        assert_eq!(shipment.status(), ShipmentStatus::LabelCreated);
        assert_eq!(shipment.master_tracking_number(), Some("SL1234567890AB"));
        assert_eq!(
            shipment.packages()[0].tracking_number.as_deref(),
            Some("SL1234567890A1")
        );
        let last = shipment.tracking_events().last().unwrap();
        assert_eq!(last.description, "label_created");
        assert_eq!(last.status, ShipmentStatus::LabelCreated);
    }

    #[test]
    fn second_label_request_is_rejected_without_mutation() {
        let tenant_id = test_tenant_id();
        let shipment_id = test_shipment_id();
        let shipment = labelled_shipment(tenant_id, shipment_id);
        let version_before = shipment.version();

        let err = shipment
            .handle(&ShipmentCommand::GenerateLabel(GenerateLabel {
                tenant_id,
                shipment_id,
                master_tracking_number: "SL0000000000XX".to_string(),
                package_tracking_numbers: vec!["SL0000000000X1".to_string()],
                occurred_at: test_time(),
            }))
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::invalid_transition("label_created", "label_created")
        );
        assert_eq!(shipment.version(), version_before);
        assert_eq!(shipment.master_tracking_number(), Some("SL1234567890AB"));
    }

    #[test]
    fn label_requires_one_tracking_number_per_package() {
        let tenant_id = test_tenant_id();
        let shipment_id = test_shipment_id();
        let shipment = created_shipment(tenant_id, shipment_id);

        let err = shipment
            .handle(&ShipmentCommand::GenerateLabel(GenerateLabel {
                tenant_id,
                shipment_id,
                master_tracking_number: "SL1234567890AB".to_string(),
                package_tracking_numbers: vec![],
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn delivery_stamps_timestamp() {
        let (mut shipment, tenant_id, shipment_id) = shipment_in(ShipmentStatus::OutForDelivery);
        let delivered_at = test_time();

        let events = shipment
            .handle(&ShipmentCommand::MarkDelivered(MarkDelivered {
                tenant_id,
                shipment_id,
                location: Some("Paris".to_string()),
                occurred_at: delivered_at,
            }))
            .unwrap();
        shipment.apply(&events[0]);

        assert_eq!(shipment.status(), ShipmentStatus::Delivered);
        assert_eq!(shipment.delivered_at(), Some(delivered_at));
    }

    #[test]
    fn delivery_from_pending_is_rejected() {
        let (shipment, tenant_id, shipment_id) = shipment_in(ShipmentStatus::Pending);

        let err = shipment
            .handle(&ShipmentCommand::MarkDelivered(MarkDelivered {
                tenant_id,
                shipment_id,
                location: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::invalid_transition("pending", "delivered"));
    }

    #[test]
    fn cancel_is_rejected_after_pickup() {
        let (shipment, tenant_id, shipment_id) = shipment_in(ShipmentStatus::InTransit);

        let err = shipment
            .handle(&ShipmentCommand::CancelShipment(CancelShipment {
                tenant_id,
                shipment_id,
                reason: "customer changed their mind".to_string(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::CannotCancel("in_transit".to_string()));
    }

    #[test]
    fn cancel_from_label_created_succeeds() {
        let tenant_id = test_tenant_id();
        let shipment_id = test_shipment_id();
        let mut shipment = labelled_shipment(tenant_id, shipment_id);

        let events = shipment
            .handle(&ShipmentCommand::CancelShipment(CancelShipment {
                tenant_id,
                shipment_id,
                reason: "out of stock".to_string(),
                occurred_at: test_time(),
            }))
            .unwrap();
        shipment.apply(&events[0]);

        assert_eq!(shipment.status(), ShipmentStatus::Cancelled);
        let last = shipment.tracking_events().last().unwrap();
        assert!(last.description.contains("out of stock"));
    }

    #[test]
    fn scans_cannot_smuggle_reserved_statuses() {
        let (shipment, tenant_id, shipment_id) = shipment_in(ShipmentStatus::LabelCreated);

        for reserved in [
            ShipmentStatus::Pending,
            ShipmentStatus::LabelCreated,
            ShipmentStatus::Cancelled,
        ] {
            let err = shipment
                .handle(&ShipmentCommand::RecordTrackingScan(RecordTrackingScan {
                    tenant_id,
                    shipment_id,
                    status: reserved,
                    description: "scan".to_string(),
                    location: None,
                    occurred_at: test_time(),
                }))
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{reserved}");
        }
    }

    #[test]
    fn transition_table_closure_over_scan_commands() {
        // Every (state, target) pair outside the allowed table is rejected
        // and leaves state unchanged; every pair inside it succeeds.
        let scannable = [
            ShipmentStatus::PickedUp,
            ShipmentStatus::InTransit,
            ShipmentStatus::OutForDelivery,
            ShipmentStatus::FailedAttempt,
            ShipmentStatus::Exception,
            ShipmentStatus::Delivered,
            ShipmentStatus::Returned,
        ];

        for from in ShipmentStatus::ALL {
            for to in scannable {
                let (shipment, tenant_id, shipment_id) = shipment_in(from);
                let before = shipment.clone();

                let result = shipment.handle(&ShipmentCommand::RecordTrackingScan(
                    RecordTrackingScan {
                        tenant_id,
                        shipment_id,
                        status: to,
                        description: "scan".to_string(),
                        location: None,
                        occurred_at: test_time(),
                    },
                ));

                if from.can_transition_to(to) {
                    assert!(result.is_ok(), "{from} -> {to} should be allowed");
                } else {
                    assert_eq!(
                        result.unwrap_err(),
                        DomainError::invalid_transition(from.as_str(), to.as_str()),
                        "{from} -> {to} should be rejected"
                    );
                    assert_eq!(shipment, before, "rejected scan must not mutate");
                }
            }
        }
    }

    #[test]
    fn remeasure_recomputes_derived_weight_before_label_only() {
        let tenant_id = test_tenant_id();
        let shipment_id = test_shipment_id();
        let mut shipment = created_shipment(tenant_id, shipment_id);

        let events = shipment
            .handle(&ShipmentCommand::RemeasurePackage(RemeasurePackage {
                tenant_id,
                shipment_id,
                package_index: 0,
                dimensions: Dimensions { length_mm: 600, width_mm: 400, height_mm: 400 },
                actual_weight_g: 2_000,
                occurred_at: test_time(),
            }))
            .unwrap();
        shipment.apply(&events[0]);
        assert_eq!(shipment.packages()[0].billable_weight_g, 19_200);

        let shipment = labelled_shipment(tenant_id, test_shipment_id());
        let err = shipment
            .handle(&ShipmentCommand::RemeasurePackage(RemeasurePackage {
                tenant_id,
                shipment_id: shipment.id_typed(),
                package_index: 0,
                dimensions: Dimensions::default(),
                actual_weight_g: 100,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn tracking_log_grows_monotonically_through_lifecycle() {
        let tenant_id = test_tenant_id();
        let shipment_id = test_shipment_id();
        let mut shipment = labelled_shipment(tenant_id, shipment_id);

        let steps = [
            ShipmentStatus::PickedUp,
            ShipmentStatus::InTransit,
            ShipmentStatus::OutForDelivery,
            ShipmentStatus::Delivered,
        ];
        for (i, status) in steps.into_iter().enumerate() {
            let events = shipment
                .handle(&ShipmentCommand::RecordTrackingScan(RecordTrackingScan {
                    tenant_id,
                    shipment_id,
                    status,
                    description: format!("scan {i}"),
                    location: Some("hub".to_string()),
                    occurred_at: test_time(),
                }))
                .unwrap();
            shipment.apply(&events[0]);
        }

        // created + label + 4 scans.
        assert_eq!(shipment.tracking_events().len(), 6);
        assert_eq!(shipment.status(), ShipmentStatus::Delivered);
        assert_eq!(shipment.version(), 6);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let tenant_id = test_tenant_id();
        let shipment_id = test_shipment_id();
        let shipment = created_shipment(tenant_id, shipment_id);
        let snapshot = shipment.clone();

        let _ = shipment.handle(&ShipmentCommand::GenerateLabel(GenerateLabel {
            tenant_id,
            shipment_id,
            master_tracking_number: "SL1234567890AB".to_string(),
            package_tracking_numbers: vec!["SL1234567890A1".to_string()],
            occurred_at: test_time(),
        }));

        assert_eq!(shipment, snapshot);
    }
}
