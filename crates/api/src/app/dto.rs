use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use shiplane_carriers::Carrier;
use shiplane_core::AggregateRoot;
use shiplane_rates::{RateQuote, Tariff};
use shiplane_returns::{ItemCondition, RefundMethod, Return, ReturnItem};
use shiplane_shipments::{Address, CostBreakdown, PackageDraft, Shipment, ShipmentStatus};
use shiplane_zones::Zone;

// -------------------------
// Request DTOs
// -------------------------

/// Optimistic-concurrency pin for catalog writes. Omitted = no version check.
#[derive(Debug, Default, Deserialize)]
pub struct VersionQuery {
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateShipmentRequest {
    pub carrier_id: String,
    pub tariff_code: String,
    /// Pricing-method label snapshotted from the chosen quote.
    pub method: String,
    pub origin: Address,
    pub destination: Address,
    #[serde(default)]
    pub pickup_point: Option<String>,
    pub packages: Vec<PackageDraft>,
    pub cost: CostBreakdown,
}

#[derive(Debug, Deserialize)]
pub struct TrackingScanRequest {
    pub status: ShipmentStatus,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Carrier-supplied timestamp; defaults to now.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationRequest {
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelShipmentRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateReturnRequest {
    pub shipment_id: String,
    #[serde(default)]
    pub order_ref: Option<String>,
    pub items: Vec<ReturnItem>,
}

#[derive(Debug, Deserialize)]
pub struct RejectReturnRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ConditionRequest {
    pub condition: ItemCondition,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    /// Gross refund, smallest currency unit.
    pub amount: u64,
    pub method: RefundMethod,
    #[serde(default)]
    pub restocking_fee: u64,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn zone_to_json(zone: &Zone) -> serde_json::Value {
    json!({
        "id": zone.id_typed().to_string(),
        "code": zone.code(),
        "name": zone.name(),
        "countries": zone.countries(),
        "allowed": zone.allowed().iter().map(|p| p.to_wire()).collect::<Vec<_>>(),
        "excluded": zone.excluded().iter().map(|p| p.to_wire()).collect::<Vec<_>>(),
        "priority": zone.priority(),
        "active": zone.is_active(),
        "version": zone.version(),
    })
}

pub fn carrier_to_json(carrier: &Carrier) -> serde_json::Value {
    json!({
        "id": carrier.id_typed().to_string(),
        "code": carrier.code(),
        "name": carrier.name(),
        "capabilities": carrier.capabilities(),
        "limits": carrier.limits(),
        "delivery": carrier.delivery(),
        "active": carrier.is_active(),
        "version": carrier.version(),
    })
}

pub fn tariff_to_json(tariff: &Tariff) -> serde_json::Value {
    json!({
        "id": tariff.id_typed().to_string(),
        "code": tariff.code(),
        "name": tariff.name(),
        "carrier_id": tariff.carrier_id().to_string(),
        "zone_id": tariff.zone_id().map(|z| z.to_string()),
        "pricing": tariff.method(),
        "currency": tariff.currency(),
        "surcharges": tariff.surcharges(),
        "free_shipping_threshold": tariff.free_shipping_threshold(),
        "active": tariff.is_active(),
        "version": tariff.version(),
    })
}

pub fn quote_to_json(quote: &RateQuote) -> serde_json::Value {
    json!({
        "carrier_id": quote.carrier_id.to_string(),
        "carrier_name": quote.carrier_name,
        "tariff_id": quote.tariff_id.to_string(),
        "tariff_code": quote.tariff_code,
        "method": quote.method,
        "cost": quote.cost,
        "currency": quote.currency,
        "free": quote.free,
        "delivery_days_min": quote.delivery.min_days,
        "delivery_days_max": quote.delivery.max_days,
        "zone_id": quote.zone_id.to_string(),
        "zone_name": quote.zone_name,
    })
}

pub fn shipment_to_json(shipment: &Shipment) -> serde_json::Value {
    json!({
        "id": shipment.id_typed().to_string(),
        "shipment_number": shipment.shipment_number(),
        "carrier_id": shipment.carrier_id().map(|c| c.to_string()),
        "tariff_code": shipment.tariff_code(),
        "method": shipment.method(),
        "status": shipment.status(),
        "origin": shipment.origin(),
        "destination": shipment.destination(),
        "pickup_point": shipment.pickup_point(),
        "cost": shipment.cost(),
        "master_tracking_number": shipment.master_tracking_number(),
        "delivered_at": shipment.delivered_at(),
        "billable_weight_g": shipment.billable_weight_g(),
        "packages": shipment.packages(),
        "tracking_events": shipment.tracking_events(),
        "version": shipment.version(),
    })
}

pub fn return_to_json(rma: &Return) -> serde_json::Value {
    json!({
        "id": rma.id_typed().to_string(),
        "return_number": rma.return_number(),
        "shipment_id": rma.shipment_id().map(|s| s.to_string()),
        "order_ref": rma.order_ref(),
        "status": rma.status(),
        "items": rma.items(),
        "label_tracking_number": rma.label_tracking_number(),
        "inspection": rma.inspection(),
        "refund": rma.refund(),
        "version": rma.version(),
    })
}
