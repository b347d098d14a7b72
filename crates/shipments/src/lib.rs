//! Shipments domain module.
//!
//! This crate contains the shipment aggregate: packages with derived
//! weights, frozen address snapshots, the shipment lifecycle machine and
//! its append-only tracking log. Implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod address;
pub mod package;
pub mod shipment;
pub mod status;
pub mod tracking;

pub use address::Address;
pub use package::{Package, PackageDraft};
pub use shipment::{
    CancelShipment, CostBreakdown, CreateShipment, GenerateLabel, LabelGenerated, MarkDelivered,
    MarkPickedUp, PackageRemeasured, RecordTrackingScan, RemeasurePackage, Shipment,
    ShipmentCancelled, ShipmentCommand, ShipmentCreated, ShipmentDelivered, ShipmentEvent,
    ShipmentId, ShipmentPickedUp, TrackingScanRecorded,
};
pub use status::ShipmentStatus;
pub use tracking::TrackingEvent;
