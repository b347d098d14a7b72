//! Tracking events: the shipment's append-only audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shiplane_core::ValueObject;

use crate::status::ShipmentStatus;

/// An immutable, timestamped status record appended to a shipment's history.
///
/// The log is write-once-append-only; it is the canonical customer-facing
/// tracking trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: ShipmentStatus,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl ValueObject for TrackingEvent {}
