//! Shipment lifecycle states and the fixed allowed-transition table.

use serde::{Deserialize, Serialize};

/// Shipment status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    LabelCreated,
    PickedUp,
    InTransit,
    OutForDelivery,
    FailedAttempt,
    Exception,
    Delivered,
    Returned,
    Cancelled,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 10] = [
        Self::Pending,
        Self::LabelCreated,
        Self::PickedUp,
        Self::InTransit,
        Self::OutForDelivery,
        Self::FailedAttempt,
        Self::Exception,
        Self::Delivered,
        Self::Returned,
        Self::Cancelled,
    ];

    /// The fixed transition table: every legal target for each state.
    ///
    /// Anything not listed here is rejected; the match is exhaustive so a
    /// new state cannot be added without deciding its row.
    pub fn allowed_targets(self) -> &'static [ShipmentStatus] {
        match self {
            Self::Pending => &[Self::LabelCreated, Self::Cancelled],
            Self::LabelCreated => &[Self::PickedUp, Self::Cancelled],
            Self::PickedUp => &[Self::InTransit, Self::Delivered],
            Self::InTransit => &[
                Self::OutForDelivery,
                Self::FailedAttempt,
                Self::Exception,
                Self::Delivered,
            ],
            Self::OutForDelivery => &[Self::Delivered, Self::FailedAttempt, Self::Exception],
            Self::FailedAttempt => &[Self::OutForDelivery, Self::InTransit, Self::Exception],
            Self::Exception => &[Self::InTransit, Self::OutForDelivery, Self::Returned],
            Self::Delivered => &[Self::Returned],
            Self::Returned => &[],
            Self::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, target: ShipmentStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::LabelCreated => "label_created",
            Self::PickedUp => "picked_up",
            Self::InTransit => "in_transit",
            Self::OutForDelivery => "out_for_delivery",
            Self::FailedAttempt => "failed_attempt",
            Self::Exception => "exception",
            Self::Delivered => "delivered",
            Self::Returned => "returned",
            Self::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
