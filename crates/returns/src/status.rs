//! Return lifecycle states and the fixed allowed-transition table.

use serde::{Deserialize, Serialize};

/// Return status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Requested,
    Approved,
    LabelSent,
    InTransit,
    Received,
    Inspected,
    Refunded,
    Rejected,
}

impl ReturnStatus {
    pub const ALL: [ReturnStatus; 8] = [
        Self::Requested,
        Self::Approved,
        Self::LabelSent,
        Self::InTransit,
        Self::Received,
        Self::Inspected,
        Self::Refunded,
        Self::Rejected,
    ];

    /// The fixed transition table.
    ///
    /// `Rejected` is reachable only before approval or after inspection;
    /// `Refunded` only once the goods are physically back.
    pub fn allowed_targets(self) -> &'static [ReturnStatus] {
        match self {
            Self::Requested => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::LabelSent],
            Self::LabelSent => &[Self::InTransit],
            Self::InTransit => &[Self::Received],
            Self::Received => &[Self::Inspected, Self::Refunded],
            Self::Inspected => &[Self::Refunded, Self::Rejected],
            Self::Refunded => &[],
            Self::Rejected => &[],
        }
    }

    pub fn can_transition_to(self, target: ReturnStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Approved => "approved",
            Self::LabelSent => "label_sent",
            Self::InTransit => "in_transit",
            Self::Received => "received",
            Self::Inspected => "inspected",
            Self::Refunded => "refunded",
            Self::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
