//! Packages: physical attributes plus derived weights.

use serde::{Deserialize, Serialize};

use shiplane_core::{DomainError, DomainResult};
use shiplane_rates::{compute_billable, Dimensions, DEFAULT_VOLUMETRIC_DIVISOR};

/// Caller-supplied package fields. Derived weights are never accepted from
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDraft {
    pub dimensions: Dimensions,
    pub actual_weight_g: u64,
    /// Declared value, smallest currency unit.
    #[serde(default)]
    pub declared_value: u64,
    /// Contents manifest, free-text lines.
    #[serde(default)]
    pub contents: Vec<String>,
}

impl PackageDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.actual_weight_g == 0 && self.dimensions.volume_mm3() == 0 {
            return Err(DomainError::validation(
                "package needs an actual weight or dimensions",
            ));
        }
        Ok(())
    }
}

/// A package owned by one shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub dimensions: Dimensions,
    pub actual_weight_g: u64,
    pub declared_value: u64,
    pub contents: Vec<String>,
    /// Derived: volume-based weight proxy, grams.
    pub dim_weight_g: u64,
    /// Derived: `max(actual, dimensional)`, grams.
    pub billable_weight_g: u64,
    /// Assigned at label generation.
    pub tracking_number: Option<String>,
}

impl Package {
    pub fn from_draft(draft: PackageDraft) -> Self {
        let derived =
            compute_billable(draft.dimensions, draft.actual_weight_g, DEFAULT_VOLUMETRIC_DIVISOR);
        Self {
            dimensions: draft.dimensions,
            actual_weight_g: draft.actual_weight_g,
            declared_value: draft.declared_value,
            contents: draft.contents,
            dim_weight_g: derived.dim_weight_g,
            billable_weight_g: derived.billable_weight_g,
            tracking_number: None,
        }
    }

    /// Re-measure the package. Derived weights are recomputed here and only
    /// here; a stale cached weight is a correctness bug.
    pub fn remeasure(&mut self, dimensions: Dimensions, actual_weight_g: u64) {
        let derived = compute_billable(dimensions, actual_weight_g, DEFAULT_VOLUMETRIC_DIVISOR);
        self.dimensions = dimensions;
        self.actual_weight_g = actual_weight_g;
        self.dim_weight_g = derived.dim_weight_g;
        self.billable_weight_g = derived.billable_weight_g;
    }
}
