//! Billable weight: the greater of actual and dimensional weight.

use serde::{Deserialize, Serialize};

use shiplane_core::ValueObject;

/// Default volumetric divisor, cm³ per kg-equivalent.
pub const DEFAULT_VOLUMETRIC_DIVISOR: u64 = 5000;

/// Package dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_mm: u32,
    pub width_mm: u32,
    pub height_mm: u32,
}

impl Dimensions {
    pub fn volume_mm3(&self) -> u64 {
        self.length_mm as u64 * self.width_mm as u64 * self.height_mm as u64
    }

    /// Longest single side.
    pub fn longest_mm(&self) -> u32 {
        self.length_mm.max(self.width_mm).max(self.height_mm)
    }

    /// Girth: 2×width + 2×height + length, on the longest-side-as-length
    /// orientation.
    pub fn girth_mm(&self) -> u64 {
        let longest = self.longest_mm() as u64;
        let perimeter_sides =
            self.length_mm as u64 + self.width_mm as u64 + self.height_mm as u64 - longest;
        longest + 2 * perimeter_sides
    }
}

impl ValueObject for Dimensions {}

/// Computed weights, grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DerivedWeight {
    pub dim_weight_g: u64,
    pub billable_weight_g: u64,
}

/// Derive dimensional and billable weight.
///
/// `dim_weight_g = volume_cm³ × 1000 / divisor`, which with millimetre
/// dimensions reduces to `volume_mm³ / divisor`. Zero or missing dimensions
/// give a zero dimensional weight, so billable weight falls back to the
/// actual weight. Pure; must be re-run whenever dimensions or weight change.
pub fn compute(dims: Dimensions, actual_weight_g: u64, divisor: u64) -> DerivedWeight {
    let dim_weight_g = if divisor == 0 { 0 } else { dims.volume_mm3() / divisor };
    DerivedWeight {
        dim_weight_g,
        billable_weight_g: actual_weight_g.max(dim_weight_g),
    }
}
