//! Rate pricer: one tariff + one consignment → one priced option.

use chrono::NaiveDate;
use thiserror::Error;

use shiplane_carriers::Carrier;

use crate::tariff::{PricingMethod, Tariff};

/// Consignment facts the pricer needs. Immutable; pricing is side-effect-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingInput {
    pub billable_weight_g: u64,
    /// Order total in the tariff currency's smallest unit.
    pub order_total: u64,
    pub item_count: u32,
    pub residential: bool,
    pub oversize: bool,
}

/// The pricer's verdict for an eligible tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priced {
    /// Final cost, smallest currency unit.
    pub cost: u64,
    /// Free-shipping override fired; the cost is zero by decree, not arithmetic.
    pub free: bool,
}

/// Why a tariff was never priced. Not a failure: ineligible tariffs are
/// silently skipped during quoting.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    #[error("tariff is inactive")]
    TariffInactive,
    #[error("today is outside the tariff validity window")]
    OutsideValidity,
    #[error("carrier is inactive")]
    CarrierInactive,
    #[error("consignment exceeds the carrier weight limit")]
    OverWeightLimit,
}

/// Price a consignment against one tariff.
///
/// Post-processing order is fixed: residential surcharge, oversize
/// surcharge, fuel percentage (half-up rounding), then the free-shipping
/// override, which wins absolutely — surcharges never apply on top of a
/// free shipment.
pub fn price(
    tariff: &Tariff,
    carrier: &Carrier,
    today: NaiveDate,
    input: &PricingInput,
) -> Result<Priced, Ineligible> {
    if !tariff.is_active() {
        return Err(Ineligible::TariffInactive);
    }
    if !tariff.is_valid_on(today) {
        return Err(Ineligible::OutsideValidity);
    }
    if !carrier.is_active() {
        return Err(Ineligible::CarrierInactive);
    }
    if !carrier.accepts_weight(input.billable_weight_g) {
        return Err(Ineligible::OverWeightLimit);
    }

    let mut cost = base_cost(tariff.method(), input);

    let surcharges = tariff.surcharges();
    if input.residential {
        cost += surcharges.residential;
    }
    if input.oversize {
        cost += surcharges.oversize;
    }
    if surcharges.fuel_pct_bp > 0 {
        cost += round_half_up(cost * surcharges.fuel_pct_bp as u64, 10_000);
    }

    if let Some(threshold) = tariff.free_shipping_threshold() {
        if input.order_total >= threshold {
            return Ok(Priced { cost: 0, free: true });
        }
    }

    Ok(Priced { cost, free: false })
}

fn base_cost(method: &PricingMethod, input: &PricingInput) -> u64 {
    match method {
        PricingMethod::Flat { base } => *base,

        PricingMethod::PerWeight { base, per_kg, tiers } => {
            if tiers.is_empty() {
                return base + per_kg_cost(*per_kg, input.billable_weight_g);
            }
            // Tiers are kept sorted ascending by ceiling; the first tier that
            // holds the weight wins, and over-the-top weights clamp to the
            // highest tier rather than extrapolating.
            tiers
                .iter()
                .find(|t| t.ceiling_g >= input.billable_weight_g)
                .or(tiers.last())
                .map(|t| t.rate)
                .unwrap_or(*base)
        }

        PricingMethod::PerPriceBracket { base, brackets } => brackets
            .iter()
            .find(|b| {
                input.order_total >= b.min
                    && b.max.map(|max| input.order_total < max).unwrap_or(true)
            })
            .map(|b| b.rate)
            .unwrap_or(*base),

        PricingMethod::PerItem { base, per_item } => {
            base + per_item * input.item_count as u64
        }

        PricingMethod::Volumetric { base, per_kg } => {
            base + per_kg_cost(*per_kg, input.billable_weight_g)
        }
    }
}

fn per_kg_cost(per_kg: u64, weight_g: u64) -> u64 {
    round_half_up(per_kg * weight_g, 1_000)
}

fn round_half_up(numer: u64, denom: u64) -> u64 {
    (numer + denom / 2) / denom
}
