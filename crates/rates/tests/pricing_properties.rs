//! Property coverage for pricing.

use chrono::NaiveDate;
use proptest::prelude::*;

use shiplane_carriers::{
    Carrier, CarrierCapabilities, CarrierDefinition, CarrierId, DeliveryEstimate, ServiceLimits,
};
use shiplane_core::{AggregateId, TenantId};
use shiplane_rates::{
    compute_billable, price, Dimensions, PricingInput, PricingMethod, Surcharges, Tariff,
    TariffDefinition, TariffId, WeightTier, DEFAULT_VOLUMETRIC_DIVISOR,
};

fn carrier() -> Carrier {
    Carrier::new(
        CarrierId::new(AggregateId::new()),
        TenantId::new(),
        CarrierDefinition {
            code: "dhl".to_string(),
            name: "DHL".to_string(),
            capabilities: CarrierCapabilities::default(),
            limits: ServiceLimits::default(),
            delivery: DeliveryEstimate { min_days: 1, max_days: 3 },
        },
    )
    .unwrap()
}

fn tariff(
    method: PricingMethod,
    surcharges: Surcharges,
    free_shipping_threshold: Option<u64>,
) -> Tariff {
    Tariff::new(
        TariffId::new(AggregateId::new()),
        TenantId::new(),
        TariffDefinition {
            code: "t".to_string(),
            name: "t".to_string(),
            carrier_id: CarrierId::new(AggregateId::new()),
            zone_id: None,
            method,
            currency: "EUR".to_string(),
            surcharges,
            free_shipping_threshold,
            valid_from: None,
            valid_until: None,
        },
    )
    .unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

proptest! {
    /// billable = max(actual, volume/divisor) for all non-negative inputs.
    #[test]
    fn billable_weight_law(
        length_mm in 0u32..2_000,
        width_mm in 0u32..2_000,
        height_mm in 0u32..2_000,
        actual_weight_g in 0u64..100_000,
    ) {
        let dims = Dimensions { length_mm, width_mm, height_mm };
        let derived = compute_billable(dims, actual_weight_g, DEFAULT_VOLUMETRIC_DIVISOR);

        prop_assert_eq!(derived.dim_weight_g, dims.volume_mm3() / DEFAULT_VOLUMETRIC_DIVISOR);
        prop_assert_eq!(
            derived.billable_weight_g,
            actual_weight_g.max(derived.dim_weight_g)
        );
    }

    /// For an ascending tier table, increasing weight never selects a
    /// cheaper tier (tier rates themselves are forced ascending here so the
    /// property is about selection, not table shape).
    #[test]
    fn tier_selection_is_monotonic(
        mut raw_tiers in proptest::collection::vec((1u64..50_000, 1u64..10_000), 1..6),
        w1 in 0u64..60_000,
        w2 in 0u64..60_000,
    ) {
        raw_tiers.sort();
        raw_tiers.dedup_by_key(|(ceiling, _)| *ceiling);
        let mut rate_floor = 0;
        let tiers: Vec<WeightTier> = raw_tiers
            .into_iter()
            .map(|(ceiling_g, increment)| {
                rate_floor += increment;
                WeightTier { ceiling_g, rate: rate_floor }
            })
            .collect();

        let t = tariff(
            PricingMethod::PerWeight { base: 0, per_kg: 0, tiers },
            Surcharges::default(),
            None,
        );
        let c = carrier();

        let (lo, hi) = if w1 <= w2 { (w1, w2) } else { (w2, w1) };
        let price_at = |weight| {
            price(&t, &c, today(), &PricingInput {
                billable_weight_g: weight,
                order_total: 0,
                item_count: 1,
                residential: false,
                oversize: false,
            })
            .unwrap()
            .cost
        };

        prop_assert!(price_at(lo) <= price_at(hi));
    }

    /// Order totals at or above the threshold always price to zero,
    /// whatever the surcharges.
    #[test]
    fn free_shipping_override_is_absolute(
        base in 0u64..10_000,
        fuel_pct_bp in 0u32..2_000,
        residential_surcharge in 0u64..2_000,
        threshold in 1u64..100_000,
        above in 0u64..50_000,
        residential in proptest::bool::ANY,
    ) {
        let t = tariff(
            PricingMethod::Flat { base },
            Surcharges { fuel_pct_bp, residential: residential_surcharge, oversize: 0 },
            Some(threshold),
        );
        let c = carrier();

        let priced = price(&t, &c, today(), &PricingInput {
            billable_weight_g: 1_000,
            order_total: threshold + above,
            item_count: 1,
            residential,
            oversize: false,
        })
        .unwrap();

        prop_assert_eq!(priced.cost, 0);
        prop_assert!(priced.free);
    }
}
