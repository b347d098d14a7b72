use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use shiplane_carriers::{
    Carrier, CarrierCapabilities, CarrierDefinition, CarrierId, DeliveryEstimate, ServiceLimits,
};
use shiplane_core::{AggregateId, TenantId};
use shiplane_rates::{
    quote, Dimensions, PackageInput, PricingMethod, QuoteRequest, Surcharges, Tariff,
    TariffDefinition, TariffId, WeightTier,
};
use shiplane_zones::{PostalPattern, Zone, ZoneDefinition, ZoneId};

fn catalog(tariff_count: usize) -> (Vec<Zone>, Vec<Carrier>, Vec<Tariff>) {
    let tenant = TenantId::new();

    let zones: Vec<Zone> = (0..8i32)
        .map(|i| {
            Zone::new(
                ZoneId::new(AggregateId::new()),
                tenant,
                ZoneDefinition {
                    code: format!("zone-{i}"),
                    name: format!("Zone {i}"),
                    countries: vec!["FR".to_string()],
                    allowed: if i == 7 {
                        vec![]
                    } else {
                        vec![PostalPattern::parse(&format!("{}*", 10 + i)).unwrap()]
                    },
                    excluded: vec![PostalPattern::parse("97*").unwrap()],
                    priority: i,
                },
            )
            .unwrap()
        })
        .collect();

    let carriers: Vec<Carrier> = (0..4)
        .map(|i| {
            Carrier::new(
                CarrierId::new(AggregateId::new()),
                tenant,
                CarrierDefinition {
                    code: format!("carrier-{i}"),
                    name: format!("Carrier {i}"),
                    capabilities: CarrierCapabilities::default(),
                    limits: ServiceLimits { max_weight_g: Some(30_000), ..ServiceLimits::default() },
                    delivery: DeliveryEstimate { min_days: 1, max_days: 5 },
                },
            )
            .unwrap()
        })
        .collect();

    let tariffs: Vec<Tariff> = (0..tariff_count)
        .map(|i| {
            let carrier = &carriers[i % carriers.len()];
            Tariff::new(
                TariffId::new(AggregateId::new()),
                tenant,
                TariffDefinition {
                    code: format!("tariff-{i}"),
                    name: format!("Tariff {i}"),
                    carrier_id: carrier.id_typed(),
                    zone_id: None,
                    method: PricingMethod::PerWeight {
                        base: 0,
                        per_kg: 0,
                        tiers: vec![
                            WeightTier { ceiling_g: 1_000, rate: 495 + i as u64 },
                            WeightTier { ceiling_g: 3_000, rate: 695 + i as u64 },
                            WeightTier { ceiling_g: 10_000, rate: 1_095 + i as u64 },
                        ],
                    },
                    currency: "EUR".to_string(),
                    surcharges: Surcharges { fuel_pct_bp: 500, residential: 100, oversize: 0 },
                    free_shipping_threshold: Some(10_000),
                    valid_from: None,
                    valid_until: None,
                },
            )
            .unwrap()
        })
        .collect();

    (zones, carriers, tariffs)
}

fn bench_quote(c: &mut Criterion) {
    let (zones, carriers, tariffs) = catalog(64);
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let request = QuoteRequest {
        country: "FR".to_string(),
        postal_code: "17000".to_string(),
        residential: true,
        packages: vec![
            PackageInput {
                dimensions: Dimensions { length_mm: 200, width_mm: 150, height_mm: 100 },
                weight_g: 1_500,
                declared_value: 2_000,
            },
            PackageInput {
                dimensions: Dimensions { length_mm: 400, width_mm: 300, height_mm: 200 },
                weight_g: 800,
                declared_value: 4_500,
            },
        ],
        order_total: 6_500,
        currency: "EUR".to_string(),
        item_count: Some(3),
    };

    c.bench_function("quote_64_tariffs", |b| {
        b.iter(|| {
            quote(
                black_box(&zones),
                black_box(&carriers),
                black_box(&tariffs),
                today,
                5_000,
                black_box(&request),
            )
        })
    });
}

criterion_group!(benches, bench_quote);
criterion_main!(benches);
