//! Quote aggregation: resolve a zone, price every eligible tariff, rank.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shiplane_carriers::{Carrier, CarrierId, DeliveryEstimate};
use shiplane_zones::{resolve, AddressNotServiceable, Zone, ZoneId};

use crate::billable::{compute, Dimensions};
use crate::pricer::{price, PricingInput};
use crate::tariff::{Tariff, TariffId};

/// Quoting failure. Recoverable by the caller (correct the address, widen
/// the catalog); pricing itself never fails per-tariff — ineligible tariffs
/// are skipped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuoteError {
    #[error("no zone serves the destination address")]
    AddressNotServiceable,
    #[error("no rate available for the destination")]
    NoRateAvailable,
}

impl From<AddressNotServiceable> for QuoteError {
    fn from(_: AddressNotServiceable) -> Self {
        Self::AddressNotServiceable
    }
}

/// One package of the consignment being quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInput {
    pub dimensions: Dimensions,
    pub weight_g: u64,
    /// Declared value, smallest currency unit.
    #[serde(default)]
    pub declared_value: u64,
}

/// A quote request: destination + consignment + order facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub country: String,
    pub postal_code: String,
    #[serde(default)]
    pub residential: bool,
    pub packages: Vec<PackageInput>,
    /// Order total, smallest currency unit.
    pub order_total: u64,
    pub currency: String,
    /// Item count for per-item tariffs; defaults to the package count.
    #[serde(default)]
    pub item_count: Option<u32>,
}

/// A ranked, priced shipping option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateQuote {
    pub tariff_id: TariffId,
    pub tariff_code: String,
    pub carrier_id: CarrierId,
    pub carrier_name: String,
    pub method: &'static str,
    /// Final cost, smallest currency unit.
    pub cost: u64,
    pub currency: String,
    pub free: bool,
    pub delivery: DeliveryEstimate,
    pub zone_id: ZoneId,
    pub zone_name: String,
}

/// Quote a consignment across every tariff eligible for the resolved zone.
///
/// Each pricer call is self-contained and side-effect-free; results are
/// sorted ascending by cost, ties broken by carrier name so the ranking is
/// deterministic.
pub fn quote(
    zones: &[Zone],
    carriers: &[Carrier],
    tariffs: &[Tariff],
    today: NaiveDate,
    volumetric_divisor: u64,
    request: &QuoteRequest,
) -> Result<Vec<RateQuote>, QuoteError> {
    let zone = resolve(zones, &request.country, &request.postal_code)?;

    let billable_weight_g: u64 = request
        .packages
        .iter()
        .map(|p| compute(p.dimensions, p.weight_g, volumetric_divisor).billable_weight_g)
        .sum();

    let item_count = request
        .item_count
        .unwrap_or(request.packages.len() as u32);

    let mut options: Vec<RateQuote> = Vec::new();
    for tariff in tariffs.iter().filter(|t| t.applies_to_zone(zone.id_typed())) {
        let Some(carrier) = carriers.iter().find(|c| c.id_typed() == tariff.carrier_id()) else {
            tracing::warn!(tariff = %tariff.code(), "tariff references unknown carrier; skipping");
            continue;
        };

        let input = PricingInput {
            billable_weight_g,
            order_total: request.order_total,
            item_count,
            residential: request.residential,
            oversize: is_oversize(&request.packages, carrier),
        };

        match price(tariff, carrier, today, &input) {
            Ok(priced) => options.push(RateQuote {
                tariff_id: tariff.id_typed(),
                tariff_code: tariff.code().to_string(),
                carrier_id: carrier.id_typed(),
                carrier_name: carrier.name().to_string(),
                method: tariff.method().label(),
                cost: priced.cost,
                currency: tariff.currency().to_string(),
                free: priced.free,
                delivery: carrier.delivery(),
                zone_id: zone.id_typed(),
                zone_name: zone.name().to_string(),
            }),
            Err(reason) => {
                tracing::trace!(tariff = %tariff.code(), %reason, "tariff not eligible");
            }
        }
    }

    if options.is_empty() {
        return Err(QuoteError::NoRateAvailable);
    }

    options.sort_by(|a, b| a.cost.cmp(&b.cost).then_with(|| a.carrier_name.cmp(&b.carrier_name)));
    Ok(options)
}

fn is_oversize(packages: &[PackageInput], carrier: &Carrier) -> bool {
    let limits = carrier.limits();
    packages.iter().any(|p| {
        let over_dimension = limits
            .max_dimension_mm
            .map(|max| p.dimensions.longest_mm() > max)
            .unwrap_or(false);
        let over_girth = limits
            .max_girth_mm
            .map(|max| p.dimensions.girth_mm() > max as u64)
            .unwrap_or(false);
        over_dimension || over_girth
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::{PricingMethod, Surcharges, TariffDefinition, WeightTier};
    use shiplane_carriers::{CarrierCapabilities, CarrierDefinition, ServiceLimits};
    use shiplane_core::{AggregateId, TenantId};
    use shiplane_zones::{PostalPattern, ZoneDefinition};

    fn zone(tenant: TenantId) -> Zone {
        Zone::new(
            ZoneId::new(AggregateId::new()),
            tenant,
            ZoneDefinition {
                code: "fr".to_string(),
                name: "France".to_string(),
                countries: vec!["FR".to_string()],
                allowed: vec![],
                excluded: vec![
                    PostalPattern::parse("97*").unwrap(),
                    PostalPattern::parse("98*").unwrap(),
                ],
                priority: 10,
            },
        )
        .unwrap()
    }

    fn carrier(tenant: TenantId, name: &str) -> Carrier {
        Carrier::new(
            CarrierId::new(AggregateId::new()),
            tenant,
            CarrierDefinition {
                code: name.to_lowercase(),
                name: name.to_string(),
                capabilities: CarrierCapabilities::default(),
                limits: ServiceLimits { max_weight_g: Some(30_000), ..ServiceLimits::default() },
                delivery: DeliveryEstimate { min_days: 2, max_days: 4 },
            },
        )
        .unwrap()
    }

    fn flat_tariff(tenant: TenantId, carrier: &Carrier, code: &str, base: u64) -> Tariff {
        Tariff::new(
            TariffId::new(AggregateId::new()),
            tenant,
            TariffDefinition {
                code: code.to_string(),
                name: code.to_string(),
                carrier_id: carrier.id_typed(),
                zone_id: None,
                method: PricingMethod::Flat { base },
                currency: "EUR".to_string(),
                surcharges: Surcharges::default(),
                free_shipping_threshold: None,
                valid_from: None,
                valid_until: None,
            },
        )
        .unwrap()
    }

    fn request(postal: &str) -> QuoteRequest {
        QuoteRequest {
            country: "FR".to_string(),
            postal_code: postal.to_string(),
            residential: false,
            packages: vec![PackageInput {
                dimensions: Dimensions { length_mm: 200, width_mm: 150, height_mm: 100 },
                weight_g: 1_500,
                declared_value: 2_000,
            }],
            order_total: 2_000,
            currency: "EUR".to_string(),
            item_count: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn options_sort_by_cost_then_carrier_name() {
        let tenant = TenantId::new();
        let zones = vec![zone(tenant)];
        let a = carrier(tenant, "Beta");
        let b = carrier(tenant, "Alpha");
        let carriers = vec![a.clone(), b.clone()];
        let tariffs = vec![
            flat_tariff(tenant, &a, "beta-flat", 500),
            flat_tariff(tenant, &b, "alpha-flat", 500),
            flat_tariff(tenant, &a, "beta-cheap", 300),
        ];

        let quotes = quote(&zones, &carriers, &tariffs, today(), 5_000, &request("75001")).unwrap();
        let order: Vec<&str> = quotes.iter().map(|q| q.tariff_code.as_str()).collect();
        assert_eq!(order, ["beta-cheap", "alpha-flat", "beta-flat"]);
    }

    #[test]
    fn unserviceable_address_propagates() {
        let tenant = TenantId::new();
        let zones = vec![zone(tenant)];
        let c = carrier(tenant, "Alpha");
        let tariffs = vec![flat_tariff(tenant, &c, "flat", 500)];

        let err = quote(&zones, &[c], &tariffs, today(), 5_000, &request("97110")).unwrap_err();
        assert_eq!(err, QuoteError::AddressNotServiceable);
    }

    #[test]
    fn all_ineligible_is_no_rate_available() {
        let tenant = TenantId::new();
        let zones = vec![zone(tenant)];
        let mut c = carrier(tenant, "Alpha");
        let tariffs = vec![flat_tariff(tenant, &c, "flat", 500)];
        c.deactivate();

        let err = quote(&zones, &[c], &tariffs, today(), 5_000, &request("75001")).unwrap_err();
        assert_eq!(err, QuoteError::NoRateAvailable);
    }

    #[test]
    fn zone_scoped_tariff_for_other_zone_is_skipped() {
        let tenant = TenantId::new();
        let zones = vec![zone(tenant)];
        let c = carrier(tenant, "Alpha");
        let mut other_zone_tariff = flat_tariff(tenant, &c, "elsewhere", 100);
        let def = TariffDefinition {
            code: "elsewhere".to_string(),
            name: "elsewhere".to_string(),
            carrier_id: c.id_typed(),
            zone_id: Some(ZoneId::new(AggregateId::new())),
            method: PricingMethod::Flat { base: 100 },
            currency: "EUR".to_string(),
            surcharges: Surcharges::default(),
            free_shipping_threshold: None,
            valid_from: None,
            valid_until: None,
        };
        other_zone_tariff.update(def).unwrap();
        let tariffs = vec![other_zone_tariff, flat_tariff(tenant, &c, "anywhere", 400)];

        let quotes = quote(&zones, &[c], &tariffs, today(), 5_000, &request("75001")).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].tariff_code, "anywhere");
    }

    #[test]
    fn billable_weight_sums_across_packages() {
        let tenant = TenantId::new();
        let zones = vec![zone(tenant)];
        let c = carrier(tenant, "Alpha");
        let t = Tariff::new(
            TariffId::new(AggregateId::new()),
            tenant,
            TariffDefinition {
                code: "tiers".to_string(),
                name: "tiers".to_string(),
                carrier_id: c.id_typed(),
                zone_id: None,
                method: PricingMethod::PerWeight {
                    base: 0,
                    per_kg: 0,
                    tiers: vec![
                        WeightTier { ceiling_g: 1_000, rate: 495 },
                        WeightTier { ceiling_g: 3_000, rate: 695 },
                    ],
                },
                currency: "EUR".to_string(),
                surcharges: Surcharges::default(),
                free_shipping_threshold: None,
                valid_from: None,
                valid_until: None,
            },
        )
        .unwrap();

        let mut req = request("75001");
        // Two 0.8 kg packages: 1.6 kg combined → second tier.
        req.packages = vec![
            PackageInput { dimensions: Dimensions::default(), weight_g: 800, declared_value: 0 },
            PackageInput { dimensions: Dimensions::default(), weight_g: 800, declared_value: 0 },
        ];

        let quotes = quote(&zones, &[c], &[t], today(), 5_000, &req).unwrap();
        assert_eq!(quotes[0].cost, 695);
    }
}
