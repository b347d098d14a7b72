//! Rating domain module: tariffs, billable weight, pricing, quoting.
//!
//! Everything in this crate is pure computation over immutable inputs:
//! the quote path can be fanned out across tariffs freely. No IO, no HTTP,
//! no storage.

pub mod billable;
pub mod pricer;
pub mod quote;
pub mod tariff;

pub use billable::{compute as compute_billable, DerivedWeight, Dimensions, DEFAULT_VOLUMETRIC_DIVISOR};
pub use pricer::{price, Ineligible, Priced, PricingInput};
pub use quote::{quote, PackageInput, QuoteError, QuoteRequest, RateQuote};
pub use tariff::{
    PriceBracket, PricingMethod, Surcharges, Tariff, TariffDefinition, TariffId, WeightTier,
};
