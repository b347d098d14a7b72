//! `shiplane-infra` — collaborator implementations.
//!
//! This crate hosts the reference implementations of the external
//! collaborators the domain core is written against: a tenant-isolated
//! store, the catalog repositories with their referential guards, the
//! lifecycle executor that serializes aggregate mutations behind an
//! optimistic version check, and the carrier-integration gateway seam.

pub mod catalog;
pub mod gateway;
pub mod lifecycle;
pub mod store;

pub use catalog::Catalog;
pub use gateway::{CarrierGateway, GatewayError, LabelResponse, MockCarrierGateway};
pub use lifecycle::LifecycleStore;
pub use store::{InMemoryTenantStore, TenantStore};
