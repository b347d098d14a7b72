//! Carrier-integration gateway: the only seam that talks to carrier networks.
//!
//! Invoked synchronously at label-generation boundaries; failures surface to
//! the caller as typed errors and are never retried here.

use thiserror::Error;
use uuid::Uuid;

use shiplane_core::TenantId;
use shiplane_returns::Return;
use shiplane_shipments::Shipment;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The carrier endpoint could not be reached.
    #[error("carrier integration unavailable: {0}")]
    Unavailable(String),

    /// The carrier refused the request (bad account, unsupported service...).
    #[error("carrier rejected the request: {0}")]
    Rejected(String),
}

/// Label issuance response from the carrier network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelResponse {
    pub master_tracking_number: String,
    /// One tracking number per package, in package order.
    pub package_tracking_numbers: Vec<String>,
}

/// Carrier network adapter.
pub trait CarrierGateway: Send + Sync {
    /// Request an outbound label set for a shipment.
    fn create_label(&self, tenant_id: TenantId, shipment: &Shipment)
        -> Result<LabelResponse, GatewayError>;

    /// Request a return label; returns its tracking number.
    fn create_return_label(&self, tenant_id: TenantId, rma: &Return)
        -> Result<String, GatewayError>;
}

/// Deterministic-enough stand-in for a real carrier network (dev/test).
#[derive(Debug, Default)]
pub struct MockCarrierGateway;

impl MockCarrierGateway {
    pub fn new() -> Self {
        Self
    }

    fn tracking_number(prefix: &str) -> String {
        let hex = Uuid::now_v7().simple().to_string().to_ascii_uppercase();
        format!("{prefix}{}", &hex[..12])
    }
}

impl CarrierGateway for MockCarrierGateway {
    fn create_label(
        &self,
        tenant_id: TenantId,
        shipment: &Shipment,
    ) -> Result<LabelResponse, GatewayError> {
        tracing::debug!(%tenant_id, shipment = %shipment.shipment_number(), "issuing mock label");
        Ok(LabelResponse {
            master_tracking_number: Self::tracking_number("SL"),
            package_tracking_numbers: shipment
                .packages()
                .iter()
                .map(|_| Self::tracking_number("SL"))
                .collect(),
        })
    }

    fn create_return_label(
        &self,
        tenant_id: TenantId,
        rma: &Return,
    ) -> Result<String, GatewayError> {
        tracing::debug!(%tenant_id, rma = %rma.return_number(), "issuing mock return label");
        Ok(Self::tracking_number("SLR"))
    }
}
