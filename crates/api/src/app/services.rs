use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use chrono::Utc;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use shiplane_core::{AggregateId, DomainError, ExpectedVersion, TenantId};
use shiplane_infra::{Catalog, CarrierGateway, GatewayError, LifecycleStore, MockCarrierGateway};
use shiplane_rates::{
    quote as run_quote, QuoteError, QuoteRequest, RateQuote, DEFAULT_VOLUMETRIC_DIVISOR,
};
use shiplane_returns::{
    ApproveReturn, InspectReturn, ItemCondition, MarkReturnInTransit, ProcessRefund,
    ReceiveReturn, RefundMethod, RejectReturn, RequestReturn, Return, ReturnCommand, ReturnEvent,
    ReturnId, ReturnItem, SendReturnLabel,
};
use shiplane_shipments::{
    Address, CancelShipment, CostBreakdown, CreateShipment, GenerateLabel, MarkDelivered,
    MarkPickedUp, PackageDraft, RecordTrackingScan, Shipment, ShipmentCommand, ShipmentEvent,
    ShipmentId, ShipmentStatus,
};

use shiplane_carriers::CarrierId;

/// Operation failure: a domain rejection or a carrier-gateway fault.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Realtime message broadcasted via SSE (tenant-filtered in handlers).
#[derive(Debug, Clone, serde::Serialize)]
pub struct RealtimeMessage {
    pub tenant_id: TenantId,
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Service wiring: catalog + lifecycle stores + carrier gateway + realtime.
pub struct AppServices {
    catalog: Catalog,
    shipments: LifecycleStore<Shipment>,
    returns: LifecycleStore<Return>,
    gateway: Arc<dyn CarrierGateway>,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl Default for AppServices {
    fn default() -> Self {
        Self::new()
    }
}

impl AppServices {
    pub fn new() -> Self {
        Self::with_gateway(Arc::new(MockCarrierGateway::new()))
    }

    pub fn with_gateway(gateway: Arc<dyn CarrierGateway>) -> Self {
        // Realtime channel (SSE): lossy broadcast, tenant-filtered in handlers.
        let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);
        Self {
            catalog: Catalog::new(),
            shipments: LifecycleStore::new(),
            returns: LifecycleStore::new(),
            gateway,
            realtime_tx,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }

    // -------------------------
    // Quoting
    // -------------------------

    pub fn quote(
        &self,
        tenant_id: TenantId,
        request: &QuoteRequest,
    ) -> Result<Vec<RateQuote>, QuoteError> {
        let zones = self.catalog.list_zones(tenant_id);
        let carriers = self.catalog.list_carriers(tenant_id);
        let tariffs = self.catalog.list_tariffs(tenant_id);
        let today = Utc::now().date_naive();

        run_quote(
            &zones,
            &carriers,
            &tariffs,
            today,
            DEFAULT_VOLUMETRIC_DIVISOR,
            request,
        )
    }

    // -------------------------
    // Shipments
    // -------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn create_shipment(
        &self,
        tenant_id: TenantId,
        carrier_id: CarrierId,
        tariff_code: String,
        method: String,
        origin: Address,
        destination: Address,
        pickup_point: Option<String>,
        packages: Vec<PackageDraft>,
        cost: CostBreakdown,
    ) -> Result<Shipment, DomainError> {
        let carrier = self
            .catalog
            .get_carrier(tenant_id, carrier_id)
            .map_err(|_| DomainError::validation("shipment references an unknown carrier"))?;
        if !carrier.is_active() {
            return Err(DomainError::validation("carrier is inactive"));
        }

        let shipment_id = ShipmentId::new(AggregateId::new());
        let cmd = ShipmentCommand::CreateShipment(CreateShipment {
            tenant_id,
            shipment_id,
            shipment_number: next_number("SHP"),
            carrier_id,
            tariff_code,
            method,
            origin,
            destination,
            pickup_point,
            packages,
            cost,
            occurred_at: Utc::now(),
        });

        let (shipment, events) = self.shipments.execute(
            tenant_id,
            shipment_id,
            &cmd,
            Shipment::empty,
            ExpectedVersion::Any,
        )?;
        self.publish_shipment_events(tenant_id, &shipment, &events);
        Ok(shipment)
    }

    pub fn generate_label(
        &self,
        tenant_id: TenantId,
        shipment_id: ShipmentId,
    ) -> Result<Shipment, ServiceError> {
        let shipment = self
            .shipments
            .get(tenant_id, &shipment_id)
            .ok_or(DomainError::NotFound)?;

        // Guard before paying for a gateway round-trip; the aggregate
        // re-checks under the version lock.
        if shipment.status() != ShipmentStatus::Pending {
            return Err(DomainError::invalid_transition(
                shipment.status().as_str(),
                ShipmentStatus::LabelCreated.as_str(),
            )
            .into());
        }

        let label = self.gateway.create_label(tenant_id, &shipment)?;

        let cmd = ShipmentCommand::GenerateLabel(GenerateLabel {
            tenant_id,
            shipment_id,
            master_tracking_number: label.master_tracking_number,
            package_tracking_numbers: label.package_tracking_numbers,
            occurred_at: Utc::now(),
        });

        let (shipment, events) = self.shipments.execute(
            tenant_id,
            shipment_id,
            &cmd,
            Shipment::empty,
            ExpectedVersion::Any,
        )?;
        self.publish_shipment_events(tenant_id, &shipment, &events);
        Ok(shipment)
    }

    pub fn record_tracking_scan(
        &self,
        tenant_id: TenantId,
        shipment_id: ShipmentId,
        status: ShipmentStatus,
        description: String,
        location: Option<String>,
        occurred_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<Shipment, DomainError> {
        let cmd = ShipmentCommand::RecordTrackingScan(RecordTrackingScan {
            tenant_id,
            shipment_id,
            status,
            description,
            location,
            occurred_at: occurred_at.unwrap_or_else(Utc::now),
        });
        self.execute_shipment(tenant_id, shipment_id, &cmd)
    }

    pub fn mark_picked_up(
        &self,
        tenant_id: TenantId,
        shipment_id: ShipmentId,
        location: Option<String>,
    ) -> Result<Shipment, DomainError> {
        let cmd = ShipmentCommand::MarkPickedUp(MarkPickedUp {
            tenant_id,
            shipment_id,
            location,
            occurred_at: Utc::now(),
        });
        self.execute_shipment(tenant_id, shipment_id, &cmd)
    }

    pub fn mark_delivered(
        &self,
        tenant_id: TenantId,
        shipment_id: ShipmentId,
        location: Option<String>,
    ) -> Result<Shipment, DomainError> {
        let cmd = ShipmentCommand::MarkDelivered(MarkDelivered {
            tenant_id,
            shipment_id,
            location,
            occurred_at: Utc::now(),
        });
        self.execute_shipment(tenant_id, shipment_id, &cmd)
    }

    pub fn cancel_shipment(
        &self,
        tenant_id: TenantId,
        shipment_id: ShipmentId,
        reason: String,
    ) -> Result<Shipment, DomainError> {
        let cmd = ShipmentCommand::CancelShipment(CancelShipment {
            tenant_id,
            shipment_id,
            reason,
            occurred_at: Utc::now(),
        });
        self.execute_shipment(tenant_id, shipment_id, &cmd)
    }

    fn execute_shipment(
        &self,
        tenant_id: TenantId,
        shipment_id: ShipmentId,
        cmd: &ShipmentCommand,
    ) -> Result<Shipment, DomainError> {
        let (shipment, events) = self.shipments.execute(
            tenant_id,
            shipment_id,
            cmd,
            Shipment::empty,
            ExpectedVersion::Any,
        )?;
        self.publish_shipment_events(tenant_id, &shipment, &events);
        Ok(shipment)
    }

    pub fn get_shipment(&self, tenant_id: TenantId, id: ShipmentId) -> Option<Shipment> {
        self.shipments.get(tenant_id, &id)
    }

    pub fn find_shipment_by_number(&self, tenant_id: TenantId, number: &str) -> Option<Shipment> {
        self.shipments.find(tenant_id, |s| s.shipment_number() == number)
    }

    pub fn find_shipment_by_tracking(
        &self,
        tenant_id: TenantId,
        tracking: &str,
    ) -> Option<Shipment> {
        self.shipments.find(tenant_id, |s| {
            s.master_tracking_number() == Some(tracking)
                || s.packages()
                    .iter()
                    .any(|p| p.tracking_number.as_deref() == Some(tracking))
        })
    }

    pub fn list_shipments(&self, tenant_id: TenantId) -> Vec<Shipment> {
        let mut shipments = self.shipments.list(tenant_id);
        shipments.sort_by_key(|s| s.shipment_number().to_string());
        shipments
    }

    // -------------------------
    // Returns
    // -------------------------

    pub fn create_return(
        &self,
        tenant_id: TenantId,
        shipment_id: ShipmentId,
        order_ref: Option<String>,
        items: Vec<ReturnItem>,
    ) -> Result<Return, DomainError> {
        let shipment = self
            .shipments
            .get(tenant_id, &shipment_id)
            .ok_or(DomainError::NotFound)?;

        // A return starts from a completed delivery; this is a validation
        // error (fix the request), not a state error on the return itself.
        if shipment.status() != ShipmentStatus::Delivered {
            return Err(DomainError::validation(format!(
                "returns require a delivered shipment (status is '{}')",
                shipment.status()
            )));
        }

        let return_id = ReturnId::new(AggregateId::new());
        let cmd = ReturnCommand::RequestReturn(RequestReturn {
            tenant_id,
            return_id,
            return_number: next_number("RMA"),
            shipment_id,
            order_ref,
            items,
            occurred_at: Utc::now(),
        });
        self.execute_return(tenant_id, return_id, &cmd)
    }

    pub fn approve_return(&self, tenant_id: TenantId, return_id: ReturnId) -> Result<Return, DomainError> {
        let cmd = ReturnCommand::ApproveReturn(ApproveReturn {
            tenant_id,
            return_id,
            occurred_at: Utc::now(),
        });
        self.execute_return(tenant_id, return_id, &cmd)
    }

    pub fn reject_return(
        &self,
        tenant_id: TenantId,
        return_id: ReturnId,
        reason: String,
    ) -> Result<Return, DomainError> {
        let cmd = ReturnCommand::RejectReturn(RejectReturn {
            tenant_id,
            return_id,
            reason,
            occurred_at: Utc::now(),
        });
        self.execute_return(tenant_id, return_id, &cmd)
    }

    pub fn send_return_label(
        &self,
        tenant_id: TenantId,
        return_id: ReturnId,
    ) -> Result<Return, ServiceError> {
        let rma = self
            .returns
            .get(tenant_id, &return_id)
            .ok_or(DomainError::NotFound)?;

        let tracking_number = self.gateway.create_return_label(tenant_id, &rma)?;

        let cmd = ReturnCommand::SendReturnLabel(SendReturnLabel {
            tenant_id,
            return_id,
            tracking_number,
            occurred_at: Utc::now(),
        });
        Ok(self.execute_return(tenant_id, return_id, &cmd)?)
    }

    pub fn mark_return_in_transit(
        &self,
        tenant_id: TenantId,
        return_id: ReturnId,
    ) -> Result<Return, DomainError> {
        let cmd = ReturnCommand::MarkReturnInTransit(MarkReturnInTransit {
            tenant_id,
            return_id,
            occurred_at: Utc::now(),
        });
        self.execute_return(tenant_id, return_id, &cmd)
    }

    pub fn receive_return(
        &self,
        tenant_id: TenantId,
        return_id: ReturnId,
        condition: ItemCondition,
        notes: Option<String>,
    ) -> Result<Return, DomainError> {
        let cmd = ReturnCommand::ReceiveReturn(ReceiveReturn {
            tenant_id,
            return_id,
            condition,
            notes,
            occurred_at: Utc::now(),
        });
        self.execute_return(tenant_id, return_id, &cmd)
    }

    pub fn inspect_return(
        &self,
        tenant_id: TenantId,
        return_id: ReturnId,
        condition: ItemCondition,
        notes: Option<String>,
    ) -> Result<Return, DomainError> {
        let cmd = ReturnCommand::InspectReturn(InspectReturn {
            tenant_id,
            return_id,
            condition,
            notes,
            occurred_at: Utc::now(),
        });
        self.execute_return(tenant_id, return_id, &cmd)
    }

    pub fn process_refund(
        &self,
        tenant_id: TenantId,
        return_id: ReturnId,
        amount: u64,
        method: RefundMethod,
        restocking_fee: u64,
    ) -> Result<Return, DomainError> {
        let cmd = ReturnCommand::ProcessRefund(ProcessRefund {
            tenant_id,
            return_id,
            amount,
            method,
            restocking_fee,
            occurred_at: Utc::now(),
        });
        self.execute_return(tenant_id, return_id, &cmd)
    }

    fn execute_return(
        &self,
        tenant_id: TenantId,
        return_id: ReturnId,
        cmd: &ReturnCommand,
    ) -> Result<Return, DomainError> {
        let (rma, events) =
            self.returns
                .execute(tenant_id, return_id, cmd, Return::empty, ExpectedVersion::Any)?;
        self.publish_return_events(tenant_id, &rma, &events);
        Ok(rma)
    }

    pub fn get_return(&self, tenant_id: TenantId, id: ReturnId) -> Option<Return> {
        self.returns.get(tenant_id, &id)
    }

    pub fn find_return_by_number(&self, tenant_id: TenantId, number: &str) -> Option<Return> {
        self.returns.find(tenant_id, |r| r.return_number() == number)
    }

    pub fn list_returns(&self, tenant_id: TenantId) -> Vec<Return> {
        let mut returns = self.returns.list(tenant_id);
        returns.sort_by_key(|r| r.return_number().to_string());
        returns
    }

    // -------------------------
    // Realtime
    // -------------------------

    fn publish_shipment_events(
        &self,
        tenant_id: TenantId,
        shipment: &Shipment,
        events: &[ShipmentEvent],
    ) {
        for event in events {
            // Broadcast is lossy; no backpressure on the command path.
            let _ = self.realtime_tx.send(RealtimeMessage {
                tenant_id,
                topic: event.event_type().to_string(),
                payload: serde_json::json!({
                    "shipment_id": shipment.id_typed().to_string(),
                    "shipment_number": shipment.shipment_number(),
                    "status": shipment.status(),
                    "occurred_at": event.occurred_at(),
                }),
            });
        }
    }

    fn publish_return_events(&self, tenant_id: TenantId, rma: &Return, events: &[ReturnEvent]) {
        for event in events {
            let _ = self.realtime_tx.send(RealtimeMessage {
                tenant_id,
                topic: event.event_type().to_string(),
                payload: serde_json::json!({
                    "return_id": rma.id_typed().to_string(),
                    "return_number": rma.return_number(),
                    "status": rma.status(),
                    "occurred_at": event.occurred_at(),
                }),
            });
        }
    }
}

/// Human-facing record numbers, e.g. `SHP-018F4D2A`.
fn next_number(prefix: &str) -> String {
    let hex = uuid::Uuid::now_v7().simple().to_string().to_ascii_uppercase();
    format!("{prefix}-{}", &hex[..8])
}

/// Build an SSE stream for a tenant (used by `/stream`).
pub fn tenant_sse_stream(
    services: Arc<AppServices>,
    tenant_id: TenantId,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m) if m.tenant_id == tenant_id => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
