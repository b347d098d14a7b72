//! Return-merchandise aggregate root.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shiplane_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use shiplane_shipments::ShipmentId;

use crate::status::ReturnStatus;

/// Return identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnId(pub AggregateId);

impl ReturnId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ReturnId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One returned item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub description: String,
    pub quantity: u32,
}

/// Physical condition recorded at receipt/inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    Resellable,
    Opened,
    Damaged,
    Unusable,
}

/// Inspection verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionOutcome {
    pub condition: ItemCondition,
    #[serde(default)]
    pub notes: Option<String>,
}

/// How the refund is paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundMethod {
    OriginalPayment,
    StoreCredit,
    BankTransfer,
}

/// Refund ledger facts. `amount` is the gross amount; the net payout
/// (`amount − restocking_fee`) is computed by the ledger collaborator,
/// never silently adjusted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundBreakdown {
    /// Gross refund, smallest currency unit.
    pub amount: u64,
    pub method: RefundMethod,
    /// Restocking fee, smallest currency unit.
    pub restocking_fee: u64,
}

/// Aggregate root: Return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Return {
    id: ReturnId,
    tenant_id: Option<TenantId>,
    return_number: String,
    shipment_id: Option<ShipmentId>,
    order_ref: Option<String>,
    status: ReturnStatus,
    items: Vec<ReturnItem>,
    label_tracking_number: Option<String>,
    received_condition: Option<ItemCondition>,
    received_notes: Option<String>,
    inspection: Option<InspectionOutcome>,
    refund: Option<RefundBreakdown>,
    version: u64,
    created: bool,
}

impl Return {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ReturnId) -> Self {
        Self {
            id,
            tenant_id: None,
            return_number: String::new(),
            shipment_id: None,
            order_ref: None,
            status: ReturnStatus::Requested,
            items: Vec::new(),
            label_tracking_number: None,
            received_condition: None,
            received_notes: None,
            inspection: None,
            refund: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ReturnId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn return_number(&self) -> &str {
        &self.return_number
    }

    pub fn shipment_id(&self) -> Option<ShipmentId> {
        self.shipment_id
    }

    pub fn order_ref(&self) -> Option<&str> {
        self.order_ref.as_deref()
    }

    pub fn status(&self) -> ReturnStatus {
        self.status
    }

    pub fn items(&self) -> &[ReturnItem] {
        &self.items
    }

    pub fn label_tracking_number(&self) -> Option<&str> {
        self.label_tracking_number.as_deref()
    }

    pub fn inspection(&self) -> Option<&InspectionOutcome> {
        self.inspection.as_ref()
    }

    pub fn refund(&self) -> Option<&RefundBreakdown> {
        self.refund.as_ref()
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for Return {
    type Id = ReturnId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RequestReturn.
///
/// The caller (service layer) must verify the referenced shipment is
/// `Delivered` before dispatching; that check is a cross-aggregate read and
/// therefore lives outside this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestReturn {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub return_number: String,
    pub shipment_id: ShipmentId,
    pub order_ref: Option<String>,
    pub items: Vec<ReturnItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApproveReturn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveReturn {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RejectReturn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectReturn {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SendReturnLabel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReturnLabel {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub tracking_number: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkReturnInTransit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReturnInTransit {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReceiveReturn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveReturn {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub condition: ItemCondition,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: InspectReturn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectReturn {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub condition: ItemCondition,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ProcessRefund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRefund {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub amount: u64,
    pub method: RefundMethod,
    pub restocking_fee: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnCommand {
    RequestReturn(RequestReturn),
    ApproveReturn(ApproveReturn),
    RejectReturn(RejectReturn),
    SendReturnLabel(SendReturnLabel),
    MarkReturnInTransit(MarkReturnInTransit),
    ReceiveReturn(ReceiveReturn),
    InspectReturn(InspectReturn),
    ProcessRefund(ProcessRefund),
}

/// Event: ReturnRequested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequested {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub return_number: String,
    pub shipment_id: ShipmentId,
    pub order_ref: Option<String>,
    pub items: Vec<ReturnItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReturnApproved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnApproved {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReturnRejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRejected {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReturnLabelSent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLabelSent {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub tracking_number: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReturnInTransit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnInTransit {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReturnReceived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnReceived {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub condition: ItemCondition,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReturnInspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnInspected {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub condition: ItemCondition,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RefundProcessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundProcessed {
    pub tenant_id: TenantId,
    pub return_id: ReturnId,
    pub amount: u64,
    pub method: RefundMethod,
    pub restocking_fee: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnEvent {
    ReturnRequested(ReturnRequested),
    ReturnApproved(ReturnApproved),
    ReturnRejected(ReturnRejected),
    ReturnLabelSent(ReturnLabelSent),
    ReturnInTransit(ReturnInTransit),
    ReturnReceived(ReturnReceived),
    ReturnInspected(ReturnInspected),
    RefundProcessed(RefundProcessed),
}

impl ReturnEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ReturnRequested(_) => "returns.return.requested",
            Self::ReturnApproved(_) => "returns.return.approved",
            Self::ReturnRejected(_) => "returns.return.rejected",
            Self::ReturnLabelSent(_) => "returns.return.label_sent",
            Self::ReturnInTransit(_) => "returns.return.in_transit",
            Self::ReturnReceived(_) => "returns.return.received",
            Self::ReturnInspected(_) => "returns.return.inspected",
            Self::RefundProcessed(_) => "returns.return.refund_processed",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::ReturnRequested(e) => e.occurred_at,
            Self::ReturnApproved(e) => e.occurred_at,
            Self::ReturnRejected(e) => e.occurred_at,
            Self::ReturnLabelSent(e) => e.occurred_at,
            Self::ReturnInTransit(e) => e.occurred_at,
            Self::ReturnReceived(e) => e.occurred_at,
            Self::ReturnInspected(e) => e.occurred_at,
            Self::RefundProcessed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Return {
    type Command = ReturnCommand;
    type Event = ReturnEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ReturnEvent::ReturnRequested(e) => {
                self.id = e.return_id;
                self.tenant_id = Some(e.tenant_id);
                self.return_number = e.return_number.clone();
                self.shipment_id = Some(e.shipment_id);
                self.order_ref = e.order_ref.clone();
                self.status = ReturnStatus::Requested;
                self.items = e.items.clone();
                self.created = true;
            }
            ReturnEvent::ReturnApproved(_) => {
                self.status = ReturnStatus::Approved;
            }
            ReturnEvent::ReturnRejected(_) => {
                self.status = ReturnStatus::Rejected;
            }
            ReturnEvent::ReturnLabelSent(e) => {
                self.status = ReturnStatus::LabelSent;
                self.label_tracking_number = Some(e.tracking_number.clone());
            }
            ReturnEvent::ReturnInTransit(_) => {
                self.status = ReturnStatus::InTransit;
            }
            ReturnEvent::ReturnReceived(e) => {
                self.status = ReturnStatus::Received;
                self.received_condition = Some(e.condition);
                self.received_notes = e.notes.clone();
            }
            ReturnEvent::ReturnInspected(e) => {
                self.status = ReturnStatus::Inspected;
                self.inspection = Some(InspectionOutcome {
                    condition: e.condition,
                    notes: e.notes.clone(),
                });
            }
            ReturnEvent::RefundProcessed(e) => {
                self.status = ReturnStatus::Refunded;
                self.refund = Some(RefundBreakdown {
                    amount: e.amount,
                    method: e.method,
                    restocking_fee: e.restocking_fee,
                });
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ReturnCommand::RequestReturn(cmd) => self.handle_request(cmd),
            ReturnCommand::ApproveReturn(cmd) => self.handle_approve(cmd),
            ReturnCommand::RejectReturn(cmd) => self.handle_reject(cmd),
            ReturnCommand::SendReturnLabel(cmd) => self.handle_send_label(cmd),
            ReturnCommand::MarkReturnInTransit(cmd) => self.handle_mark_in_transit(cmd),
            ReturnCommand::ReceiveReturn(cmd) => self.handle_receive(cmd),
            ReturnCommand::InspectReturn(cmd) => self.handle_inspect(cmd),
            ReturnCommand::ProcessRefund(cmd) => self.handle_refund(cmd),
        }
    }
}

impl Return {
    fn ensure_exists(&self, tenant_id: TenantId, return_id: ReturnId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        if self.id != return_id {
            return Err(DomainError::invariant("return_id mismatch"));
        }
        Ok(())
    }

    fn ensure_transition(&self, target: ReturnStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::invalid_transition(
                self.status.as_str(),
                target.as_str(),
            ));
        }
        Ok(())
    }

    fn handle_request(&self, cmd: &RequestReturn) -> Result<Vec<ReturnEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("return already exists"));
        }
        if cmd.return_number.trim().is_empty() {
            return Err(DomainError::validation("return_number is required"));
        }
        if cmd.items.is_empty() {
            return Err(DomainError::validation("return requires at least one item"));
        }
        for item in &cmd.items {
            if item.description.trim().is_empty() {
                return Err(DomainError::validation("return item description is required"));
            }
            if item.quantity == 0 {
                return Err(DomainError::validation("return item quantity must be positive"));
            }
        }

        Ok(vec![ReturnEvent::ReturnRequested(ReturnRequested {
            tenant_id: cmd.tenant_id,
            return_id: cmd.return_id,
            return_number: cmd.return_number.clone(),
            shipment_id: cmd.shipment_id,
            order_ref: cmd.order_ref.clone(),
            items: cmd.items.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_approve(&self, cmd: &ApproveReturn) -> Result<Vec<ReturnEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.return_id)?;
        self.ensure_transition(ReturnStatus::Approved)?;

        Ok(vec![ReturnEvent::ReturnApproved(ReturnApproved {
            tenant_id: cmd.tenant_id,
            return_id: cmd.return_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reject(&self, cmd: &RejectReturn) -> Result<Vec<ReturnEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.return_id)?;
        self.ensure_transition(ReturnStatus::Rejected)?;

        Ok(vec![ReturnEvent::ReturnRejected(ReturnRejected {
            tenant_id: cmd.tenant_id,
            return_id: cmd.return_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_send_label(&self, cmd: &SendReturnLabel) -> Result<Vec<ReturnEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.return_id)?;
        self.ensure_transition(ReturnStatus::LabelSent)?;

        if cmd.tracking_number.trim().is_empty() {
            return Err(DomainError::validation("tracking number is required"));
        }

        Ok(vec![ReturnEvent::ReturnLabelSent(ReturnLabelSent {
            tenant_id: cmd.tenant_id,
            return_id: cmd.return_id,
            tracking_number: cmd.tracking_number.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_in_transit(
        &self,
        cmd: &MarkReturnInTransit,
    ) -> Result<Vec<ReturnEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.return_id)?;
        self.ensure_transition(ReturnStatus::InTransit)?;

        Ok(vec![ReturnEvent::ReturnInTransit(ReturnInTransit {
            tenant_id: cmd.tenant_id,
            return_id: cmd.return_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_receive(&self, cmd: &ReceiveReturn) -> Result<Vec<ReturnEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.return_id)?;
        self.ensure_transition(ReturnStatus::Received)?;

        Ok(vec![ReturnEvent::ReturnReceived(ReturnReceived {
            tenant_id: cmd.tenant_id,
            return_id: cmd.return_id,
            condition: cmd.condition,
            notes: cmd.notes.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_inspect(&self, cmd: &InspectReturn) -> Result<Vec<ReturnEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.return_id)?;
        self.ensure_transition(ReturnStatus::Inspected)?;

        Ok(vec![ReturnEvent::ReturnInspected(ReturnInspected {
            tenant_id: cmd.tenant_id,
            return_id: cmd.return_id,
            condition: cmd.condition,
            notes: cmd.notes.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_refund(&self, cmd: &ProcessRefund) -> Result<Vec<ReturnEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.return_id)?;

        // Idempotency guard first: a repeat refund is its own failure mode,
        // not a generic transition error.
        if self.status == ReturnStatus::Refunded {
            return Err(DomainError::AlreadyRefunded);
        }
        self.ensure_transition(ReturnStatus::Refunded)?;

        if cmd.restocking_fee > cmd.amount {
            return Err(DomainError::validation(
                "restocking fee exceeds the refund amount",
            ));
        }

        Ok(vec![ReturnEvent::RefundProcessed(RefundProcessed {
            tenant_id: cmd.tenant_id,
            return_id: cmd.return_id,
            amount: cmd.amount,
            method: cmd.method,
            restocking_fee: cmd.restocking_fee,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_return_id() -> ReturnId {
        ReturnId::new(AggregateId::new())
    }

    fn test_shipment_id() -> ShipmentId {
        ShipmentId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn request_cmd(tenant_id: TenantId, return_id: ReturnId) -> RequestReturn {
        RequestReturn {
            tenant_id,
            return_id,
            return_number: "RMA-0001".to_string(),
            shipment_id: test_shipment_id(),
            order_ref: Some("SO-42".to_string()),
            items: vec![ReturnItem { description: "book".to_string(), quantity: 1 }],
            occurred_at: test_time(),
        }
    }

    /// Drive a return into an arbitrary state by applying events directly.
    fn return_in(status: ReturnStatus) -> (Return, TenantId, ReturnId) {
        let tenant_id = test_tenant_id();
        let return_id = test_return_id();

        let mut rma = Return::empty(return_id);
        let events = rma
            .handle(&ReturnCommand::RequestReturn(request_cmd(tenant_id, return_id)))
            .unwrap();
        rma.apply(&events[0]);

        let at = test_time();
        let sequence: Vec<ReturnEvent> = match status {
            ReturnStatus::Requested => vec![],
            ReturnStatus::Rejected => vec![ReturnEvent::ReturnRejected(ReturnRejected {
                tenant_id,
                return_id,
                reason: "test".to_string(),
                occurred_at: at,
            })],
            _ => vec![
                ReturnEvent::ReturnApproved(ReturnApproved { tenant_id, return_id, occurred_at: at }),
                ReturnEvent::ReturnLabelSent(ReturnLabelSent {
                    tenant_id,
                    return_id,
                    tracking_number: "SLRET123456789".to_string(),
                    occurred_at: at,
                }),
                ReturnEvent::ReturnInTransit(ReturnInTransit { tenant_id, return_id, occurred_at: at }),
                ReturnEvent::ReturnReceived(ReturnReceived {
                    tenant_id,
                    return_id,
                    condition: ItemCondition::Resellable,
                    notes: None,
                    occurred_at: at,
                }),
                ReturnEvent::ReturnInspected(ReturnInspected {
                    tenant_id,
                    return_id,
                    condition: ItemCondition::Resellable,
                    notes: None,
                    occurred_at: at,
                }),
                ReturnEvent::RefundProcessed(RefundProcessed {
                    tenant_id,
                    return_id,
                    amount: 2_000,
                    method: RefundMethod::OriginalPayment,
                    restocking_fee: 0,
                    occurred_at: at,
                }),
            ],
        };

        let steps = match status {
            ReturnStatus::Requested | ReturnStatus::Rejected => sequence.len(),
            ReturnStatus::Approved => 1,
            ReturnStatus::LabelSent => 2,
            ReturnStatus::InTransit => 3,
            ReturnStatus::Received => 4,
            ReturnStatus::Inspected => 5,
            ReturnStatus::Refunded => 6,
        };
        for event in &sequence[..steps] {
            rma.apply(event);
        }

        assert_eq!(rma.status(), status);
        (rma, tenant_id, return_id)
    }

    fn command_for(
        target: ReturnStatus,
        tenant_id: TenantId,
        return_id: ReturnId,
    ) -> ReturnCommand {
        let at = test_time();
        match target {
            ReturnStatus::Requested => unreachable!("requested is only an initial state"),
            ReturnStatus::Approved => {
                ReturnCommand::ApproveReturn(ApproveReturn { tenant_id, return_id, occurred_at: at })
            }
            ReturnStatus::Rejected => ReturnCommand::RejectReturn(RejectReturn {
                tenant_id,
                return_id,
                reason: "damaged in use".to_string(),
                occurred_at: at,
            }),
            ReturnStatus::LabelSent => ReturnCommand::SendReturnLabel(SendReturnLabel {
                tenant_id,
                return_id,
                tracking_number: "SLRET123456789".to_string(),
                occurred_at: at,
            }),
            ReturnStatus::InTransit => ReturnCommand::MarkReturnInTransit(MarkReturnInTransit {
                tenant_id,
                return_id,
                occurred_at: at,
            }),
            ReturnStatus::Received => ReturnCommand::ReceiveReturn(ReceiveReturn {
                tenant_id,
                return_id,
                condition: ItemCondition::Opened,
                notes: None,
                occurred_at: at,
            }),
            ReturnStatus::Inspected => ReturnCommand::InspectReturn(InspectReturn {
                tenant_id,
                return_id,
                condition: ItemCondition::Resellable,
                notes: Some("like new".to_string()),
                occurred_at: at,
            }),
            ReturnStatus::Refunded => ReturnCommand::ProcessRefund(ProcessRefund {
                tenant_id,
                return_id,
                amount: 2_000,
                method: RefundMethod::OriginalPayment,
                restocking_fee: 200,
                occurred_at: at,
            }),
        }
    }

    #[test]
    fn request_validates_items() {
        let tenant_id = test_tenant_id();
        let return_id = test_return_id();
        let rma = Return::empty(return_id);

        let mut cmd = request_cmd(tenant_id, return_id);
        cmd.items.clear();
        assert!(matches!(
            rma.handle(&ReturnCommand::RequestReturn(cmd)).unwrap_err(),
            DomainError::Validation(_)
        ));

        let mut cmd = request_cmd(tenant_id, return_id);
        cmd.items[0].quantity = 0;
        assert!(matches!(
            rma.handle(&ReturnCommand::RequestReturn(cmd)).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn full_lifecycle_to_refund() {
        let tenant_id = test_tenant_id();
        let return_id = test_return_id();
        let mut rma = Return::empty(return_id);

        let events = rma
            .handle(&ReturnCommand::RequestReturn(request_cmd(tenant_id, return_id)))
            .unwrap();
        rma.apply(&events[0]);

        for target in [
            ReturnStatus::Approved,
            ReturnStatus::LabelSent,
            ReturnStatus::InTransit,
            ReturnStatus::Received,
            ReturnStatus::Inspected,
            ReturnStatus::Refunded,
        ] {
            let events = rma.handle(&command_for(target, tenant_id, return_id)).unwrap();
            rma.apply(&events[0]);
            assert_eq!(rma.status(), target);
        }

        let refund = rma.refund().unwrap();
        assert_eq!(refund.amount, 2_000);
        assert_eq!(refund.restocking_fee, 200);
        assert_eq!(rma.version(), 7);
        assert_eq!(rma.label_tracking_number(), Some("SLRET123456789"));
        assert_eq!(rma.inspection().unwrap().condition, ItemCondition::Resellable);
    }

    #[test]
    fn refund_straight_from_receipt_is_legal() {
        let (mut rma, tenant_id, return_id) = return_in(ReturnStatus::Received);
        let events = rma
            .handle(&command_for(ReturnStatus::Refunded, tenant_id, return_id))
            .unwrap();
        rma.apply(&events[0]);
        assert_eq!(rma.status(), ReturnStatus::Refunded);
    }

    #[test]
    fn second_refund_fails_with_already_refunded_and_no_mutation() {
        let (rma, tenant_id, return_id) = return_in(ReturnStatus::Refunded);
        let before = rma.clone();

        let err = rma
            .handle(&command_for(ReturnStatus::Refunded, tenant_id, return_id))
            .unwrap_err();
        assert_eq!(err, DomainError::AlreadyRefunded);
        assert_eq!(rma, before);
    }

    #[test]
    fn restocking_fee_cannot_exceed_refund() {
        let (rma, tenant_id, return_id) = return_in(ReturnStatus::Inspected);

        let err = rma
            .handle(&ReturnCommand::ProcessRefund(ProcessRefund {
                tenant_id,
                return_id,
                amount: 100,
                method: RefundMethod::StoreCredit,
                restocking_fee: 150,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn transition_table_closure_over_commands() {
        let targets = [
            ReturnStatus::Approved,
            ReturnStatus::Rejected,
            ReturnStatus::LabelSent,
            ReturnStatus::InTransit,
            ReturnStatus::Received,
            ReturnStatus::Inspected,
            ReturnStatus::Refunded,
        ];

        for from in ReturnStatus::ALL {
            for to in targets {
                let (rma, tenant_id, return_id) = return_in(from);
                let before = rma.clone();

                let result = rma.handle(&command_for(to, tenant_id, return_id));

                if from.can_transition_to(to) {
                    assert!(result.is_ok(), "{from} -> {to} should be allowed");
                } else {
                    let err = result.unwrap_err();
                    let expected = if from == ReturnStatus::Refunded && to == ReturnStatus::Refunded
                    {
                        DomainError::AlreadyRefunded
                    } else {
                        DomainError::invalid_transition(from.as_str(), to.as_str())
                    };
                    assert_eq!(err, expected, "{from} -> {to} should be rejected");
                    assert_eq!(rma, before, "rejected command must not mutate");
                }
            }
        }
    }
}
