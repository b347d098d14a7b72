//! Returns domain module (reverse logistics).
//!
//! This crate contains the return-merchandise aggregate: the
//! request → approval → label → receipt → inspection → refund machine,
//! implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod rma;
pub mod status;

pub use rma::{
    ApproveReturn, InspectReturn, InspectionOutcome, ItemCondition, MarkReturnInTransit,
    ProcessRefund, ReceiveReturn, RefundBreakdown, RefundMethod, RejectReturn, RequestReturn,
    Return, ReturnApproved, ReturnCommand, ReturnEvent, ReturnId, ReturnInTransit,
    ReturnInspected, ReturnItem, ReturnLabelSent, ReturnReceived, ReturnRejected,
    ReturnRequested, RefundProcessed, SendReturnLabel,
};
pub use status::ReturnStatus;
