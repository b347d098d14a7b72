use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shiplane_auth::Permission;
use shiplane_returns::ReturnId;
use shiplane_shipments::ShipmentId;

use crate::app::routes::common::{parse_aggregate_id, CmdAuth};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_return).get(list_returns))
        .route("/:id", get(get_return))
        .route("/by-number/:number", get(get_return_by_number))
        .route("/:id/approve", post(approve_return))
        .route("/:id/reject", post(reject_return))
        .route("/:id/label", post(send_return_label))
        .route("/:id/mark-in-transit", post(mark_return_in_transit))
        .route("/:id/receive", post(receive_return))
        .route("/:id/inspect", post(inspect_return))
        .route("/:id/refund", post(process_refund))
}

pub async fn create_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::CreateReturnRequest>,
) -> axum::response::Response {
    let shipment_id = match parse_aggregate_id(&body.shipment_id, "shipment") {
        Ok(v) => ShipmentId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.returns.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let body = cmd_auth.inner;

    match services.create_return(tenant.tenant_id(), shipment_id, body.order_ref, body.items) {
        Ok(rma) => (StatusCode::CREATED, Json(dto::return_to_json(&rma))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_returns(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let returns: Vec<_> = services
        .list_returns(tenant.tenant_id())
        .iter()
        .map(dto::return_to_json)
        .collect();
    Json(serde_json::json!({ "returns": returns })).into_response()
}

pub async fn get_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "return") {
        Ok(v) => ReturnId::new(v),
        Err(resp) => return resp,
    };
    match services.get_return(tenant.tenant_id(), id) {
        Some(rma) => Json(dto::return_to_json(&rma)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub async fn get_return_by_number(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(number): Path<String>,
) -> axum::response::Response {
    match services.find_return_by_number(tenant.tenant_id(), &number) {
        Some(rma) => Json(dto::return_to_json(&rma)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub async fn approve_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "return") {
        Ok(v) => ReturnId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.returns.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.approve_return(tenant.tenant_id(), id) {
        Ok(rma) => Json(dto::return_to_json(&rma)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn reject_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RejectReturnRequest>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "return") {
        Ok(v) => ReturnId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.returns.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.reject_return(tenant.tenant_id(), id, cmd_auth.inner.reason) {
        Ok(rma) => Json(dto::return_to_json(&rma)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn send_return_label(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "return") {
        Ok(v) => ReturnId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.returns.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.send_return_label(tenant.tenant_id(), id) {
        Ok(rma) => Json(dto::return_to_json(&rma)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn mark_return_in_transit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "return") {
        Ok(v) => ReturnId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.returns.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.mark_return_in_transit(tenant.tenant_id(), id) {
        Ok(rma) => Json(dto::return_to_json(&rma)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn receive_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ConditionRequest>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "return") {
        Ok(v) => ReturnId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.returns.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let body = cmd_auth.inner;

    match services.receive_return(tenant.tenant_id(), id, body.condition, body.notes) {
        Ok(rma) => Json(dto::return_to_json(&rma)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn inspect_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ConditionRequest>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "return") {
        Ok(v) => ReturnId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.returns.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let body = cmd_auth.inner;

    match services.inspect_return(tenant.tenant_id(), id, body.condition, body.notes) {
        Ok(rma) => Json(dto::return_to_json(&rma)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn process_refund(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RefundRequest>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "return") {
        Ok(v) => ReturnId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.returns.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let body = cmd_auth.inner;

    match services.process_refund(
        tenant.tenant_id(),
        id,
        body.amount,
        body.method,
        body.restocking_fee,
    ) {
        Ok(rma) => Json(dto::return_to_json(&rma)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
