use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shiplane_auth::Permission;
use shiplane_carriers::CarrierId;
use shiplane_shipments::ShipmentId;

use crate::app::routes::common::{parse_aggregate_id, CmdAuth};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_shipment).get(list_shipments))
        .route("/:id", get(get_shipment))
        .route("/by-number/:number", get(get_shipment_by_number))
        .route("/by-tracking/:tracking", get(get_shipment_by_tracking))
        .route("/:id/label", post(generate_label))
        .route("/:id/tracking-events", post(record_tracking_scan))
        .route("/:id/pickup", post(mark_picked_up))
        .route("/:id/deliver", post(mark_delivered))
        .route("/:id/cancel", post(cancel_shipment))
}

pub async fn create_shipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::CreateShipmentRequest>,
) -> axum::response::Response {
    let carrier_id = match parse_aggregate_id(&body.carrier_id, "carrier") {
        Ok(v) => CarrierId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.shipments.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let body = cmd_auth.inner;

    match services.create_shipment(
        tenant.tenant_id(),
        carrier_id,
        body.tariff_code,
        body.method,
        body.origin,
        body.destination,
        body.pickup_point,
        body.packages,
        body.cost,
    ) {
        Ok(shipment) => {
            (StatusCode::CREATED, Json(dto::shipment_to_json(&shipment))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_shipments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let shipments: Vec<_> = services
        .list_shipments(tenant.tenant_id())
        .iter()
        .map(dto::shipment_to_json)
        .collect();
    Json(serde_json::json!({ "shipments": shipments })).into_response()
}

pub async fn get_shipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "shipment") {
        Ok(v) => ShipmentId::new(v),
        Err(resp) => return resp,
    };
    match services.get_shipment(tenant.tenant_id(), id) {
        Some(shipment) => Json(dto::shipment_to_json(&shipment)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub async fn get_shipment_by_number(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(number): Path<String>,
) -> axum::response::Response {
    match services.find_shipment_by_number(tenant.tenant_id(), &number) {
        Some(shipment) => Json(dto::shipment_to_json(&shipment)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub async fn get_shipment_by_tracking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(tracking): Path<String>,
) -> axum::response::Response {
    match services.find_shipment_by_tracking(tenant.tenant_id(), &tracking) {
        Some(shipment) => Json(dto::shipment_to_json(&shipment)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub async fn generate_label(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "shipment") {
        Ok(v) => ShipmentId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.shipments.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.generate_label(tenant.tenant_id(), id) {
        Ok(shipment) => Json(dto::shipment_to_json(&shipment)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn record_tracking_scan(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::TrackingScanRequest>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "shipment") {
        Ok(v) => ShipmentId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.shipments.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let body = cmd_auth.inner;

    match services.record_tracking_scan(
        tenant.tenant_id(),
        id,
        body.status,
        body.description,
        body.location,
        body.occurred_at,
    ) {
        Ok(shipment) => Json(dto::shipment_to_json(&shipment)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn mark_picked_up(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    body: Option<Json<dto::LocationRequest>>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "shipment") {
        Ok(v) => ShipmentId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.shipments.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let location = body.and_then(|Json(b)| b.location);
    match services.mark_picked_up(tenant.tenant_id(), id, location) {
        Ok(shipment) => Json(dto::shipment_to_json(&shipment)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn mark_delivered(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    body: Option<Json<dto::LocationRequest>>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "shipment") {
        Ok(v) => ShipmentId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.shipments.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let location = body.and_then(|Json(b)| b.location);
    match services.mark_delivered(tenant.tenant_id(), id, location) {
        Ok(shipment) => Json(dto::shipment_to_json(&shipment)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn cancel_shipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::CancelShipmentRequest>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "shipment") {
        Ok(v) => ShipmentId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.shipments.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.cancel_shipment(tenant.tenant_id(), id, cmd_auth.inner.reason) {
        Ok(shipment) => Json(dto::shipment_to_json(&shipment)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
