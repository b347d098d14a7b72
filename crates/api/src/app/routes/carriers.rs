use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shiplane_auth::Permission;
use shiplane_carriers::{CarrierDefinition, CarrierId};

use crate::app::routes::common::{expected_version, parse_aggregate_id, CmdAuth};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_carrier).get(list_carriers))
        .route("/:id", get(get_carrier).put(update_carrier))
        .route("/:id/deactivate", post(deactivate_carrier))
        .route("/:id/restore", post(restore_carrier))
}

pub async fn create_carrier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<CarrierDefinition>,
) -> axum::response::Response {
    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.carriers.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().create_carrier(tenant.tenant_id(), cmd_auth.inner) {
        Ok(carrier) => (StatusCode::CREATED, Json(dto::carrier_to_json(&carrier))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_carriers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let carriers: Vec<_> = services
        .catalog()
        .list_carriers(tenant.tenant_id())
        .iter()
        .map(dto::carrier_to_json)
        .collect();
    Json(serde_json::json!({ "carriers": carriers })).into_response()
}

pub async fn get_carrier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "carrier") {
        Ok(v) => CarrierId::new(v),
        Err(resp) => return resp,
    };
    match services.catalog().get_carrier(tenant.tenant_id(), id) {
        Ok(carrier) => Json(dto::carrier_to_json(&carrier)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_carrier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Query(version): Query<dto::VersionQuery>,
    Json(body): Json<CarrierDefinition>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "carrier") {
        Ok(v) => CarrierId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.carriers.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().update_carrier(
        tenant.tenant_id(),
        id,
        cmd_auth.inner,
        expected_version(version.expected_version),
    ) {
        Ok(carrier) => Json(dto::carrier_to_json(&carrier)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn deactivate_carrier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Query(version): Query<dto::VersionQuery>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "carrier") {
        Ok(v) => CarrierId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.carriers.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().deactivate_carrier(
        tenant.tenant_id(),
        id,
        expected_version(version.expected_version),
    ) {
        Ok(carrier) => Json(dto::carrier_to_json(&carrier)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn restore_carrier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Query(version): Query<dto::VersionQuery>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "carrier") {
        Ok(v) => CarrierId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.carriers.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().restore_carrier(
        tenant.tenant_id(),
        id,
        expected_version(version.expected_version),
    ) {
        Ok(carrier) => Json(dto::carrier_to_json(&carrier)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
