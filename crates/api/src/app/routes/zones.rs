use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shiplane_auth::Permission;
use shiplane_zones::{ZoneDefinition, ZoneId};

use crate::app::routes::common::{expected_version, parse_aggregate_id, CmdAuth};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_zone).get(list_zones))
        .route("/:id", get(get_zone).put(update_zone))
        .route("/:id/deactivate", post(deactivate_zone))
        .route("/:id/restore", post(restore_zone))
}

pub async fn create_zone(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<ZoneDefinition>,
) -> axum::response::Response {
    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.zones.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().create_zone(tenant.tenant_id(), cmd_auth.inner) {
        Ok(zone) => (StatusCode::CREATED, Json(dto::zone_to_json(&zone))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_zones(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let zones: Vec<_> = services
        .catalog()
        .list_zones(tenant.tenant_id())
        .iter()
        .map(dto::zone_to_json)
        .collect();
    Json(serde_json::json!({ "zones": zones })).into_response()
}

pub async fn get_zone(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "zone") {
        Ok(v) => ZoneId::new(v),
        Err(resp) => return resp,
    };
    match services.catalog().get_zone(tenant.tenant_id(), id) {
        Ok(zone) => Json(dto::zone_to_json(&zone)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_zone(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Query(version): Query<dto::VersionQuery>,
    Json(body): Json<ZoneDefinition>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "zone") {
        Ok(v) => ZoneId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.zones.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().update_zone(
        tenant.tenant_id(),
        id,
        cmd_auth.inner,
        expected_version(version.expected_version),
    ) {
        Ok(zone) => Json(dto::zone_to_json(&zone)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn deactivate_zone(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Query(version): Query<dto::VersionQuery>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "zone") {
        Ok(v) => ZoneId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.zones.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().deactivate_zone(
        tenant.tenant_id(),
        id,
        expected_version(version.expected_version),
    ) {
        Ok(zone) => Json(dto::zone_to_json(&zone)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn restore_zone(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Query(version): Query<dto::VersionQuery>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "zone") {
        Ok(v) => ZoneId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.zones.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().restore_zone(
        tenant.tenant_id(),
        id,
        expected_version(version.expected_version),
    ) {
        Ok(zone) => Json(dto::zone_to_json(&zone)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
