use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shiplane_auth::Permission;
use shiplane_rates::{TariffDefinition, TariffId};

use crate::app::routes::common::{expected_version, parse_aggregate_id, CmdAuth};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_tariff).get(list_tariffs))
        .route("/:id", get(get_tariff).put(update_tariff))
        .route("/:id/deactivate", post(deactivate_tariff))
        .route("/:id/restore", post(restore_tariff))
}

pub async fn create_tariff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<TariffDefinition>,
) -> axum::response::Response {
    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.tariffs.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().create_tariff(tenant.tenant_id(), cmd_auth.inner) {
        Ok(tariff) => (StatusCode::CREATED, Json(dto::tariff_to_json(&tariff))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_tariffs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let tariffs: Vec<_> = services
        .catalog()
        .list_tariffs(tenant.tenant_id())
        .iter()
        .map(dto::tariff_to_json)
        .collect();
    Json(serde_json::json!({ "tariffs": tariffs })).into_response()
}

pub async fn get_tariff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "tariff") {
        Ok(v) => TariffId::new(v),
        Err(resp) => return resp,
    };
    match services.catalog().get_tariff(tenant.tenant_id(), id) {
        Ok(tariff) => Json(dto::tariff_to_json(&tariff)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_tariff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Query(version): Query<dto::VersionQuery>,
    Json(body): Json<TariffDefinition>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "tariff") {
        Ok(v) => TariffId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: body,
        required: vec![Permission::new("shipping.tariffs.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().update_tariff(
        tenant.tenant_id(),
        id,
        cmd_auth.inner,
        expected_version(version.expected_version),
    ) {
        Ok(tariff) => Json(dto::tariff_to_json(&tariff)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn deactivate_tariff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Query(version): Query<dto::VersionQuery>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "tariff") {
        Ok(v) => TariffId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.tariffs.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().deactivate_tariff(
        tenant.tenant_id(),
        id,
        expected_version(version.expected_version),
    ) {
        Ok(tariff) => Json(dto::tariff_to_json(&tariff)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn restore_tariff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Query(version): Query<dto::VersionQuery>,
) -> axum::response::Response {
    let id = match parse_aggregate_id(&id, "tariff") {
        Ok(v) => TariffId::new(v),
        Err(resp) => return resp,
    };

    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new("shipping.tariffs.manage")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog().restore_tariff(
        tenant.tenant_id(),
        id,
        expected_version(version.expected_version),
    ) {
        Ok(tariff) => Json(dto::tariff_to_json(&tariff)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
