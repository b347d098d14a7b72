use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use shiplane_rates::QuoteRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(create_quote))
}

pub async fn create_quote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Json(body): Json<QuoteRequest>,
) -> axum::response::Response {
    if body.packages.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "quote requires at least one package",
        );
    }

    match services.quote(tenant.tenant_id(), &body) {
        Ok(quotes) => {
            let options: Vec<_> = quotes.iter().map(dto::quote_to_json).collect();
            Json(serde_json::json!({ "options": options })).into_response()
        }
        Err(e) => errors::quote_error_to_response(e),
    }
}
