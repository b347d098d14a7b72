use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shiplane_core::DomainError;
use shiplane_rates::QuoteError;

use crate::app::services::ServiceError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Duplicate(msg) => json_error(StatusCode::CONFLICT, "duplicate", msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InUse(msg) => json_error(StatusCode::CONFLICT, "in_use", msg),
        err @ DomainError::InvalidTransition { .. } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_transition",
            err.to_string(),
        ),
        err @ DomainError::CannotCancel(_) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "cannot_cancel",
            err.to_string(),
        ),
        DomainError::AlreadyRefunded => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "already_refunded",
            "return already refunded",
        ),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized"),
    }
}

pub fn quote_error_to_response(err: QuoteError) -> axum::response::Response {
    match err {
        QuoteError::AddressNotServiceable => json_error(
            StatusCode::BAD_REQUEST,
            "address_not_serviceable",
            err.to_string(),
        ),
        QuoteError::NoRateAvailable => {
            json_error(StatusCode::BAD_REQUEST, "no_rate_available", err.to_string())
        }
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(err) => domain_error_to_response(err),
        ServiceError::Gateway(err) => json_error(
            StatusCode::BAD_GATEWAY,
            "carrier_integration_error",
            err.to_string(),
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
