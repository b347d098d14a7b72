use axum::http::StatusCode;

use shiplane_auth::{CommandAuthorization, Permission};
use shiplane_core::{AggregateId, ExpectedVersion};

use crate::app::errors;

/// Small helper wrapper to associate required permissions with a command.
pub struct CmdAuth<C> {
    pub inner: C,
    pub required: Vec<Permission>,
}

impl<C> CommandAuthorization for CmdAuth<C> {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}

/// Parse a path/body identifier, mapping failures to a consistent response.
pub fn parse_aggregate_id(
    raw: &str,
    label: &'static str,
) -> Result<AggregateId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("invalid {label} id"),
        )
    })
}

/// Version pin for catalog writes: absent = unchecked.
pub fn expected_version(expected: Option<u64>) -> ExpectedVersion {
    match expected {
        Some(v) => ExpectedVersion::Exact(v),
        None => ExpectedVersion::Any,
    }
}
