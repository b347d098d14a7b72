use axum::{routing::get, Router};

pub mod carriers;
pub mod common;
pub mod quotes;
pub mod returns;
pub mod shipments;
pub mod system;
pub mod tariffs;
pub mod zones;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .nest("/zones", zones::router())
        .nest("/carriers", carriers::router())
        .nest("/tariffs", tariffs::router())
        .nest("/quotes", quotes::router())
        .nest("/shipments", shipments::router())
        .nest("/returns", returns::router())
}
