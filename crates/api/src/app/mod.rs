//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: collaborator wiring (identity provider, verifier, tiers, toasts)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::GatewayConfig;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: GatewayConfig) -> Router {
    let services = Arc::new(services::build_services(config));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::gateway::router())
        .nest("/api", routes::api_router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
