use axum::Router;

pub mod gateway;
pub mod notifications;
pub mod system;
pub mod tiers;

/// Router for the JSON endpoints under `/api`.
pub fn api_router() -> Router {
    Router::new()
        .nest("/tiers", tiers::router())
        .nest("/notifications", notifications::router())
}
