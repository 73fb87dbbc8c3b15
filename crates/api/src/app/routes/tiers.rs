use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    routing::get,
    Json, Router,
};

use commissionhub_billing::TierDetails;

use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tiers))
        .route("/:name", get(get_tier))
}

/// GET /api/tiers
pub async fn list_tiers(Extension(services): Extension<Arc<AppServices>>) -> Json<Vec<TierDetails>> {
    Json(services.tiers.all().to_vec())
}

/// GET /api/tiers/:name
///
/// Unknown names answer with the basic tier.
pub async fn get_tier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> Json<TierDetails> {
    Json(services.tiers.resolve_tier(&name).clone())
}
