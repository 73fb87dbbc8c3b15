use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;

use commissionhub_core::ToastId;
use commissionhub_notifications::{Toast, ToastRequest};

use crate::app::errors::ApiError;
use crate::app::services::{self, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_active).post(enqueue))
        .route("/stream", get(stream))
        .route("/:id", delete(dismiss))
}

/// GET /api/notifications
pub async fn list_active(Extension(services): Extension<Arc<AppServices>>) -> Json<Vec<Toast>> {
    Json(services.notifications.list_active())
}

/// POST /api/notifications
pub async fn enqueue(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<ToastRequest>,
) -> Result<Response, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    if req.duration_ms == Some(0) {
        return Err(ApiError::validation("duration_ms must be greater than zero"));
    }

    let id = services.notifications.enqueue(req);
    Ok((StatusCode::CREATED, Json(json!({ "id": id.to_string() }))).into_response())
}

/// DELETE /api/notifications/:id
pub async fn dismiss(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<ToastId>,
) -> Result<StatusCode, ApiError> {
    if services.notifications.dismiss(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("toast not active"))
    }
}

/// GET /api/notifications/stream
pub async fn stream(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    services::notification_sse_stream(services.notifications.subscribe())
}
