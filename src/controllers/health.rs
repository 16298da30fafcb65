use crate::controllers::narration::NarrationController;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Ready once at least one synthesis provider is configured
pub async fn health_ready(State(controller): State<Arc<NarrationController>>) -> impl IntoResponse {
    let report = controller.readiness().await;

    let status = if report.providers.iter().any(|p| !p.is_empty()) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report))
}
