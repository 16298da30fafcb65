use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{
    domain::narration::{
        dto::{BatchNarrationRequest, BatchNarrationResponse, NarrationRequest, NarrationResponse, ReadinessReport},
        NarrationServiceApi,
    },
    error::{AppError, AppResult},
};

/// Upper bound on one script, in chars
const MAX_TEXT_CHARS: usize = 500_000;
const MAX_BATCH_SIZE: usize = 16;

pub struct NarrationController {
    narration_service: Arc<dyn NarrationServiceApi>,
}

impl NarrationController {
    pub fn new(narration_service: Arc<dyn NarrationServiceApi>) -> Self {
        Self { narration_service }
    }

    pub async fn readiness(&self) -> ReadinessReport {
        self.narration_service.readiness().await
    }

    /// POST /api/narrations - Narrate one script into one track
    pub async fn create(
        State(controller): State<Arc<NarrationController>>,
        Json(request): Json<NarrationRequest>,
    ) -> AppResult<(StatusCode, Json<NarrationResponse>)> {
        validate_text(&request)?;

        let response = controller
            .narration_service
            .run_track(request)
            .await
            .map_err(AppError::from)?;

        Ok((StatusCode::CREATED, Json(response)))
    }

    /// POST /api/narrations/batch - Narrate several language variants concurrently
    pub async fn create_batch(
        State(controller): State<Arc<NarrationController>>,
        Json(request): Json<BatchNarrationRequest>,
    ) -> AppResult<Json<BatchNarrationResponse>> {
        if request.narrations.is_empty() {
            return Err(AppError::BadRequest(
                "Batch must contain at least one narration".to_string(),
            ));
        }
        if request.narrations.len() > MAX_BATCH_SIZE {
            return Err(AppError::PayloadTooLarge(format!(
                "Batch must contain {} narrations or fewer",
                MAX_BATCH_SIZE
            )));
        }
        for narration in &request.narrations {
            validate_text(narration)?;
        }

        let results = controller
            .narration_service
            .run_tracks(request.narrations)
            .await;

        Ok(Json(BatchNarrationResponse { results }))
    }
}

fn validate_text(request: &NarrationRequest) -> AppResult<()> {
    if request.text.trim().is_empty() {
        return Err(AppError::BadRequest("Text cannot be empty".to_string()));
    }

    if request.text.chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::PayloadTooLarge(format!(
            "Text must be {} characters or less",
            MAX_TEXT_CHARS
        )));
    }

    Ok(())
}
