use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    domain::story::{StoryRequest, StoryService, StoryServiceApi},
    error::{AppError, AppResult},
    infrastructure::http::RequestId,
};

/// Response for POST /webhook
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub message: String,
    pub id: String,
}

pub struct WebhookController {
    story_service: Arc<StoryService>,
}

impl WebhookController {
    pub fn new(story_service: Arc<StoryService>) -> Self {
        Self { story_service }
    }

    /// POST /webhook - Narrate a story and upload the MP3
    pub async fn receive(
        State(controller): State<Arc<WebhookController>>,
        Extension(request_id): Extension<RequestId>,
        payload: Result<Json<StoryRequest>, JsonRejection>,
    ) -> AppResult<Json<WebhookResponse>> {
        let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

        tracing::info!(
            request_id = %request_id.0,
            story_id = %request.id,
            "Webhook received"
        );

        let result = controller.story_service.narrate(request).await?;

        Ok(Json(WebhookResponse {
            message: format!("story {} narrated and uploaded as {}", result.id, result.key),
            id: result.id,
        }))
    }
}
