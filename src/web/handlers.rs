use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use serde_json::error::Category;

use crate::error::ApiError;
use crate::web::models::{ChatRequest, ChatResponse};
use crate::AppState;

/// Reply for a conversation with no messages. The provider is not called.
pub const EMPTY_CONVERSATION_REPLY: &str = "Yes, you are great";

/// Cause reported to clients when the provider call fails. Details stay in the log.
pub const UPSTREAM_FAILURE_CAUSE: &str = "upstream provider request failed";

// Health check endpoint
pub async fn health() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}

// Chat completions endpoint
pub async fn completions(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let ChatRequest { messages } = req.into_inner();
    info!("Chat request with {} messages", messages.len());

    if messages.is_empty() {
        return Ok(HttpResponse::Ok().json(ChatResponse::from_value(EMPTY_CONVERSATION_REPLY)));
    }

    // Spawned so the provider call finishes even if the client disconnects.
    let backend = data.backend.clone();
    let outcome = actix_web::rt::spawn(async move { backend.complete(&messages).await })
        .await
        .map_err(|e| {
            error!("Completion task failed: {}", e);
            ApiError::Internal
        })?;

    match outcome {
        Ok(reply) => {
            info!("Response length: {} characters", reply.chars().count());
            Ok(HttpResponse::Ok().json(ChatResponse::from_value(reply)))
        }
        Err(e) => {
            error!("Upstream error: {}", e);
            Ok(HttpResponse::BadGateway().json(ChatResponse::from_cause(UPSTREAM_FAILURE_CAUSE)))
        }
    }
}

/// Maps JSON body extraction failures onto `{"detail": ...}` responses.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let api_error = match &err {
        JsonPayloadError::Deserialize(e) if e.classify() == Category::Data => {
            ApiError::Validation(e.to_string())
        }
        other => ApiError::Payload(other.to_string()),
    };
    warn!("Rejected request body: {}", api_error);
    api_error.into()
}
