use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chat_core::models::{ChatRequest, ChatResponse, ResetRequest, ResetResponse};
use chat_core::validation::{ValidationError, validate_chat_request, validate_reset_request};
use tracing::info;

use super::AppState;
use super::errors::{
    chat_validation_error_response, provider_error_response, reset_validation_error_response,
};

pub(super) async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return chat_validation_error_response(ValidationError::MalformedBody(
                rejection.body_text(),
            ));
        }
    };

    let input = match validate_chat_request(request, state.max_message_chars) {
        Ok(input) => input,
        Err(err) => return chat_validation_error_response(err),
    };

    match state
        .gateway
        .respond(&input.session_id, &input.message, &input.profile)
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse::success(reply))).into_response(),
        Err(err) => provider_error_response(&err),
    }
}

/// Accepts an empty body as a reset of the default session.
pub(super) async fn reset_conversation(State(state): State<AppState>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ResetRequest::default()
    } else {
        match serde_json::from_slice::<ResetRequest>(&body) {
            Ok(request) => request,
            Err(err) => {
                return reset_validation_error_response(ValidationError::MalformedBody(
                    err.to_string(),
                ));
            }
        }
    };

    let session_id = match validate_reset_request(request) {
        Ok(session_id) => session_id,
        Err(err) => return reset_validation_error_response(err),
    };

    state.gateway.reset(&session_id).await;
    info!(session_id = %session_id, "conversation history reset");

    (StatusCode::OK, Json(ResetResponse::reset())).into_response()
}
