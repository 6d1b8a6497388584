use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chat_core::chat::GatewayError;
use chat_core::models::{ChatResponse, ResetResponse};
use chat_core::validation::ValidationError;

pub(super) fn chat_validation_error_response(err: ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ChatResponse::failure(err.to_string(), err.code())),
    )
        .into_response()
}

pub(super) fn reset_validation_error_response(err: ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ResetResponse::failure(err.to_string(), err.code())),
    )
        .into_response()
}

/// The end user only ever sees the fallback text; the cause goes to `error`.
pub(super) fn provider_error_response(err: &GatewayError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ChatResponse::failure(
            err.fallback_response(),
            err.to_string(),
        )),
    )
        .into_response()
}
