use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chat_core::models::OkResponse;

pub(super) async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(OkResponse { ok: true }))
}
