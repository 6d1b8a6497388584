use axum::routing::{get, post};
use axum::{Router, middleware};
use chat_core::chat::CompletionGateway;
use tower_http::cors::CorsLayer;

mod chat;
mod errors;
mod health;
mod index;
mod observability;

#[derive(Clone)]
pub struct AppState {
    pub gateway: CompletionGateway,
    pub max_message_chars: usize,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index::index))
        .route("/healthz", get(health::healthz))
        .route("/api/chat", post(chat::chat))
        .route("/api/reset", post(chat::reset_conversation))
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
