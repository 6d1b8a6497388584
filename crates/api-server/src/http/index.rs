use axum::response::Html;

const CHAT_PAGE: &str = include_str!("../../static/index.html");

pub(super) async fn index() -> Html<&'static str> {
    Html(CHAT_PAGE)
}
