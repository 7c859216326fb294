//! Demo page

use std::sync::Arc;

use axum::{response::Html, routing::get, Router};

use crate::http::server::AppState;

const INDEX_HTML: &str = include_str!("../../../assets/index.html");

/// GET /
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}
