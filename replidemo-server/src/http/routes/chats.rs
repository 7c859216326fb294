//! Chat endpoints
//!
//! `GET /api/chats?db=<token>` lists rows from the selected handle.
//! `POST /api/chats` inserts `{message, target}` through the selected handle.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::resolve_target;
use crate::db::ChatMessage;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// `?db=` query parameter
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub db: Option<String>,
}

/// Create chat request. Missing or null fields read as empty strings.
#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: i64,
    pub message: String,
    pub created_at: String,
}

impl From<ChatMessage> for ChatResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            message: m.message,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/chats
async fn list_chats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ChatResponse>>, ApiError> {
    let target = resolve_target(params.db.as_deref());
    let chats = state
        .handles
        .get(target)
        .store()
        .list(state.policy)
        .await?;

    Ok(Json(chats.into_iter().map(ChatResponse::from).collect()))
}

/// POST /api/chats
///
/// The body is decoded as JSON whatever `Content-Type` the client sent.
async fn create_chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let req: CreateChatRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest {
            message: format!("invalid JSON body: {}", e),
        })?;
    let message = req.message.unwrap_or_default();
    let target = resolve_target(Some(req.target.as_deref().unwrap_or_default()));

    let chat = state.handles.get(target).store().insert(&message).await?;
    tracing::debug!(db = %target, id = chat.id, "chat inserted");

    Ok(Json(ChatResponse::from(chat)))
}

/// Chat routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/chats", get(list_chats).post(create_chat))
}
