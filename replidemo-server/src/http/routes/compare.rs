//! Replication status endpoint
//!
//! GET /api/compare - `{count1, count2, count3, match}` for primary,
//! replica and proxy, in that order.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::compare::{compare, Comparison};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::target::Target;

/// Compare response
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub count1: i64,
    pub count2: i64,
    pub count3: i64,
    #[serde(rename = "match")]
    pub matched: bool,
}

impl From<&Comparison> for CompareResponse {
    fn from(c: &Comparison) -> Self {
        Self {
            count1: c.count(Target::Primary),
            count2: c.count(Target::Replica),
            count3: c.count(Target::Proxy),
            matched: c.is_match(),
        }
    }
}

/// GET /api/compare
async fn compare_counts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CompareResponse>, ApiError> {
    let comparison = compare(&state.handles, state.policy).await?;
    Ok(Json(CompareResponse::from(&comparison)))
}

/// Compare routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/compare", get(compare_counts))
}
