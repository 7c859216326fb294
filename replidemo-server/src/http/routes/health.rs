//! Health check endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db::PingReport;
use crate::http::server::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every handle answers, `degraded` otherwise
    pub status: &'static str,
    pub version: &'static str,
    pub targets: Vec<PingReport>,
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let targets = state.handles.ping_all().await;
    let status = if targets.iter().all(|t| t.ok) {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        targets,
    })
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::{fixture, get};
    use crate::policy::FailurePolicy;

    #[tokio::test]
    async fn health_returns_ok() {
        let fx = fixture(FailurePolicy::BestEffort);
        let (status, body) = get(&fx.app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["targets"].as_array().unwrap().len(), 3);
        assert_eq!(body["targets"][1]["target"], "replica");
        assert_eq!(body["targets"][1]["endpoint"], "replica:5433");
    }

    #[tokio::test]
    async fn health_is_degraded_when_a_handle_is_down() {
        let fx = fixture(FailurePolicy::BestEffort);
        fx.proxy.set_unreachable(true);

        let (status, body) = get(&fx.app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["targets"][2]["ok"], false);
        assert!(body["targets"][2]["error"].is_string());
    }
}
