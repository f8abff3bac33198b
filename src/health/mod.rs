//! Health endpoints: `/health` (database ping) and `/health/live`.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::AppState;

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}

async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "up" }))
}

/// Reports `up` when the database answers a ping
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, db_status) = match crate::db::check_connection(&state.db).await {
        Ok(()) => (StatusCode::OK, "up"),
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "down")
        }
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "up" } else { "down" },
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339(),
            "checks": { "database": db_status },
        })),
    )
}
