// Health endpoint

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{app::AppState, db::check_diesel_health};

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let postgresql = match &state.diesel_pool {
        None => json!({ "status": "not_configured" }),
        Some(pool) => match check_diesel_health(pool).await {
            Ok(health) => json!({ "status": "healthy", "pool": health }),
            Err(e) => json!({ "status": "unhealthy", "error": e.to_string() }),
        },
    };

    let healthy = postgresql["status"] != "unhealthy";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "healthy" } else { "degraded" },
            "service": "account-link-core",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "components": { "postgresql": postgresql }
        })),
    )
}
