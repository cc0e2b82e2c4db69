use axum::{extract::State, http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

use crate::api::state::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Evently API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Event publication and participation request admission",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "users": "/users/:user_id",
            "events": "/events/:event_id",
            "admin": "/admin"
        }
    }))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1")
        .execute(&state.service_context.db_pool)
        .await
    {
        Ok(_) => "up",
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            "down"
        }
    };

    let status = if database == "up" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(json!({
        "status": if database == "up" { "healthy" } else { "degraded" },
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
