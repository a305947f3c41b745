use axum::{extract::State, response::Json};
use serde_json::{Value, json};
use tracing::warn;

use crate::handlers::state::AppState;

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let service = &state.helm_config_service;
    let storage_status = match service.health_check().await {
        Ok(()) => "healthy",
        Err(e) => {
            warn!("⚠️ Storage health check failed: {e}");
            "unhealthy"
        }
    };

    Json(json!({
        "service": "Cluster Helm Config",
        "status": "running",
        "backend": service.backend_name(),
        "storage": storage_status,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
