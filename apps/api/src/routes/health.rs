use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::db;
use crate::errors::AppError;
use crate::rate_limit::{client_id, EndpointClass};
use crate::state::AppState;

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "Curator API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "AI-powered resume analysis",
        "status": "running"
    }))
}

/// GET /health
/// Probes the database and the completion API. "degraded" means the service
/// is up but a dependency is not.
pub async fn health_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<Value>, AppError> {
    state.limiter.check(&client_id(&addr), EndpointClass::Health)?;

    let database = match db::check_health(&state.db).await {
        Ok(()) => "connected",
        Err(e) => {
            warn!("Database health check failed: {e}");
            "error"
        }
    };

    let ai_service = match state.llm.test_connection().await {
        Ok(()) => "available",
        Err(e) => {
            warn!("LLM health check failed: {e}");
            "unavailable"
        }
    };

    let status = if database == "connected" && ai_service == "available" {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(json!({
        "status": status,
        "database": database,
        "ai_service": ai_service,
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION")
    })))
}
