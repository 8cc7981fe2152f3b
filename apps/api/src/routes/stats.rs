use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    Json,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::rate_limit::{client_id, EndpointClass};
use crate::state::AppState;

/// GET /api/stats
pub async fn stats_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<Value>, AppError> {
    state.limiter.check(&client_id(&addr), EndpointClass::Default)?;

    let total_resumes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resumes")
        .fetch_one(&state.db)
        .await?;
    let total_analyses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM analysis_results")
        .fetch_one(&state.db)
        .await?;

    let yesterday = Utc::now() - Duration::days(1);
    let recent_resumes: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM resumes WHERE upload_timestamp >= $1")
            .bind(yesterday)
            .fetch_one(&state.db)
            .await?;
    let recent_analyses: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM analysis_results WHERE created_at >= $1")
            .bind(yesterday)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(json!({
        "total_resumes": total_resumes,
        "total_analyses": total_analyses,
        "recent_resumes_24h": recent_resumes,
        "recent_analyses_24h": recent_analyses,
        "timestamp": Utc::now()
    })))
}
