use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::analysis::run_analysis;
use crate::errors::AppError;
use crate::models::analysis::AnalysisRow;
use crate::rate_limit::{client_id, EndpointClass};
use crate::resumes::handlers::fetch_resume;
use crate::state::AppState;
use crate::validation::validate_job_description;

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub resume_id: i64,
    pub job_description: Option<String>,
}

/// POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisRow>, AppError> {
    state
        .limiter
        .check(&client_id(&addr), EndpointClass::Analysis)?;

    // Only the sanitized form of the job description is analyzed or stored.
    let sanitized_jd = match &request.job_description {
        Some(jd) => {
            let outcome = validate_job_description(jd).into_result("job_description")?;
            Some(
                outcome
                    .metadata
                    .get("sanitized_content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            )
        }
        None => None,
    };

    let resume = fetch_resume(&state, request.resume_id).await?;

    let started = Instant::now();
    let analysis = run_analysis(&state.llm, &resume.extracted_text, sanitized_jd.as_deref()).await?;
    let processing_time_ms = started.elapsed().as_millis() as i64;

    let row: AnalysisRow = sqlx::query_as(
        r#"
        INSERT INTO analysis_results
            (resume_id, job_description, analysis_data, compatibility_score, processing_time_ms)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(resume.id)
    .bind(sanitized_jd.unwrap_or_default())
    .bind(&analysis.payload)
    .bind(analysis.score)
    .bind(processing_time_ms)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Analysis completed: id {} for resume {} in {}ms",
        row.id, resume.id, processing_time_ms
    );

    Ok(Json(row))
}

/// GET /api/analysis/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(id): Path<i64>,
) -> Result<Json<AnalysisRow>, AppError> {
    state.limiter.check(&client_id(&addr), EndpointClass::Default)?;

    let analysis: Option<AnalysisRow> = sqlx::query_as("SELECT * FROM analysis_results WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;

    analysis
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Analysis not found".to_string()))
}
