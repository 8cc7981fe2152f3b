use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: i64,
    pub resume_id: i64,
    pub job_description: String,
    pub analysis_data: Value,
    pub compatibility_score: Option<f64>,
    pub processing_time_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}
