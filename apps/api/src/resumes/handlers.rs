use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::analysis::keywords::DEFAULT_MAX_KEYWORDS;
use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeSummary};
use crate::rate_limit::{client_id, EndpointClass};
use crate::resumes::extract::extract_text;
use crate::state::AppState;
use crate::validation::{validate_file_upload, FileUpload};

/// Extracted text shorter than this cannot support a meaningful analysis.
const MIN_EXTRACTED_CHARS: usize = 50;

#[derive(Serialize)]
pub struct ResumeUploadResponse {
    pub id: i64,
    pub filename: String,
    pub file_size: i64,
    pub status: String,
    pub upload_timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeSummary>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct ResumeDetailResponse {
    pub id: i64,
    pub filename: String,
    pub file_size: i64,
    pub status: String,
    pub upload_timestamp: DateTime<Utc>,
    pub text_length: usize,
    pub analysis_count: i64,
}

#[derive(Serialize)]
pub struct ResumeKeywordsResponse {
    pub resume_id: i64,
    pub keywords: Vec<String>,
    pub technical: Vec<String>,
}

/// POST /api/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeUploadResponse>), AppError> {
    state.limiter.check(&client_id(&addr), EndpointClass::Upload)?;

    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut read_result: Result<Bytes, String> = Ok(Bytes::new());

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                filename = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                read_result = field.bytes().await.map_err(|e| e.to_string());
                break;
            }
            Ok(None) => break,
            Err(e) => {
                read_result = Err(e.to_string());
                break;
            }
        }
    }

    let outcome = validate_file_upload(&FileUpload {
        filename: filename.as_deref(),
        content_type: content_type.as_deref(),
        content: match &read_result {
            Ok(bytes) => Ok(bytes.as_ref()),
            Err(reason) => Err(reason.clone()),
        },
    })
    .into_result("file")?;

    // A valid outcome implies the body was read successfully.
    let bytes = read_result
        .map_err(|_| AppError::Internal(anyhow::anyhow!("validated upload lost its content")))?;

    let stored_name = outcome
        .metadata
        .get("filename")
        .and_then(Value::as_str)
        .unwrap_or("unnamed_file")
        .to_string();
    let extension = outcome
        .metadata
        .get("file_extension")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let mime_type = content_type.unwrap_or_else(|| "unknown".to_string());

    let extracted = extract_text(&extension, &bytes).map_err(|e| {
        error!("Text extraction failed for {stored_name}: {e}");
        AppError::UnprocessableEntity {
            code: "TEXT_EXTRACTION_ERROR",
            message: format!("Could not extract text from file: {e}"),
        }
    })?;

    if extracted.trim().chars().count() < MIN_EXTRACTED_CHARS {
        return Err(AppError::UnprocessableEntity {
            code: "INSUFFICIENT_CONTENT",
            message: "Could not extract sufficient text content from file".to_string(),
        });
    }

    let row: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes (filename, file_size, mime_type, extracted_text, status)
        VALUES ($1, $2, $3, $4, 'completed')
        RETURNING *
        "#,
    )
    .bind(&stored_name)
    .bind(bytes.len() as i64)
    .bind(&mime_type)
    .bind(&extracted)
    .fetch_one(&state.db)
    .await?;

    info!("Resume uploaded: id {}, filename {}", row.id, row.filename);

    Ok((
        StatusCode::CREATED,
        Json(ResumeUploadResponse {
            id: row.id,
            filename: row.filename,
            file_size: row.file_size,
            status: row.status,
            upload_timestamp: row.upload_timestamp,
        }),
    ))
}

/// GET /api/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<ResumeListResponse>, AppError> {
    state.limiter.check(&client_id(&addr), EndpointClass::Default)?;

    let resumes: Vec<ResumeSummary> = sqlx::query_as(
        r#"
        SELECT r.id, r.filename, r.file_size, r.status, r.upload_timestamp,
               COUNT(a.id) AS analysis_count
        FROM resumes r
        LEFT JOIN analysis_results a ON a.resume_id = r.id
        GROUP BY r.id
        ORDER BY r.upload_timestamp DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let total = resumes.len();
    Ok(Json(ResumeListResponse { resumes, total }))
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(id): Path<i64>,
) -> Result<Json<ResumeDetailResponse>, AppError> {
    state.limiter.check(&client_id(&addr), EndpointClass::Default)?;

    let resume = fetch_resume(&state, id).await?;

    let analysis_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM analysis_results WHERE resume_id = $1")
            .bind(id)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(ResumeDetailResponse {
        id: resume.id,
        filename: resume.filename,
        file_size: resume.file_size,
        status: resume.status,
        upload_timestamp: resume.upload_timestamp,
        text_length: resume.extracted_text.chars().count(),
        analysis_count,
    }))
}

/// GET /api/resumes/:id/keywords
pub async fn handle_resume_keywords(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(id): Path<i64>,
) -> Result<Json<ResumeKeywordsResponse>, AppError> {
    state.limiter.check(&client_id(&addr), EndpointClass::Default)?;

    let resume = fetch_resume(&state, id).await?;
    let extraction = state
        .keywords
        .extract(&resume.extracted_text, DEFAULT_MAX_KEYWORDS);

    Ok(Json(ResumeKeywordsResponse {
        resume_id: id,
        keywords: extraction.keywords,
        technical: extraction.technical,
    }))
}

pub(crate) async fn fetch_resume(state: &AppState, id: i64) -> Result<ResumeRow, AppError> {
    sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}
