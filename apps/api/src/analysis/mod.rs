//! Resume analysis — builds the prompt, calls the LLM, and shapes the result.

pub mod handlers;
pub mod keywords;
pub mod prompts;

use serde_json::{json, Value};

use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, AtlasClient};
use self::prompts::{ANALYSIS_SYSTEM, GENERAL_ANALYSIS_PROMPT, JD_ANALYSIS_PROMPT};

/// The persisted result of one analysis call: the opaque payload returned by
/// the model and the score lifted out of it, if any.
pub struct AnalysisOutcome {
    pub payload: Value,
    pub score: Option<f64>,
}

/// Runs the analysis prompt for a resume, against a job description when one
/// is provided. LLM failures surface as errors; a non-JSON completion does
/// not — it degrades to a raw-text payload.
pub async fn run_analysis(
    llm: &AtlasClient,
    resume_text: &str,
    job_description: Option<&str>,
) -> Result<AnalysisOutcome, AppError> {
    let prompt = match job_description {
        Some(jd) if !jd.trim().is_empty() => JD_ANALYSIS_PROMPT
            .replace("{resume_text}", resume_text)
            .replace("{job_description}", jd),
        _ => GENERAL_ANALYSIS_PROMPT.replace("{resume_text}", resume_text),
    };

    let content = llm
        .chat(ANALYSIS_SYSTEM, &prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

    let payload = parse_payload(&content);
    let score = extract_score(&payload);

    Ok(AnalysisOutcome { payload, score })
}

fn parse_payload(content: &str) -> Value {
    match serde_json::from_str(strip_json_fences(content)) {
        Ok(value) => value,
        Err(_) => json!({
            "raw_analysis": content,
            "parsing_error": "Response was not valid JSON"
        }),
    }
}

/// The with-JD prompt yields `compatibility_score`, the general prompt
/// `overall_score`; take whichever is present.
fn extract_score(payload: &Value) -> Option<f64> {
    payload
        .get("compatibility_score")
        .and_then(Value::as_f64)
        .or_else(|| payload.get("overall_score").and_then(Value::as_f64))
}
