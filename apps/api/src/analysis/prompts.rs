//! Prompt templates for resume analysis. `{resume_text}` and
//! `{job_description}` are substituted before the call.

pub const ANALYSIS_SYSTEM: &str = "You are an expert resume analyzer and career consultant. \
Analyze the resume and provide detailed feedback in a structured format. \
Focus on practical, actionable insights that will help improve the resume.";

pub const JD_ANALYSIS_PROMPT: &str = r#"Please analyze this resume against the job description:

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Provide analysis in JSON format with this structure:
{
    "compatibility_score": <score 0-100>,
    "overall_assessment": "<brief overall assessment>",
    "strengths": ["<strength 1>", "<strength 2>", ...],
    "areas_for_improvement": ["<improvement 1>", "<improvement 2>", ...],
    "missing_skills": ["<skill 1>", "<skill 2>", ...],
    "recommendations": ["<recommendation 1>", "<recommendation 2>", ...],
    "keywords_found": ["<keyword 1>", "<keyword 2>", ...],
    "keywords_missing": ["<missing keyword 1>", "<missing keyword 2>", ...]
}"#;

pub const GENERAL_ANALYSIS_PROMPT: &str = r#"Please analyze this resume:

RESUME:
{resume_text}

Provide analysis in JSON format with this structure:
{
    "overall_score": <score 0-100>,
    "overall_assessment": "<brief overall assessment>",
    "strengths": ["<strength 1>", "<strength 2>", ...],
    "areas_for_improvement": ["<improvement 1>", "<improvement 2>", ...],
    "technical_skills": ["<skill 1>", "<skill 2>", ...],
    "soft_skills": ["<skill 1>", "<skill 2>", ...],
    "recommendations": ["<recommendation 1>", "<recommendation 2>", ...],
    "ats_suggestions": ["<suggestion 1>", "<suggestion 2>", ...]
}"#;
