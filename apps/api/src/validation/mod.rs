//! Input validation for uploaded files and job-description text.
//!
//! Validators collect every problem they can find into a [`ValidationOutcome`]
//! instead of failing on the first one, so the HTTP layer can report all
//! issues to the user at once. Checks that make the input unusable for
//! further inspection (missing file, unreadable content) are terminal.

pub mod sanitize;

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AppError;
use self::sanitize::{sanitize_filename, sanitize_text_input};

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

const MIN_JOB_DESCRIPTION_CHARS: usize = 10;
const MAX_JOB_DESCRIPTION_CHARS: usize = 10_000;
const MIN_JOB_DESCRIPTION_WORDS: usize = 20;

/// Byte substrings that mark an upload as hostile, matched case-insensitively
/// anywhere in the content.
static SUSPICIOUS_CONTENT: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(["<script", "javascript:", "vbscript:", "<?php"])
        .expect("suspicious-content patterns compile")
});

/// Stable error/warning codes surfaced to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    FileRequired,
    InvalidFileType,
    FileReadError,
    FileEmpty,
    FileTooLarge,
    UnexpectedMimeType,
    InvalidPdf,
    InvalidDocx,
    SecurityViolation,
    Required,
    TooShort,
    TooLong,
    ShortDescription,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
    pub code: IssueCode,
}

/// Full diagnostic report of one validation call.
///
/// Invariant: `is_valid` is false exactly when `errors` is non-empty; both are
/// only ever updated together through [`ValidationOutcome::error`].
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub metadata: Map<String, Value>,
}

impl Default for ValidationOutcome {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            metadata: Map::new(),
        }
    }
}

impl ValidationOutcome {
    fn error(&mut self, field: &'static str, code: IssueCode, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field,
            message: message.into(),
            code,
        });
        self.is_valid = false;
    }

    fn warn(&mut self, field: &'static str, code: IssueCode, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field,
            message: message.into(),
            code,
        });
    }

    /// Converts an invalid outcome into the 422 error envelope, passing a
    /// valid one through with its metadata intact.
    pub fn into_result(self, field: &'static str) -> Result<Self, AppError> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(AppError::Validation {
                field,
                outcome: self,
            })
        }
    }
}

/// An upload as seen by the validator. The handler buffers the multipart field
/// once and lends the same bytes to validation and text extraction, so there
/// is no stream position to reset. A failed body read is carried as `Err` and
/// reported as `FILE_READ_ERROR`.
pub struct FileUpload<'a> {
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub content: Result<&'a [u8], String>,
}

/// Validates an uploaded resume file.
///
/// Check order: presence → extension → readability → emptiness → size →
/// declared MIME (warning only) → magic bytes → suspicious content. The first
/// five are terminal; nothing after them runs once one fails.
pub fn validate_file_upload(file: &FileUpload) -> ValidationOutcome {
    let mut result = ValidationOutcome::default();

    let filename = match file.filename {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            result.error("file", IssueCode::FileRequired, "No file provided");
            return result;
        }
    };

    let extension = file_extension(filename);
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        result.error(
            "file",
            IssueCode::InvalidFileType,
            format!(
                "File type not allowed. Allowed types: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        );
        return result;
    }

    let content = match &file.content {
        Ok(bytes) => *bytes,
        Err(reason) => {
            result.error(
                "file",
                IssueCode::FileReadError,
                format!("Could not read file: {reason}"),
            );
            return result;
        }
    };

    if content.is_empty() {
        result.error("file", IssueCode::FileEmpty, "File is empty");
        return result;
    }

    if content.len() > MAX_FILE_SIZE {
        result.error(
            "file",
            IssueCode::FileTooLarge,
            format!(
                "File size ({:.2}MB) exceeds limit ({}MB)",
                content.len() as f64 / 1024.0 / 1024.0,
                MAX_FILE_SIZE / 1024 / 1024
            ),
        );
        return result;
    }

    if let Some(mime) = file.content_type {
        if !ALLOWED_MIME_TYPES.contains(&mime) {
            result.warn(
                "content_type",
                IssueCode::UnexpectedMimeType,
                format!("Unexpected MIME type: {mime}"),
            );
        }
    }

    match extension.as_str() {
        ".pdf" if !content.starts_with(b"%PDF-") => {
            result.error(
                "file",
                IssueCode::InvalidPdf,
                "File does not appear to be a valid PDF",
            );
        }
        ".docx" if !content.starts_with(b"PK") => {
            result.error(
                "file",
                IssueCode::InvalidDocx,
                "File does not appear to be a valid DOCX document",
            );
        }
        _ => {}
    }

    if SUSPICIOUS_CONTENT.is_match(content) {
        result.error(
            "file",
            IssueCode::SecurityViolation,
            "File contains potentially malicious content",
        );
    }

    result
        .metadata
        .insert("filename".into(), Value::from(sanitize_filename(filename)));
    result
        .metadata
        .insert("file_size".into(), Value::from(content.len() as u64));
    result.metadata.insert(
        "content_type".into(),
        file.content_type.map_or(Value::Null, Value::from),
    );
    result
        .metadata
        .insert("file_extension".into(), Value::from(extension));

    result
}

/// Validates job-description text. The sanitized form is returned in
/// `metadata["sanitized_content"]`; callers must persist that, never the raw
/// input.
pub fn validate_job_description(job_description: &str) -> ValidationOutcome {
    let mut result = ValidationOutcome::default();

    if job_description.trim().is_empty() {
        result.error(
            "job_description",
            IssueCode::Required,
            "Job description is required",
        );
        return result;
    }

    let sanitized = sanitize_text_input(job_description, None);
    let sanitized_length = sanitized.chars().count();
    let word_count = sanitized.split_whitespace().count();

    if sanitized_length < MIN_JOB_DESCRIPTION_CHARS {
        result.error(
            "job_description",
            IssueCode::TooShort,
            "Job description is too short (minimum 10 characters)",
        );
    } else if sanitized_length > MAX_JOB_DESCRIPTION_CHARS {
        result.error(
            "job_description",
            IssueCode::TooLong,
            "Job description is too long (maximum 10,000 characters)",
        );
    }

    if word_count < MIN_JOB_DESCRIPTION_WORDS {
        result.warn(
            "job_description",
            IssueCode::ShortDescription,
            "Job description is quite short. More details may improve analysis quality.",
        );
    }

    result.metadata.insert(
        "original_length".into(),
        Value::from(job_description.chars().count() as u64),
    );
    result
        .metadata
        .insert("sanitized_length".into(), Value::from(sanitized_length as u64));
    result
        .metadata
        .insert("word_count".into(), Value::from(word_count as u64));
    result
        .metadata
        .insert("sanitized_content".into(), Value::from(sanitized));

    result
}

fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => format!(".{}", ext.to_lowercase()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload<'a>(filename: &'a str, content_type: Option<&'a str>, content: &'a [u8]) -> FileUpload<'a> {
        FileUpload {
            filename: Some(filename),
            content_type,
            content: Ok(content),
        }
    }

    fn has_error(outcome: &ValidationOutcome, code: IssueCode) -> bool {
        outcome.errors.iter().any(|e| e.code == code)
    }

    #[test]
    fn test_missing_file_is_required() {
        let result = validate_file_upload(&FileUpload {
            filename: None,
            content_type: None,
            content: Ok(b""),
        });
        assert!(!result.is_valid);
        assert!(has_error(&result, IssueCode::FileRequired));
        assert!(result.metadata.is_empty());
    }

    #[test]
    fn test_blank_filename_is_required() {
        let result = validate_file_upload(&upload("   ", None, b"%PDF-data"));
        assert!(has_error(&result, IssueCode::FileRequired));
    }

    #[test]
    fn test_disallowed_extension_is_terminal() {
        let result = validate_file_upload(&upload("resume.exe", None, b"MZ\x90\x00"));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(has_error(&result, IssueCode::InvalidFileType));
        // Content-based checks never ran.
        assert!(result.metadata.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        let result = validate_file_upload(&upload("resume.PDF", None, b"%PDF-1.4 hello"));
        assert!(result.is_valid);
        assert_eq!(result.metadata["file_extension"], ".pdf");
    }

    #[test]
    fn test_read_failure_reported() {
        let result = validate_file_upload(&FileUpload {
            filename: Some("resume.pdf"),
            content_type: None,
            content: Err("connection reset".to_string()),
        });
        assert!(has_error(&result, IssueCode::FileReadError));
        assert!(result.errors[0].message.contains("connection reset"));
    }

    #[test]
    fn test_empty_file_rejected() {
        let result = validate_file_upload(&upload("resume.pdf", None, b""));
        assert!(!result.is_valid);
        assert!(has_error(&result, IssueCode::FileEmpty));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let content = vec![b'a'; MAX_FILE_SIZE + 1];
        let result = validate_file_upload(&upload("resume.pdf", None, &content));
        assert!(has_error(&result, IssueCode::FileTooLarge));
    }

    #[test]
    fn test_unexpected_mime_type_is_warning_only() {
        let result = validate_file_upload(&upload(
            "resume.pdf",
            Some("text/plain"),
            b"%PDF-1.4 content here",
        ));
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, IssueCode::UnexpectedMimeType);
    }

    #[test]
    fn test_pdf_magic_bytes_enforced() {
        let result = validate_file_upload(&upload("resume.pdf", None, b"not a pdf at all"));
        assert!(has_error(&result, IssueCode::InvalidPdf));
    }

    #[test]
    fn test_docx_magic_bytes_enforced() {
        let result = validate_file_upload(&upload("resume.docx", None, b"garbage"));
        assert!(has_error(&result, IssueCode::InvalidDocx));
    }

    #[test]
    fn test_doc_has_no_magic_check() {
        let result = validate_file_upload(&upload("resume.doc", None, b"legacy word bytes"));
        assert!(result.is_valid);
    }

    #[test]
    fn test_script_tag_flags_security_violation() {
        let result = validate_file_upload(&upload(
            "resume.pdf",
            None,
            b"%PDF-1.4 <ScRiPt>alert(1)</script>",
        ));
        assert!(!result.is_valid);
        assert!(has_error(&result, IssueCode::SecurityViolation));
    }

    #[test]
    fn test_security_scan_runs_despite_valid_magic() {
        let result = validate_file_upload(&upload(
            "resume.docx",
            None,
            b"PK\x03\x04 JAVASCRIPT:void(0)",
        ));
        assert!(has_error(&result, IssueCode::SecurityViolation));
    }

    #[test]
    fn test_php_tag_flags_security_violation() {
        let result = validate_file_upload(&upload("resume.pdf", None, b"%PDF-1.4 <?php evil();"));
        assert!(has_error(&result, IssueCode::SecurityViolation));
    }

    #[test]
    fn test_valid_pdf_passes_with_metadata() {
        let result = validate_file_upload(&upload(
            "my resume.pdf",
            Some("application/pdf"),
            b"%PDF-1.4 clean resume content",
        ));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.metadata["filename"], "my resume.pdf");
        assert_eq!(result.metadata["file_size"], 29);
        assert_eq!(result.metadata["content_type"], "application/pdf");
        assert_eq!(result.metadata["file_extension"], ".pdf");
    }

    #[test]
    fn test_metadata_filename_is_sanitized() {
        let result = validate_file_upload(&upload(
            "../../etc/resume.pdf",
            None,
            b"%PDF-1.4 content body",
        ));
        assert_eq!(result.metadata["filename"], "resume.pdf");
    }

    #[test]
    fn test_is_valid_tracks_errors_invariant() {
        let cases: Vec<ValidationOutcome> = vec![
            validate_file_upload(&upload("a.exe", None, b"x")),
            validate_file_upload(&upload("a.pdf", None, b"%PDF-1.4 ok content")),
            validate_job_description(""),
            validate_job_description("A detailed description of the role and its requirements."),
        ];
        for outcome in cases {
            assert_eq!(outcome.is_valid, outcome.errors.is_empty());
        }
    }

    #[test]
    fn test_job_description_required() {
        for input in ["", "   ", "\n\t"] {
            let result = validate_job_description(input);
            assert!(!result.is_valid);
            assert!(has_error(&result, IssueCode::Required));
        }
    }

    #[test]
    fn test_job_description_too_short() {
        let result = validate_job_description("too short");
        assert!(has_error(&result, IssueCode::TooShort));
    }

    #[test]
    fn test_job_description_too_long() {
        let long = "word ".repeat(2500);
        let result = validate_job_description(&long);
        assert!(has_error(&result, IssueCode::TooLong));
    }

    #[test]
    fn test_length_measured_after_sanitization() {
        // Raw input is long enough, but sanitization strips it below the
        // minimum.
        let result = validate_job_description("javascript:pay hi");
        assert!(has_error(&result, IssueCode::TooShort));
    }

    #[test]
    fn test_short_description_warns_without_invalidating() {
        let result = validate_job_description("Senior backend engineer wanted for platform work");
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, IssueCode::ShortDescription);
    }

    #[test]
    fn test_long_description_has_no_warning() {
        let text = "We are hiring a senior engineer to design build and operate \
                    distributed backend services with strong ownership across the \
                    full lifecycle from design review through production support";
        let result = validate_job_description(text);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_job_description_metadata() {
        let result = validate_job_description("  A &  B description of the open role  ");
        let meta = &result.metadata;
        assert_eq!(meta["sanitized_content"], "A &amp; B description of the open role");
        assert_eq!(meta["word_count"], 8);
        assert!(meta["original_length"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_issue_codes_serialize_screaming_snake() {
        assert_eq!(
            serde_json::to_value(IssueCode::InvalidFileType).unwrap(),
            "INVALID_FILE_TYPE"
        );
        assert_eq!(
            serde_json::to_value(IssueCode::SecurityViolation).unwrap(),
            "SECURITY_VIOLATION"
        );
    }
}
