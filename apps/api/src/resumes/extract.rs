//! Text extraction from uploaded documents.
//!
//! PDF goes through `pdf-extract`, DOCX through `docx-rs`. Legacy `.doc` is
//! rejected with guidance — there is no reliable pure-Rust reader for it.

use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF processing error: {0}")]
    Pdf(String),

    #[error("DOCX processing error: {0}")]
    Docx(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("No text content found in document")]
    Empty,
}

/// Extracts and normalizes text from a validated upload. The extension has
/// already passed the allow-list, so anything else here is a programming
/// error reported as unsupported.
pub fn extract_text(extension: &str, content: &[u8]) -> Result<String, ExtractError> {
    let text = match extension {
        ".pdf" => extract_pdf(content)?,
        ".docx" => extract_docx(content)?,
        ".doc" => {
            return Err(ExtractError::Unsupported(
                "DOC format support is limited. Please convert to DOCX format for better text extraction.".to_string(),
            ))
        }
        other => {
            return Err(ExtractError::Unsupported(format!(
                "Unsupported file type: {other}"
            )))
        }
    };

    let cleaned = normalize_text(&text);
    if cleaned.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(cleaned)
}

fn extract_pdf(content: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(content).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Walks the DOCX body: paragraph runs become lines, table rows become
/// `cell | cell | cell` lines.
fn extract_docx(content: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(content).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut blocks: Vec<String> = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => {
                let text = paragraph_text(paragraph);
                if !text.is_empty() {
                    blocks.push(text);
                }
            }
            DocumentChild::Table(table) => {
                for row in &table.rows {
                    match row {
                        TableChild::TableRow(row) => {
                            let cells: Vec<String> = row
                                .cells
                                .iter()
                                .filter_map(|cell| match cell {
                                    TableRowChild::TableCell(cell) => {
                                        let text = cell
                                            .children
                                            .iter()
                                            .filter_map(|content| match content {
                                                TableCellContent::Paragraph(p) => {
                                                    let t = paragraph_text(p);
                                                    (!t.is_empty()).then_some(t)
                                                }
                                                _ => None,
                                            })
                                            .collect::<Vec<_>>()
                                            .join(" ");
                                        (!text.is_empty()).then_some(text)
                                    }
                                })
                                .collect();
                            if !cells.is_empty() {
                                blocks.push(cells.join(" | "));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(blocks.join("\n"))
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(text) = run_child {
                    out.push_str(&text.text);
                }
            }
        }
    }
    out.trim().to_string()
}

/// Normalizes extracted text: per-line whitespace collapse, blank lines
/// dropped.
fn normalize_text(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}
