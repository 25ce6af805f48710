//! Plain-text extraction from downloaded PDF, DOCX and text documents

use super::source::FetchedDocument;
use crate::error::{QaError, Result};
use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

pub const EXTRACTION_FAILED: &str = "Document text extraction failed or document is too short";

const DOCX_CONTENT_TYPE: &str = "wordprocessingml";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// PDF by declared content type (any case) or by the `%PDF-` magic prefix
pub fn is_pdf(content_type: Option<&str>, head: &[u8]) -> bool {
    let ct = content_type.unwrap_or("").to_ascii_lowercase();
    ct.contains("application/pdf") || head.starts_with(b"%PDF-")
}

/// Word document by content type, `.docx` path suffix, or zip magic bytes
pub fn is_docx(content_type: Option<&str>, path: Option<&str>, head: &[u8]) -> bool {
    let ct = content_type.unwrap_or("").to_ascii_lowercase();
    let by_path = path
        .map(|p| p.to_ascii_lowercase().ends_with(".docx"))
        .unwrap_or(false);

    ct.contains(DOCX_CONTENT_TYPE) || by_path || head.starts_with(ZIP_MAGIC)
}

/// Extract text from a PDF, DOCX or plain-text body
///
/// A PDF that fails to parse is decoded as UTF-8 instead; a DOCX that fails
/// to parse is an extraction failure. Blank text, or text shorter than
/// `min_chars` characters, is rejected.
pub fn extract_text(document: &FetchedDocument, min_chars: usize) -> Result<String> {
    let bytes = document.bytes.as_ref();
    let content_type = document.content_type.as_deref();

    let text = if is_pdf(content_type, bytes) {
        match extract_pdf(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("PDF extraction failed, decoding raw bytes as text: {}", e);
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    } else if is_docx(content_type, document.path.as_deref(), bytes) {
        extract_docx(bytes)?
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    let chars = text.chars().count();
    if text.trim().is_empty() || chars < min_chars {
        return Err(QaError::ExtractionFailed(EXTRACTION_FAILED.to_string()));
    }

    debug!("Extracted {} characters of text", chars);
    Ok(text)
}

/// pdf-extract panics on some malformed inputs, so panics are treated as failures
fn extract_pdf(bytes: &[u8]) -> Result<String> {
    panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
        .map_err(|_| QaError::ExtractionFailed("PDF parser panicked".to_string()))?
        .map_err(|e| QaError::ExtractionFailed(format!("Failed to extract PDF text: {}", e)))
}

/// Body paragraphs, one per line; tables and images are skipped
fn extract_docx(bytes: &[u8]) -> Result<String> {
    let docx = panic::catch_unwind(AssertUnwindSafe(|| read_docx(bytes)))
        .map_err(|_| QaError::ExtractionFailed("DOCX parser panicked".to_string()))?
        .map_err(|e| QaError::ExtractionFailed(format!("Failed to extract DOCX text: {}", e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();

    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }

    text
}
