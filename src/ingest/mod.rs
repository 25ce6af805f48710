//! Document loading: download, extract, validate
//!
//! Produces the [`PolicyDocument`] the answer engine works on.

pub mod extract;
pub mod source;

pub use extract::{extract_text, is_docx, is_pdf, EXTRACTION_FAILED};
pub use source::{parse_document_url, DocumentSource, FetchedDocument, HttpDocumentSource};

use crate::answering::PolicyDocument;
use crate::error::{QaError, Result};
use crate::metrics::METRICS;
use std::time::Instant;
use tracing::{error, info};

/// Fetch a document and turn it into policy text
pub async fn load_document(
    source: &dyn DocumentSource,
    url: &str,
    min_text_chars: usize,
) -> Result<PolicyDocument> {
    let start = Instant::now();

    let result = async {
        let fetched = source.fetch(url).await?;
        let size = fetched.bytes.len();

        let text = tokio::task::spawn_blocking(move || extract_text(&fetched, min_text_chars))
            .await
            .map_err(|e| QaError::Internal(format!("Extraction task failed: {}", e)))??;

        info!("Loaded document: {} bytes, {} characters of text", size, text.chars().count());
        Ok::<_, QaError>(PolicyDocument::new(text))
    }
    .await;

    let elapsed = start.elapsed().as_secs_f64();
    METRICS.record_document_load(result.is_ok(), elapsed);

    if let Err(ref e) = result {
        error!("Document processing failed: {}", e);
    }

    result
}
