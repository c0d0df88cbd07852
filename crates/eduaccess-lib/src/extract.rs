//! Text extraction from uploaded documents.
//!
//! [`DocumentExtractor`] picks an extractor by file extension: plain-text
//! formats are read as UTF-8, PDFs go through `pdf_oxide` on the blocking
//! pool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pdf_oxide::PdfDocument;
use unicode_normalization::UnicodeNormalization;

/// Extensions read as UTF-8 text.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "text", "md", "markdown", "csv", "tsv", "log", "json", "xml", "html", "htm", "srt",
    "vtt",
];

const UTF8_BOM: &str = "\u{feff}";

const PDF_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, path: &Path) -> Result<String, ExtractError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to extract text: unsupported file type '{0}'")]
    UnsupportedFormat(String),
    #[error("Failed to extract text: file is not valid UTF-8 ({0})")]
    InvalidEncoding(String),
    #[error("Failed to extract text: {0}")]
    Pdf(String),
    #[error("Failed to extract text: no text found in {0}")]
    NoTextFound(String),
    #[error("Failed to extract text: {0}")]
    Io(#[from] std::io::Error),
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ─── Dispatch ──────────────────────────────────────────────────────────────

/// Routes each file to the extractor registered for its extension.
pub struct DocumentExtractor {
    by_extension: HashMap<String, Arc<dyn TextExtractor>>,
}

impl DocumentExtractor {
    pub fn new(extractors: Vec<(&str, Arc<dyn TextExtractor>)>) -> Self {
        Self {
            by_extension: extractors
                .into_iter()
                .map(|(ext, extractor)| (ext.to_ascii_lowercase(), extractor))
                .collect(),
        }
    }

    /// Plain-text formats plus PDF.
    pub fn standard() -> Self {
        let text: Arc<dyn TextExtractor> = Arc::new(PlainTextExtractor);
        let mut extractors: Vec<(&str, Arc<dyn TextExtractor>)> = TEXT_EXTENSIONS
            .iter()
            .map(|ext| (*ext, text.clone()))
            .collect();
        extractors.push(("pdf", Arc::new(PdfExtractor)));
        Self::new(extractors)
    }
}

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let ext = extension_of(path);
        let extractor = self
            .by_extension
            .get(&ext)
            .ok_or_else(|| ExtractError::UnsupportedFormat(ext.clone()))?;
        extractor.extract_text(path).await
    }
}

// ─── Plain text ────────────────────────────────────────────────────────────

/// Reads plain-text documents from local disk.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    fn is_supported(ext: &str) -> bool {
        TEXT_EXTENSIONS.contains(&ext)
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let ext = extension_of(path);
        if !Self::is_supported(&ext) {
            return Err(ExtractError::UnsupportedFormat(ext));
        }

        let data = tokio::fs::read(path).await?;
        let text =
            String::from_utf8(data).map_err(|e| ExtractError::InvalidEncoding(e.to_string()))?;

        tracing::debug!(chars = text.len(), ext = %ext, "extracted text");

        Ok(text
            .strip_prefix(UTF8_BOM)
            .map(str::to_string)
            .unwrap_or(text))
    }
}

// ─── PDF ───────────────────────────────────────────────────────────────────

/// Extracts the text layer of a PDF, page by page. Scanned PDFs without a
/// text layer yield [`ExtractError::NoTextFound`].
pub struct PdfExtractor;

impl PdfExtractor {
    fn extract_pages(path: &Path) -> Result<Vec<String>, ExtractError> {
        let doc = PdfDocument::open(path)
            .map_err(|e| ExtractError::Pdf(format!("failed to parse PDF: {e}")))?;
        let page_count = doc
            .page_count()
            .map_err(|e| ExtractError::Pdf(format!("failed to read page count: {e}")))?;

        let mut pages = Vec::with_capacity(page_count);
        for index in 0..page_count {
            match doc.extract_text(index) {
                Ok(text) => pages.push(text),
                Err(e) => tracing::warn!(page = index + 1, error = %e, "skipping unreadable page"),
            }
        }
        Ok(pages)
    }
}

/// NFKC-fold ligatures and trim each line; blank lines collapse away.
fn clean_page(raw: &str) -> String {
    let folded: String = raw.nfkc().collect();
    folded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let owned: PathBuf = path.to_path_buf();
        let pages = tokio::time::timeout(
            PDF_TIMEOUT,
            tokio::task::spawn_blocking(move || Self::extract_pages(&owned)),
        )
        .await
        .map_err(|_| ExtractError::Pdf("PDF extraction timed out".to_string()))?
        .map_err(|e| ExtractError::Pdf(format!("task join error: {e}")))??;

        let page_count = pages.len();
        let text = pages
            .iter()
            .map(|p| clean_page(p))
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        if text.is_empty() {
            return Err(ExtractError::NoTextFound(display_name(path)));
        }

        tracing::info!(page_count, chars = text.len(), "PDF text extraction complete");
        Ok(text)
    }
}
