use crate::traits::TextExtractor;
use crate::types::{DigestError, FetchConfig, Result};
use crate::Fetcher;
use async_trait::async_trait;
use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Derive the PDF download link from an arXiv abstract page link:
/// `/abs/` becomes `/pdf/` and `.pdf` is appended.
pub fn pdf_url_for(paper_link: &str) -> Result<String> {
    let link = paper_link.trim();
    if link.is_empty() {
        return Err(DigestError::Extraction("Paper has no link".to_string()));
    }

    let pdf_url = link.replace("/abs/", "/pdf/") + ".pdf";
    url::Url::parse(&pdf_url)
        .map_err(|e| DigestError::Extraction(format!("Invalid PDF URL {}: {}", pdf_url, e)))?;
    Ok(pdf_url)
}

/// Downloads a paper's PDF into a private temporary file and pulls the text
/// out of every page.
pub struct PdfTextExtractor {
    fetcher: Fetcher,
    temp_dir: Option<PathBuf>,
}

impl PdfTextExtractor {
    pub fn new(fetch_config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
            temp_dir: None,
        })
    }

    /// Place downloads in `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_full_text(&self, paper_link: &str) -> Result<String> {
        let pdf_url = pdf_url_for(paper_link)?;

        let bytes = self
            .fetcher
            .fetch_bytes(&pdf_url)
            .await
            .map_err(|e| DigestError::Extraction(format!("Failed to download PDF: {}", e)))?;

        // Removed from disk when `file` drops, whichever way we leave.
        let mut builder = tempfile::Builder::new();
        builder.prefix("arxiv-paper-").suffix(".pdf");
        let created = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        let mut file = created
            .map_err(|e| DigestError::Extraction(format!("Failed to create temporary file: {}", e)))?;
        file.write_all(&bytes)
            .and_then(|_| file.flush())
            .map_err(|e| DigestError::Extraction(format!("Failed to write temporary file: {}", e)))?;

        let text = extract_pdf_text(file.path())?;
        info!("Extracted {} characters from {}", text.chars().count(), pdf_url);
        Ok(text)
    }
}

/// Concatenated text of all pages. Pages that yield no text contribute
/// nothing; a document that cannot be opened is an error.
pub fn extract_pdf_text(pdf_path: &Path) -> Result<String> {
    let document = Document::load(pdf_path).map_err(|e| {
        DigestError::Extraction(format!("Failed to open PDF {}: {}", pdf_path.display(), e))
    })?;

    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => debug!("No text on page {} of {}: {}", page_number, pdf_path.display(), e),
        }
    }

    Ok(text)
}
