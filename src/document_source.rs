//! Document sources for ingestion.

use crate::error::{FolioError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Something that yields a document's text, one string per page.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Where the document comes from, recorded on every chunk.
    fn location(&self) -> &str;

    /// Fetch the document and extract its text per page.
    async fn load_pages(&self) -> Result<Vec<String>>;
}

/// A PDF fetched over HTTP.
#[derive(Debug)]
pub struct PdfUrlSource {
    client: reqwest::Client,
    url: String,
}

impl PdfUrlSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        url::Url::parse(url)
            .map_err(|e| FolioError::InvalidInput(format!("Invalid document URL {}: {}", url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FolioError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl DocumentSource for PdfUrlSource {
    fn location(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn load_pages(&self) -> Result<Vec<String>> {
        info!("Downloading {}", self.url);
        let bytes = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        debug!("Downloaded {} bytes", bytes.len());

        // Extraction is CPU-bound
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .await
        .map_err(|e| FolioError::Pdf(format!("Extraction task failed: {}", e)))?
        .map_err(|e| FolioError::Pdf(e.to_string()))?;

        info!("Extracted {} pages", pages.len());
        Ok(pages)
    }
}
