//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::document_source::DocumentSource;
use crate::services::Services;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(source: Option<String>, settings: Settings) -> Result<()> {
    let credentials = match preflight::check(Operation::Ingest) {
        Ok(credentials) => credentials,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info(&preflight::hint());
            return Err(e.into());
        }
    };

    let services = Services::new(settings, &credentials)?;
    let source = services.source(source.as_deref())?;
    let ingestor = services.ingestor();

    Output::info(&format!("Ingesting {}", source.location()));
    let spinner = Output::spinner("Downloading, splitting and embedding...");
    let result = ingestor.run(&source).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            if report.index_created {
                Output::info(&format!("Created index '{}'", credentials.index_name));
            }
            Output::success("Ingestion complete");
            Output::kv("Source", &report.source);
            Output::kv("Pages", &report.pages.to_string());
            Output::kv("Chunks indexed", &report.chunks_indexed.to_string());
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
