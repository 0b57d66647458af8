//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::services::Services;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, top_k: Option<usize>, settings: Settings) -> Result<()> {
    let credentials = match preflight::check(Operation::Search) {
        Ok(credentials) => credentials,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info(&preflight::hint());
            return Err(e.into());
        }
    };

    let services = Services::new(settings, &credentials)?;
    let mut retriever = services.retriever();
    if let Some(k) = top_k {
        retriever = retriever.with_top_k(k);
    }

    let spinner = Output::spinner("Searching...");
    let results = retriever.search(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            if results.is_empty() {
                Output::warning("No chunks found. Has the eBook been ingested?");
            } else {
                Output::success(&format!("Found {} chunks", results.len()));
                for (rank, result) in results.iter().enumerate() {
                    Output::search_result(rank + 1, result.score, result.page, &result.content);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
