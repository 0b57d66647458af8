//! Serve command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::server::{self, AppState};
use anyhow::Result;
use std::sync::Arc;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let state = Arc::new(AppState::load(settings).await);
    let listener = server::bind(&host, port).await?;

    Output::header("Folio API Server");
    println!();
    Output::success(&format!("Listening on http://{}:{}", host, port));
    if !state.is_ready() {
        Output::warning("AI Brain not loaded; /ask will return errors. Check the logs.");
    }
    println!();
    println!("Endpoints:");
    Output::kv("Docs", "GET  /docs");
    Output::kv("OpenAPI", "GET  /openapi.json");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::serve(listener, state).await?;

    Ok(())
}
