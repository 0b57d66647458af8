//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::{mask, Credentials, Settings};
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, path: Option<&PathBuf>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);

            match Credentials::from_env() {
                Ok(credentials) => {
                    Output::header("Credentials");
                    Output::kv("Model API key", &mask(&credentials.llm_api_key));
                    Output::kv("Index API key", &mask(&credentials.index_api_key));
                    Output::kv("Index name", &credentials.index_name);
                }
                Err(e) => Output::warning(&e.to_string()),
            }
        }

        ConfigAction::Path => {
            let config_path = path.cloned().unwrap_or_else(Settings::default_config_path);
            println!("{}", config_path.display());
            if !config_path.exists() {
                Output::info("File does not exist; built-in defaults are in use.");
            }
        }
    }

    Ok(())
}
