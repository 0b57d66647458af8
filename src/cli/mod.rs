//! CLI module for Folio.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Folio - Question answering over an eBook
///
/// Ingests a PDF into a hosted vector index and answers questions using only
/// its contents, grading each answer for groundedness.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the eBook, split it, embed it and store it in the index
    Ingest {
        /// PDF URL to ingest instead of the configured eBook
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Ask a question and get an answer from the eBook
    Ask {
        /// The question to ask
        question: String,

        /// Skip grading and print the answer only
        #[arg(long)]
        no_grade: bool,
    },

    /// Show the chunks retrieved for a query
    Search {
        /// Search query
        query: String,

        /// Number of chunks to retrieve (defaults to retrieval.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from(["folio", "ask", "What is an agent?", "--no-grade"]);
        match cli.command {
            Commands::Ask { question, no_grade } => {
                assert_eq!(question, "What is an agent?");
                assert!(no_grade);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_with_global_flags() {
        let cli = Cli::parse_from([
            "folio", "-vv", "search", "planning", "-k", "5", "--config", "x.toml",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some("x.toml"));
        assert!(matches!(cli.command, Commands::Search { top_k: Some(5), .. }));
    }

    #[test]
    fn test_serve_defaults_to_settings() {
        let cli = Cli::parse_from(["folio", "serve"]);
        assert!(matches!(cli.command, Commands::Serve { host: None, port: None }));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
