//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::services::Services;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, no_grade: bool, settings: Settings) -> Result<()> {
    let credentials = match preflight::check(Operation::Ask) {
        Ok(credentials) => credentials,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info(&preflight::hint());
            return Err(e.into());
        }
    };

    let services = Services::new(settings, &credentials)?;
    let pipeline = services.pipeline();

    let spinner = Output::spinner("Reading the eBook...");

    if no_grade {
        let result = pipeline.answer(question).await;
        spinner.finish_and_clear();
        match result {
            Ok(generated) => println!("\n{}\n", generated.generation),
            Err(e) => {
                Output::error(&format!("Failed to generate answer: {}", e));
                return Err(e.into());
            }
        }
    } else {
        let result = pipeline.run(question).await;
        spinner.finish_and_clear();
        match result {
            Ok(graded) => {
                println!("\n{}\n", graded.generation);
                Output::confidence(graded.confidence);
            }
            Err(e) => {
                Output::error(&format!("Failed to generate answer: {}", e));
                return Err(e.into());
            }
        }
    }

    Ok(())
}
