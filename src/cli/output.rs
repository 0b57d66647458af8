//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a retrieved chunk.
    pub fn search_result(rank: usize, score: f32, page: Option<u32>, content: &str) {
        let page = page
            .map(|p| format!("page {}", p + 1))
            .unwrap_or_else(|| "page ?".to_string());
        println!(
            "\n{} {} {} (score: {:.3})",
            style(">>").green(),
            style(format!("#{}", rank)).bold(),
            style(page).cyan(),
            score
        );
        println!("   {}", content_preview(content, 300));
    }

    /// Print a grading confidence, colored by how trustworthy it is.
    pub fn confidence(score: f64) {
        let text = format!("{:.0}", score);
        let styled = if score >= 70.0 {
            style(text).green()
        } else if score > 0.0 {
            style(text).yellow()
        } else {
            style(text).red()
        };
        println!("  {}: {}", style("Confidence").dim(), styled.bold());
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let template = ProgressStyle::default_spinner().template("{spinner:.green} {msg}");
        if let Ok(spinner_style) = template {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis, on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
