//! Chat model abstraction.
//!
//! Free-text completion plus a structured variant that parses the model's
//! JSON reply into a typed record.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::{FolioError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Shape the model is asked to reply in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one prompt, optionally preceded by a system message, and return the reply.
    async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str,
        format: OutputFormat,
    ) -> Result<String>;
}

/// Ask the model for JSON and parse it as `T`.
pub async fn complete_structured<T: DeserializeOwned>(
    model: &dyn ChatModel,
    system: Option<&str>,
    prompt: &str,
) -> Result<T> {
    let reply = model.complete(system, prompt, OutputFormat::Json).await?;
    parse_structured(&reply)
}

/// Parse a model reply into `T`.
///
/// Models sometimes wrap JSON in prose or a markdown fence, so the outermost
/// `{...}` span is parsed when present.
pub fn parse_structured<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let json_str = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if end > start => &reply[start..=end],
        _ => reply,
    };

    serde_json::from_str(json_str).map_err(|e| {
        let preview: String = reply.chars().take(500).collect();
        FolioError::Parse(format!("{}. Response was: {}", e, preview))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Verdict {
        ok: bool,
        score: f64,
    }

    #[test]
    fn test_parse_plain_json() {
        let v: Verdict = parse_structured(r#"{"ok": true, "score": 12.5}"#).unwrap();
        assert!(v.ok);
        assert_eq!(v.score, 12.5);
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "Here you go:\n```json\n{\"ok\": false, \"score\": 3}\n```";
        let v: Verdict = parse_structured(reply).unwrap();
        assert!(!v.ok);
        assert_eq!(v.score, 3.0);
    }

    #[test]
    fn test_malformed_reply_is_parse_error() {
        let err = parse_structured::<Verdict>("I think it is grounded.").unwrap_err();
        assert!(matches!(err, FolioError::Parse(_)));

        let err = parse_structured::<Verdict>(r#"{"ok": "yes"}"#).unwrap_err();
        assert!(matches!(err, FolioError::Parse(_)));
    }
}
