//! LLM inference abstraction.
//!
//! The pipeline consumes inference twice (speaker attribution and metadata
//! extraction) through the [`ChatModel`] trait, so tests can inject
//! deterministic models. Responses are free text that is expected to
//! contain JSON, optionally wrapped in a fenced code block; callers parse
//! with an explicit fallback rather than trusting structure.

mod openai;

pub use openai::OpenAiChat;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for chat-completion inference services.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a system + user prompt and return the raw response text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Strip a surrounding fenced code block, if present.
///
/// Models sometimes wrap JSON output in ``` fences (with or without a
/// language tag); the fence must be removed before parsing.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let body = match trimmed.split_once('\n') {
        Some((_, rest)) => rest,
        None => return trimmed,
    };
    let body = match body.rsplit_once("```") {
        Some((inner, _)) => inner,
        None => body,
    };
    body.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfenced_content_passes_through() {
        assert_eq!(strip_code_fences(r#"[{"index": 0}]"#), r#"[{"index": 0}]"#);
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_plain_fence_stripped() {
        let fenced = "```\n[1, 2, 3]\n```";
        assert_eq!(strip_code_fences(fenced), "[1, 2, 3]");
    }

    #[test]
    fn test_json_language_fence_stripped() {
        let fenced = "```json\n{\"title\": \"Ep\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"title\": \"Ep\"}");
    }

    #[test]
    fn test_unterminated_fence() {
        let fenced = "```json\n{\"title\": \"Ep\"}";
        assert_eq!(strip_code_fences(fenced), "{\"title\": \"Ep\"}");
    }
}
