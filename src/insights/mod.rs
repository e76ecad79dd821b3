/// Insight synthesis on top of a pluggable text generator
///
/// The analytics layer produces numbers; this module turns them into
/// prompts, sends them to a `TextGenerator` and parses the fenced JSON that
/// comes back. Every public entry point degrades to a fixed, deterministic
/// payload when generation or parsing fails, so callers never see an error
/// from a misbehaving model.

pub mod openai;
pub mod parser;
pub mod prompt;
pub mod recommendation;
pub mod synthesis;

pub use openai::{OpenAiConfig, OpenAiGenerator};
pub use parser::{parse_fenced_json, ParseError};
pub use prompt::Prompt;
pub use recommendation::{Intensity, WorkoutRecommendation, WorkoutRecommender};
pub use synthesis::{Impact, Insight, InsightKind, InsightSynthesizer, InsightsResult};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the text generation collaborator
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No text generator configured (set OPENAI_API_KEY to enable AI insights)")]
    NotConfigured,

    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Provider returned an empty response")]
    EmptyResponse,
}

/// Anything that failed between building a prompt and holding a typed payload
#[derive(Error, Debug)]
pub enum InsightError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Produces free text for a prompt
///
/// Implementations are injected into the synthesizers; nothing in this
/// crate holds a global client.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Generator used when no provider credentials are available
///
/// Always fails with `NotConfigured`, which routes every caller to its
/// fallback payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _prompt: &Prompt) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_generator_always_fails() {
        let prompt = Prompt::new("system", "user");
        let result = UnconfiguredGenerator.generate(&prompt).await;
        assert!(matches!(result, Err(GenerationError::NotConfigured)));
    }

    #[test]
    fn test_error_messages() {
        let err = GenerationError::Provider {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "Provider returned HTTP 429: rate limited");

        let wrapped: InsightError = GenerationError::EmptyResponse.into();
        assert_eq!(wrapped.to_string(), "Provider returned an empty response");
    }
}
