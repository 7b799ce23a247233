//! Prompt-to-HTML generation boundary.
//!
//! Generation is an opaque remote collaborator, not a storage operation:
//! there is no local fallback, and version numbers are assigned by the
//! store when the result is appended, not by the service.

use thiserror::Error;

/// Outcome of a generation request.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Complete self-contained HTML document. Opaque to the core.
    pub content: String,
    /// Remaining token balance reported by the service.
    pub tokens_remaining: i64,
}

/// Errors from the generation service.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The generation service could not be reached.
    #[error("generation service unavailable: {0}")]
    Unavailable(String),

    /// The service refused the request (exhausted tokens, rejected
    /// prompt, or any other well-formed error).
    #[error("generation rejected: {0}")]
    Rejected(String),
}

/// Prompt-to-HTML generation.
#[allow(async_fn_in_trait)]
pub trait Generator {
    /// Produce site content for a prompt.
    async fn generate(&self, prompt: &str) -> Result<Generated, GenerateError>;
}
