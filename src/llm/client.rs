// ABOUTME: Defines the LlmClient trait - the completion capability tools
// ABOUTME: call for text, JSON-constrained, and tool-calling replies.

use async_trait::async_trait;

use super::{Request, Response};
use crate::error::LlmError;

/// Trait for completion backends.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Create a message (non-streaming).
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError>;
}
