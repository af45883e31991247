// ABOUTME: ToolContext - the collaborators and capabilities an invocation sees.
// ABOUTME: Attaching a collaborator grants the matching capability.

use std::sync::Arc;

use super::{Capabilities, Capability, Registry, ToolInvocation};
use crate::canvas::CanvasHandle;
use crate::config::Config;
use crate::error::ToolError;
use crate::forum::ForumClient;
use crate::llm::{Conversation, LlmClient};

/// Environment handed to tool handlers.
#[derive(Clone, Default)]
pub struct ToolContext {
    capabilities: Capabilities,
    canvas: Option<CanvasHandle>,
    llm: Option<Arc<dyn LlmClient>>,
    forum: Option<ForumClient>,
    http: Option<reqwest::Client>,
    registry: Option<Registry>,
    config: Arc<Config>,
    /// Provider reported in metrics for this invocation.
    pub provider: String,
    /// Model used for completion calls in this invocation.
    pub model: String,
}

impl ToolContext {
    pub fn new(config: Config) -> Self {
        Self {
            provider: config.provider.clone(),
            model: config.model.clone(),
            config: Arc::new(config),
            ..Default::default()
        }
    }

    /// Attach a canvas; grants `Canvas`.
    pub fn with_canvas(mut self, canvas: CanvasHandle) -> Self {
        self.canvas = Some(canvas);
        self.capabilities.insert(Capability::Canvas);
        self
    }

    /// Attach a completion backend; grants `TextCompletion` plus whatever
    /// extra capabilities the backend supports (`JsonOutput`, `ToolCalling`).
    pub fn with_llm(mut self, client: Arc<dyn LlmClient>, extra: Capabilities) -> Self {
        self.llm = Some(client);
        self.capabilities.insert(Capability::TextCompletion);
        for cap in extra.iter() {
            self.capabilities.insert(cap);
        }
        self
    }

    /// Attach a forum client; grants `Network`.
    pub fn with_forum(mut self, forum: ForumClient) -> Self {
        self.forum = Some(forum);
        self.capabilities.insert(Capability::Network);
        self
    }

    /// Attach a general HTTP client; grants `Network`.
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self.capabilities.insert(Capability::Network);
        self
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Per-call copy: provider and model from the invocation, and the
    /// registry so handlers can invoke other tools.
    pub(crate) fn for_invocation(&self, invocation: &ToolInvocation, registry: Registry) -> Self {
        let mut ctx = self.clone();
        if let Some(provider) = invocation.provider.as_deref().filter(|p| !p.is_empty()) {
            ctx.provider = provider.to_string();
        }
        if let Some(model) = invocation.model.as_deref().filter(|m| !m.is_empty()) {
            ctx.model = model.to_string();
        }
        ctx.registry = Some(registry);
        ctx
    }

    pub fn canvas(&self) -> Result<&CanvasHandle, ToolError> {
        self.canvas.as_ref().ok_or_else(|| missing(Capability::Canvas))
    }

    pub fn llm(&self) -> Result<&dyn LlmClient, ToolError> {
        self.llm
            .as_deref()
            .ok_or_else(|| missing(Capability::TextCompletion))
    }

    pub fn forum(&self) -> Result<&ForumClient, ToolError> {
        self.forum.as_ref().ok_or_else(|| missing(Capability::Network))
    }

    /// The HTTP client, falling back to the forum client's.
    pub fn http(&self) -> Result<&reqwest::Client, ToolError> {
        self.http
            .as_ref()
            .or_else(|| self.forum.as_ref().map(ForumClient::http))
            .ok_or_else(|| missing(Capability::Network))
    }

    /// The registry this invocation came through.
    pub fn registry(&self) -> Option<&Registry> {
        self.registry.as_ref()
    }

    /// Start a conversation with this invocation's provider and model.
    pub fn conversation(&self, system: impl Into<String>) -> Conversation {
        Conversation::new(system, &self.provider, &self.model)
    }
}

fn missing(cap: Capability) -> ToolError {
    ToolError::Execution(anyhow::anyhow!(
        "capability '{}' granted but no collaborator attached",
        cap
    ))
}
