// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use hopper::prelude::*;` to get started quickly.

pub use crate::canvas::{
    Canvas, CanvasHandle, CanvasJournal, CanvasObject, ComponentCatalog, GhDocument, Guid,
    MemoryCanvas, Param, ParamRef, Point,
};
pub use crate::config::Config;
pub use crate::error::{CanvasError, ConfigError, ForumError, HopperError, LlmError, ToolError};
pub use crate::forum::ForumClient;
pub use crate::llm::{
    ContentBlock, Conversation, LlmClient, Message, Metrics, OpenAIClient, Request, Response,
    ScriptedClient, ToolDefinition,
};
pub use crate::tool::{
    Capabilities, Capability, Registry, RegistryBuilder, Severity, Tool, ToolContext,
    ToolDescriptor, ToolInvocation, ToolMessage, ToolOutput, ToolResult,
};
pub use crate::tools::{default_registry, register_defaults};
