// ABOUTME: Defines all error types for hopper using thiserror.
// ABOUTME: Each concern has its own error enum, unified under HopperError.

use crate::tool::Capability;

/// Top-level error type for the hopper library.
#[derive(Debug, thiserror::Error)]
pub enum HopperError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Canvas error: {0}")]
    Canvas(#[from] CanvasError),

    #[error("Forum error: {0}")]
    Forum(#[from] ForumError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the completion capability.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors surfaced by tool invocation. Every variant ends up as the
/// `errorMessage` of a failed ToolResult.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool '{tool}' requires unsupported capabilities: {}", format_capabilities(.missing))]
    UnsupportedCapability {
        tool: String,
        missing: Vec<Capability>,
    },

    /// A required value is present in shape but empty. Absent fields are
    /// caught earlier by schema validation as `InvalidArguments`.
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Type incompatible: {0}")]
    TypeIncompatible(String),

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Exceeded retry budget after {iterations} iterations: {reason}")]
    ExceededRetryBudget { iterations: usize, reason: String },

    #[error("Tool '{0}' is already registered")]
    Registration(String),

    #[error("Execution failed: {0}")]
    Execution(#[source] anyhow::Error),
}

impl ToolError {
    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "UnknownTool",
            ToolError::InvalidArguments(_) => "InvalidArguments",
            ToolError::UnsupportedCapability { .. } => "UnsupportedCapability",
            ToolError::MissingArgument(_) => "MissingArgument",
            ToolError::InvalidReference(_) => "InvalidReference",
            ToolError::TypeIncompatible(_) => "TypeIncompatible",
            ToolError::UpstreamFailure(_) => "UpstreamFailure",
            ToolError::ExceededRetryBudget { .. } => "ExceededRetryBudget",
            ToolError::Registration(_) => "Registration",
            ToolError::Execution(_) => "Execution",
        }
    }
}

fn format_capabilities(caps: &[Capability]) -> String {
    caps.iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<LlmError> for ToolError {
    fn from(err: LlmError) -> Self {
        ToolError::UpstreamFailure(err.to_string())
    }
}

impl From<ForumError> for ToolError {
    fn from(err: ForumError) -> Self {
        ToolError::UpstreamFailure(err.to_string())
    }
}

impl From<CanvasError> for ToolError {
    fn from(err: CanvasError) -> Self {
        match err {
            CanvasError::NotFound(guid) => {
                ToolError::InvalidReference(format!("Component not found: {}", guid))
            }
            err @ (CanvasError::ParamOutOfRange { .. } | CanvasError::NotScript(_)) => {
                ToolError::InvalidReference(err.to_string())
            }
            other => ToolError::Execution(other.into()),
        }
    }
}

/// Errors from canvas access and the UI-thread dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("Object not found: {0}")]
    NotFound(crate::canvas::Guid),

    #[error("Parameter index {index} out of range on {guid}")]
    ParamOutOfRange {
        guid: crate::canvas::Guid,
        index: usize,
    },

    #[error("Object {0} is not a script component")]
    NotScript(crate::canvas::Guid),

    #[error("Canvas execution context is unavailable")]
    Unavailable,

    #[error("Failed to start canvas execution context: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Canvas job failed before completing")]
    JobFailed,
}

/// Errors from the forum client.
#[derive(Debug, thiserror::Error)]
pub enum ForumError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Forum returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Unexpected forum payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
