// ABOUTME: Built-in tool providers for the canvas, text, and knowledge tools.
// ABOUTME: register_defaults() adds the full set to a RegistryBuilder.

mod batch;
mod forum;
mod gh_connect;
mod gh_delete;
mod gh_generate;
mod gh_get;
mod gh_list_components;
mod gh_move;
mod gh_put;
mod gh_tidy_up;
mod gh_toggle;
mod list_filter;
mod list_generate;
mod script;
mod text;
mod web_page_read;

pub use batch::{parse_guid, BatchReport};
pub use forum::{ForumPostGetTool, ForumPostSummarizeTool, ForumSearchTool};
pub use gh_connect::GhConnectTool;
pub use gh_delete::GhDeleteTool;
pub use gh_generate::{GhGenerateTool, GH_GENERATE_NESTED_TOOLS};
pub use gh_get::GhGetTool;
pub use gh_list_components::GhListComponentsTool;
pub use gh_move::GhMoveTool;
pub use gh_put::GhPutTool;
pub use gh_tidy_up::GhTidyUpTool;
pub use gh_toggle::{GhToggleLockTool, GhTogglePreviewTool};
pub use list_filter::ListFilterTool;
pub use list_generate::ListGenerateTool;
pub use script::{ScriptEditTool, ScriptGenerateTool};
pub use text::{TextEvaluateTool, TextGenerateTool};
pub use web_page_read::WebPageReadTool;

use crate::error::ToolError;
use crate::tool::{Registry, RegistryBuilder};

/// Register every built-in tool.
pub fn register_defaults(builder: &mut RegistryBuilder) -> Result<&mut RegistryBuilder, ToolError> {
    builder
        .register(GhConnectTool)?
        .register(GhPutTool)?
        .register(GhGetTool)?
        .register(GhDeleteTool)?
        .register(GhToggleLockTool)?
        .register(GhTogglePreviewTool)?
        .register(GhMoveTool)?
        .register(GhTidyUpTool)?
        .register(GhListComponentsTool)?
        .register(GhGenerateTool)?
        .register(TextGenerateTool)?
        .register(TextEvaluateTool)?
        .register(ListFilterTool)?
        .register(ListGenerateTool)?
        .register(ScriptGenerateTool)?
        .register(ScriptEditTool)?
        .register(ForumSearchTool)?
        .register(ForumPostGetTool)?
        .register(ForumPostSummarizeTool)?
        .register(WebPageReadTool)
}

/// A registry holding every built-in tool.
pub fn default_registry() -> Result<Registry, ToolError> {
    let mut builder = Registry::builder();
    register_defaults(&mut builder)?;
    Ok(builder.build())
}
