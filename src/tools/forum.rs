// ABOUTME: McNeel forum tools - search posts, fetch one post, and summarize a
// ABOUTME: post with the completion capability.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{parse_args, Capabilities, Capability, Tool, ToolContext, ToolOutput};

const SUMMARIZE_SYSTEM: &str = "You summarize forum posts about Rhino and Grasshopper. \
Keep the technical details (component names, parameter values, code) and drop greetings.";

/// Tool for searching the McNeel forum.
pub struct ForumSearchTool;

#[async_trait]
impl Tool for ForumSearchTool {
    fn name(&self) -> &str {
        "mcneel_forum_search"
    }

    fn description(&self) -> &str {
        "Search the McNeel (Rhino/Grasshopper) forum. Returns matching posts with topic titles \
         and excerpts."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "minLength": 1 },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 50,
                    "description": "Maximum results (default: 10)"
                }
            },
            "required": ["query"]
        })
    }

    fn required_capabilities(&self) -> Capabilities {
        Capabilities::from([Capability::Network])
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            query: String,
            #[serde(default = "default_limit")]
            limit: usize,
        }

        fn default_limit() -> usize {
            10
        }

        let params: Params = parse_args(params)?;
        let results = ctx.forum()?.search(&params.query, params.limit).await?;
        debug!(query = %params.query, hits = results.len(), "Forum search done");

        Ok(ToolOutput::new(serde_json::json!({
            "query": params.query,
            "count": results.len(),
            "results": results,
        })))
    }
}

/// Tool for reading one forum post.
pub struct ForumPostGetTool;

#[async_trait]
impl Tool for ForumPostGetTool {
    fn name(&self) -> &str {
        "mcneel_forum_post_get"
    }

    fn description(&self) -> &str {
        "Fetch the full text of a McNeel forum post by id."
    }

    fn schema(&self) -> serde_json::Value {
        post_id_schema()
    }

    fn required_capabilities(&self) -> Capabilities {
        Capabilities::from([Capability::Network])
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let params: PostParams = parse_args(params)?;
        let post = ctx.forum()?.get_post(params.post_id).await?;
        Ok(ToolOutput::new(post))
    }
}

/// Tool for summarizing one forum post.
pub struct ForumPostSummarizeTool;

#[async_trait]
impl Tool for ForumPostSummarizeTool {
    fn name(&self) -> &str {
        "mcneel_forum_post_summarize"
    }

    fn description(&self) -> &str {
        "Fetch a McNeel forum post and summarize it."
    }

    fn schema(&self) -> serde_json::Value {
        post_id_schema()
    }

    fn required_capabilities(&self) -> Capabilities {
        Capabilities::from([Capability::Network, Capability::TextCompletion])
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let params: PostParams = parse_args(params)?;
        let post = ctx.forum()?.get_post(params.post_id).await?;

        let mut convo = ctx.conversation(SUMMARIZE_SYSTEM);
        convo.user(format!("Post by {}:\n\n{}", post.username, post.raw));
        let summary = convo.send(ctx.llm()?).await?.text().trim().to_string();

        Ok(ToolOutput::new(serde_json::json!({
            "postId": post.id,
            "url": post.url,
            "summary": summary,
        }))
        .with_metrics(convo.into_metrics()))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostParams {
    post_id: u64,
}

fn post_id_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "postId": { "type": "integer", "minimum": 1 }
        },
        "required": ["postId"]
    })
}
