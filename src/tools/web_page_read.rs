// ABOUTME: WebPageReadTool - fetches a web page and returns its readable text.
// ABOUTME: HTML is reduced to plain text; long pages are truncated.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Node};
use serde::Deserialize;
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{parse_args, Capabilities, Capability, Tool, ToolContext, ToolOutput};

/// Tool for reading web pages.
pub struct WebPageReadTool;

/// Subtrees that never contribute readable text.
const SKIPPED: [&str; 6] = ["head", "script", "style", "noscript", "svg", "template"];

/// Elements that end a line of text.
const BLOCKS: [&str; 18] = [
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "br", "pre", "blockquote",
    "section", "article", "header", "footer", "table",
];

impl WebPageReadTool {
    /// Readable text of an HTML document, one line per block element.
    fn html_to_text(html: &str) -> String {
        let document = Html::parse_document(html);
        let mut raw = String::new();
        collect_text(document.root_element(), &mut raw);

        raw.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Cut `content` to at most `max_chars` characters.
    fn truncate(content: String, max_chars: usize) -> (String, bool) {
        match content.char_indices().nth(max_chars) {
            Some((byte, _)) => (content[..byte].to_string(), true),
            None => (content, false),
        }
    }
}

fn collect_text(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if SKIPPED.contains(&name) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c == '\n' { ' ' } else { c }));
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }

    if BLOCKS.contains(&name) {
        out.push('\n');
    }
}

#[async_trait]
impl Tool for WebPageReadTool {
    fn name(&self) -> &str {
        "web_page_read"
    }

    fn description(&self) -> &str {
        "Read a web page and return its text content with HTML stripped."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "minLength": 1 },
                "maxLength": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum characters to return (default: 50000)"
                }
            },
            "required": ["url"]
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
        #[serde(rename_all = "camelCase")]
        struct Params {
            url: String,
            #[serde(default = "default_max_length")]
            max_length: usize,
        }

        fn default_max_length() -> usize {
            50000
        }

        let params: Params = parse_args(params)?;
        let url = if !params.url.starts_with("http://") && !params.url.starts_with("https://") {
            format!("https://{}", params.url)
        } else {
            params.url
        };

        let response = ctx
            .http()?
            .get(&url)
            .send()
            .await
            .map_err(|e| ToolError::UpstreamFailure(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::UpstreamFailure(format!(
                "HTTP error: {} {} for {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                url
            )));
        }

        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.to_lowercase().contains("text/html"));
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::UpstreamFailure(format!("Failed to read {}: {}", url, e)))?;

        let content = if is_html { Self::html_to_text(&body) } else { body };
        let length = content.chars().count();
        let (content, truncated) = Self::truncate(content, params.max_length);
        debug!(%url, length, truncated, "Read web page");

        Ok(ToolOutput::new(serde_json::json!({
            "url": url,
            "content": content,
            "length": length,
            "truncated": truncated,
        })))
    }
}
