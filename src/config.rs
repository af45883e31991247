// ABOUTME: Runtime configuration for tool providers and their collaborators.
// ABOUTME: Defaults are usable as-is; HOPPER_* environment variables override them.

use std::time::Duration;

use serde::Deserialize;

use crate::canvas::layout::Spacing;
use crate::error::ConfigError;

/// Configuration shared by the default tool set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider name reported in metrics when the invocation does not name one.
    pub provider: String,

    /// Model used for completion calls when the invocation does not name one.
    pub model: String,

    /// Base URL of the OpenAI-compatible chat completions endpoint.
    pub completion_url: String,

    /// API key for the completion endpoint.
    pub api_key: Option<String>,

    /// Base URL of the Discourse forum queried by the forum tools.
    pub forum_url: String,

    /// Timeout applied to forum and web requests, in seconds.
    pub http_timeout_secs: u64,

    /// Iteration ceiling of the list_generate loop.
    pub list_generate_max_iterations: usize,

    /// Iteration ceiling of the gh_generate loop.
    pub gh_generate_max_iterations: usize,

    /// Horizontal distance between layout columns.
    pub layout_column_spacing: f64,

    /// Vertical distance between layout rows.
    pub layout_row_spacing: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            completion_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            forum_url: "https://discourse.mcneel.com".to_string(),
            http_timeout_secs: 30,
            list_generate_max_iterations: 10,
            gh_generate_max_iterations: 12,
            layout_column_spacing: 250.0,
            layout_row_spacing: 120.0,
        }
    }
}

impl Config {
    /// Build a config from defaults overridden by `HOPPER_*` environment variables.
    ///
    /// `OPENAI_API_KEY` is honoured when `HOPPER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("HOPPER_PROVIDER") {
            config.provider = v;
        }
        if let Some(v) = lookup("HOPPER_MODEL") {
            config.model = v;
        }
        if let Some(v) = lookup("HOPPER_COMPLETION_URL") {
            config.completion_url = v;
        }
        config.api_key = lookup("HOPPER_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        if let Some(v) = lookup("HOPPER_FORUM_URL") {
            config.forum_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("HOPPER_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = parse_value("HOPPER_HTTP_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("HOPPER_LIST_GENERATE_MAX_ITERATIONS") {
            config.list_generate_max_iterations =
                parse_value("HOPPER_LIST_GENERATE_MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("HOPPER_GH_GENERATE_MAX_ITERATIONS") {
            config.gh_generate_max_iterations =
                parse_value("HOPPER_GH_GENERATE_MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("HOPPER_LAYOUT_COLUMN_SPACING") {
            config.layout_column_spacing = parse_value("HOPPER_LAYOUT_COLUMN_SPACING", &v)?;
        }
        if let Some(v) = lookup("HOPPER_LAYOUT_ROW_SPACING") {
            config.layout_row_spacing = parse_value("HOPPER_LAYOUT_ROW_SPACING", &v)?;
        }

        Ok(config)
    }

    /// HTTP timeout as a Duration.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Grid spacing used by auto-layout.
    pub fn layout_spacing(&self) -> Spacing {
        Spacing {
            column: self.layout_column_spacing,
            row: self.layout_row_spacing,
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
