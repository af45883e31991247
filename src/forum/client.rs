// ABOUTME: Read-only client for a Discourse forum's JSON endpoints.
// ABOUTME: Covers search and fetching a single post; no auth, no writes.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::ForumError;

/// One hit from a forum search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumSearchHit {
    pub id: u64,
    pub topic_id: u64,
    pub title: String,
    pub username: String,
    pub blurb: String,
    pub created_at: String,
}

/// A single forum post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: u64,
    pub topic_id: u64,
    pub topic_slug: String,
    pub username: String,
    pub raw: String,
    pub created_at: String,
    /// Link to the post on the forum.
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    posts: Vec<SearchPost>,
    #[serde(default)]
    topics: Vec<SearchTopic>,
}

#[derive(Debug, Deserialize)]
struct SearchPost {
    id: u64,
    #[serde(default)]
    username: String,
    #[serde(default)]
    topic_id: u64,
    #[serde(default)]
    blurb: String,
    #[serde(default)]
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct SearchTopic {
    id: u64,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    id: u64,
    #[serde(default)]
    username: String,
    #[serde(default)]
    topic_id: u64,
    #[serde(default)]
    topic_slug: String,
    #[serde(default)]
    raw: String,
    #[serde(default)]
    cooked: String,
    #[serde(default)]
    post_number: u64,
    #[serde(default)]
    created_at: String,
}

/// Client for a Discourse forum such as discourse.mcneel.com.
#[derive(Debug, Clone)]
pub struct ForumClient {
    base_url: String,
    http: reqwest::Client,
}

impl ForumClient {
    /// Create a client for `base_url` with a request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ForumError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hopper/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(base_url, http))
    }

    /// Create with a custom reqwest client.
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ForumError> {
        Self::new(&config.forum_url, config.http_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn search_url(&self, query: &str) -> String {
        format!("{}/search.json?q={}", self.base_url, urlencoding::encode(query))
    }

    pub fn post_url(&self, id: u64) -> String {
        format!("{}/posts/{}.json", self.base_url, id)
    }

    /// Search posts, returning at most `limit` hits in forum order.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<ForumSearchHit>, ForumError> {
        let url = self.search_url(query);
        debug!(%url, "Forum search");
        let body = self.get_text(&url).await?;
        parse_search(&body, limit)
    }

    /// Fetch a single post by id.
    pub async fn get_post(&self, id: u64) -> Result<ForumPost, ForumError> {
        let url = self.post_url(id);
        debug!(%url, "Forum post");
        let body = self.get_text(&url).await?;
        parse_post(&body, &self.base_url)
    }

    async fn get_text(&self, url: &str) -> Result<String, ForumError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForumError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

fn parse_search(body: &str, limit: usize) -> Result<Vec<ForumSearchHit>, ForumError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let titles: HashMap<u64, String> = response
        .topics
        .into_iter()
        .map(|t| (t.id, t.title))
        .collect();

    Ok(response
        .posts
        .into_iter()
        .take(limit)
        .map(|post| ForumSearchHit {
            title: titles.get(&post.topic_id).cloned().unwrap_or_default(),
            id: post.id,
            topic_id: post.topic_id,
            username: post.username,
            blurb: post.blurb,
            created_at: post.created_at,
        })
        .collect())
}

fn parse_post(body: &str, base_url: &str) -> Result<ForumPost, ForumError> {
    let post: PostResponse = serde_json::from_str(body)?;
    let url = if post.topic_slug.is_empty() {
        format!("{}/p/{}", base_url, post.id)
    } else {
        format!(
            "{}/t/{}/{}/{}",
            base_url,
            post.topic_slug,
            post.topic_id,
            post.post_number.max(1)
        )
    };
    // Older endpoints omit `raw`; fall back to the rendered HTML.
    let raw = if post.raw.is_empty() { post.cooked } else { post.raw };

    Ok(ForumPost {
        id: post.id,
        topic_id: post.topic_id,
        topic_slug: post.topic_slug,
        username: post.username,
        raw,
        created_at: post.created_at,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = r#"{
        "posts": [
            {"id": 11, "username": "ana", "topic_id": 7, "blurb": "Use the Circle component", "created_at": "2024-01-02T00:00:00Z"},
            {"id": 12, "username": "ben", "topic_id": 8, "blurb": "Try a slider", "created_at": "2024-01-03T00:00:00Z"},
            {"id": 13, "username": "cy", "topic_id": 9, "blurb": "Unrelated"}
        ],
        "topics": [
            {"id": 7, "title": "Circles from points"},
            {"id": 8, "title": "Slider ranges"}
        ]
    }"#;

    #[test]
    fn test_search_url_encodes_query() {
        let client = ForumClient::with_client("https://forum.test/", reqwest::Client::new());
        assert_eq!(
            client.search_url("circle & radius"),
            "https://forum.test/search.json?q=circle%20%26%20radius"
        );
        assert_eq!(client.post_url(42), "https://forum.test/posts/42.json");
    }

    #[test]
    fn test_parse_search_joins_titles_and_limits() {
        let hits = parse_search(SEARCH, 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Circles from points");
        assert_eq!(hits[1].username, "ben");
    }

    #[test]
    fn test_parse_search_tolerates_missing_sections() {
        assert!(parse_search("{}", 5).unwrap().is_empty());
        assert!(parse_search("not json", 5).is_err());
    }

    #[test]
    fn test_parse_post_builds_link() {
        let body = r#"{"id": 5, "username": "ana", "topic_id": 7, "topic_slug": "circles",
            "post_number": 3, "raw": "Hello", "created_at": "2024-01-02T00:00:00Z"}"#;
        let post = parse_post(body, "https://forum.test").unwrap();
        assert_eq!(post.raw, "Hello");
        assert_eq!(post.url, "https://forum.test/t/circles/7/3");
    }

    #[test]
    fn test_parse_post_falls_back_to_cooked() {
        let body = r#"{"id": 5, "cooked": "<p>Hi</p>"}"#;
        let post = parse_post(body, "https://forum.test").unwrap();
        assert_eq!(post.raw, "<p>Hi</p>");
        assert_eq!(post.url, "https://forum.test/p/5");
    }
}
