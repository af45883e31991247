// ABOUTME: Scripted completion client that replays canned responses.
// ABOUTME: Stands in for a real backend in tests and offline runs.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{LlmClient, Request, Response};
use crate::error::LlmError;

type Responder = Arc<dyn Fn(&Request) -> Result<Response, LlmError> + Send + Sync>;

/// An LlmClient whose replies are decided up front.
///
/// Every request is recorded so tests can inspect what was sent.
pub struct ScriptedClient {
    queue: Mutex<VecDeque<Response>>,
    fallback: Option<Responder>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedClient {
    /// Reply with `responses` in order, then fail with an API error.
    pub fn new(responses: Vec<Response>) -> Self {
        Self {
            queue: Mutex::new(responses.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply with the same response forever.
    pub fn repeating(response: Response) -> Self {
        Self::from_fn(move |_| Ok(response.clone()))
    }

    /// Reply by calling `f` for every request.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Request) -> Result<Response, LlmError> + Send + Sync + 'static,
    {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Some(Arc::new(f)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All requests received so far.
    pub async fn requests(&self) -> Vec<Request> {
        self.requests.lock().await.clone()
    }

    /// Number of requests received so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        self.requests.lock().await.push(req.clone());

        if let Some(response) = self.queue.lock().await.pop_front() {
            return Ok(response);
        }
        match &self.fallback {
            Some(f) => f(req),
            None => Err(LlmError::Api {
                status: 0,
                message: "scripted client has no more responses".to_string(),
            }),
        }
    }
}
