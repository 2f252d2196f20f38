//! Transport backends for EPR communication

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use epr_core::{RawResult, TransportFailure};

/// Transport backend interface
///
/// Implementations carry a JSON body to `url` and return the decoded JSON
/// answer, or a [`TransportFailure`] for connection errors, timeouts and
/// non-2xx statuses.
#[async_trait]
pub trait TransportBackend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// POST `body` to `url`
    async fn post_json(&self, url: &str, body: Value) -> RawResult;
}

/// A request seen by [`StaticBackend`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: Value,
}

/// Backend answering from a script of canned responses
///
/// Responses are served in order; once the script runs out the fallback
/// (if any) is repeated. Every request is recorded.
pub struct StaticBackend {
    script: Mutex<VecDeque<RawResult>>,
    fallback: Option<RawResult>,
    delay: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StaticBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Backend that answers every request with `body`
    pub fn always(body: Value) -> Self {
        Self::new().with_fallback(Ok(body))
    }

    /// Queue a response
    pub fn with_response(mut self, response: RawResult) -> Self {
        self.script.get_mut().push_back(response);
        self
    }

    /// Response used once the script is exhausted
    pub fn with_fallback(mut self, response: RawResult) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests seen so far, oldest first
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for StaticBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportBackend for StaticBackend {
    fn name(&self) -> &str {
        "static"
    }

    async fn post_json(&self, url: &str, body: Value) -> RawResult {
        self.requests.lock().await.push(RecordedRequest {
            url: url.to_string(),
            body,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.lock().await.pop_front();
        match scripted.or_else(|| self.fallback.clone()) {
            Some(response) => response,
            None => Err(TransportFailure::Connect(format!(
                "no response scripted for {}",
                url
            ))),
        }
    }
}
