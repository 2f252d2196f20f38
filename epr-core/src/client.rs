//! Outbound client seam
//!
//! The core never talks to the network itself. It hands a [`Query`] and a
//! [`CallContext`] to an [`ApiClient`] and maps whatever comes back.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::query::Query;

/// Per-call settings passed unchanged to the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Deadline for the outbound call; `None` leaves it to the client
    pub timeout: Option<Duration>,

    /// Caller-chosen correlation id, echoed into logs
    pub request_id: Option<String>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Why an outbound call produced no usable body
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Could not reach the remote side
    #[error("connection failed: {0}")]
    Connect(String),

    /// No answer within the deadline
    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Remote side answered with a non-2xx status
    #[error("HTTP {status}")]
    Status { status: u16, body: Value },
}

impl TransportFailure {
    /// Whether retrying the same call might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportFailure::Connect(_) | TransportFailure::Timeout { .. } => true,
            TransportFailure::Status { status, .. } => {
                matches!(status, 408 | 429 | 500..=599)
            }
        }
    }
}

/// Raw outcome of an outbound call
pub type RawResult = std::result::Result<Value, TransportFailure>;

/// Client that carries a [`Query`] to the remote registry
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Client name, for logs
    fn name(&self) -> &str;

    /// Send the query and return the raw JSON answer
    async fn send(&self, query: &Query, ctx: &CallContext) -> RawResult;
}

#[async_trait]
impl<C: ApiClient + ?Sized> ApiClient for std::sync::Arc<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn send(&self, query: &Query, ctx: &CallContext) -> RawResult {
        (**self).send(query, ctx).await
    }
}
