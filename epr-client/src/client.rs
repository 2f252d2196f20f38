//! GraphQL client for the Event Provenance Registry

use async_trait::async_trait;

use epr_core::{ApiClient, CallContext, Query, RawResult, TransportFailure};

use crate::config::ClientConfig;
use crate::graphql::GraphQlRequest;
use crate::transport::TransportBackend;

/// [`ApiClient`] that renders queries to GraphQL and posts them through a
/// [`TransportBackend`]
pub struct GraphQlClient<B> {
    config: ClientConfig,
    backend: B,
}

impl<B: TransportBackend> GraphQlClient<B> {
    pub fn new(config: ClientConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: TransportBackend> ApiClient for GraphQlClient<B> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn send(&self, query: &Query, ctx: &CallContext) -> RawResult {
        let request = GraphQlRequest::render(query);
        let endpoint = self.config.endpoint();
        let timeout = ctx.timeout.unwrap_or_else(|| self.config.timeout());

        if self.config.debug {
            tracing::debug!(
                endpoint = %endpoint,
                document = %request.query,
                "Rendered GraphQL request"
            );
        }

        match tokio::time::timeout(timeout, self.backend.post_json(&endpoint, request.into_value()))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation = %query.operation(),
                    timeout_ms = timeout.as_millis() as u64,
                    "EPR call timed out"
                );
                Err(TransportFailure::Timeout {
                    after_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::StaticBackend;
    use epr_core::prepare;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_posts_rendered_query_to_endpoint() {
        let config = ClientConfig::builder().url("http://epr:8042/").build();
        let client = GraphQlClient::new(config, StaticBackend::always(json!({"data": {"events": []}})));
        let query = prepare("search_events", json!({"data": {"package": "rpm"}})).unwrap();

        let raw = client.send(&query, &CallContext::new()).await.unwrap();
        assert_eq!(raw, json!({"data": {"events": []}}));

        let requests = client.backend().requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://epr:8042/api/v1/graphql/query");
        assert_eq!(requests[0].body["variables"], json!({"obj": {"package": "rpm"}}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_timeout_wins() {
        let backend = StaticBackend::always(json!([])).with_delay(Duration::from_secs(5));
        let client = GraphQlClient::new(ClientConfig::default(), backend);
        let query = prepare("fetch_event", json!("01ARZ3NDEKTSV4RRFFQ69G5FAV")).unwrap();
        let ctx = CallContext::new().with_timeout(Duration::from_millis(100));

        let err = client.send(&query, &ctx).await.unwrap_err();
        assert_eq!(err, TransportFailure::Timeout { after_ms: 100 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_timeout_is_the_fallback() {
        let backend = StaticBackend::always(json!([])).with_delay(Duration::from_secs(60));
        let config = ClientConfig::builder().timeout(Duration::from_secs(2)).build();
        let client = GraphQlClient::new(config, backend);
        let query = prepare("search_groups", json!({"data": {}})).unwrap();

        let err = client.send(&query, &CallContext::new()).await.unwrap_err();
        assert_eq!(err, TransportFailure::Timeout { after_ms: 2000 });
    }
}
