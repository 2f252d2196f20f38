//! GraphQL rendering
//!
//! Every query becomes one document with a single `$obj` variable:
//!
//! ```text
//! search: query ($obj: FindEventInput!){events(event: $obj) {id,name,...}}
//! create: mutation ($obj: CreateEventInput!){create_event(event: $obj)}
//! ```
//!
//! Fetches are rendered as a search on `{id}`.

use serde::Serialize;
use serde_json::{json, Value};

use epr_core::{OperationKind, Query};

/// Request body posted to the GraphQL endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: Value,
}

impl GraphQlRequest {
    /// Render `query` into a GraphQL document and its variables
    pub fn render(query: &Query) -> Self {
        let resource = query.resource();
        let singular = resource.singular();

        let document = match query.action() {
            OperationKind::Fetch | OperationKind::Search => format!(
                "query ($obj: Find{}Input!){{{}({}: $obj) {{{}}}}}",
                resource.as_str(),
                resource.plural(),
                singular,
                query.selection().join(",")
            ),
            OperationKind::Create => format!(
                "mutation ($obj: Create{}Input!){{create_{}({}: $obj)}}",
                resource.as_str(),
                singular,
                singular
            ),
        };

        Self {
            query: document,
            variables: json!({ "obj": query.arguments() }),
        }
    }

    pub fn into_value(self) -> Value {
        json!({
            "query": self.query,
            "variables": self.variables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epr_core::prepare;

    const ID: &str = "01ARZ3NDEKTSV4RRFFQ69G5FAV";

    #[test]
    fn test_search_events_document() {
        let query = prepare("search_events", json!({"data": {"name": "foo"}})).unwrap();
        let request = GraphQlRequest::render(&query);
        assert_eq!(
            request.query,
            "query ($obj: FindEventInput!){events(event: $obj) \
             {id,name,version,release,platform_id,package,description,success,event_receiver_id,created_at,payload}}"
        );
        assert_eq!(request.variables, json!({"obj": {"name": "foo"}}));
    }

    #[test]
    fn test_fetch_group_is_a_search_on_id() {
        let query = prepare("fetch_group", json!(ID)).unwrap();
        let request = GraphQlRequest::render(&query);
        assert!(request
            .query
            .starts_with("query ($obj: FindEventReceiverGroupInput!){event_receiver_groups(event_receiver_group: $obj) {id,"));
        assert_eq!(request.variables, json!({"obj": {"id": ID}}));
    }

    #[test]
    fn test_create_receiver_mutation() {
        let query = prepare(
            "create_receiver",
            json!({"data": {
                "name": "builds",
                "type": "build",
                "version": "1.0.0",
                "description": "d"
            }}),
        )
        .unwrap();
        let request = GraphQlRequest::render(&query);
        assert_eq!(
            request.query,
            "mutation ($obj: CreateEventReceiverInput!){create_event_receiver(event_receiver: $obj)}"
        );
        assert_eq!(request.variables["obj"]["type"], "build");
    }

    #[test]
    fn test_empty_search_sends_empty_object() {
        let query = prepare("search_receivers", json!({"data": {}})).unwrap();
        let body = GraphQlRequest::render(&query).into_value();
        assert_eq!(body["variables"], json!({"obj": {}}));
        assert!(body["query"].as_str().unwrap().contains("event_receivers(event_receiver: $obj)"));
    }
}
