//! Query building
//!
//! Turns a [`ValidatedRecord`] into an inert [`Query`]: what to do, to which
//! resource kind, with which arguments, and which fields to bring back. A
//! query references no transport; an [`ApiClient`](crate::ApiClient) decides
//! how to put it on the wire.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::resource::ResourceKind;
use crate::schema::{Operation, OperationKind};
use crate::validate::ValidatedRecord;

/// A structured request ready for dispatch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    operation: Operation,
    action: OperationKind,
    resource: ResourceKind,
    arguments: Map<String, Value>,
    selection: &'static [&'static str],
}

impl Query {
    /// Build the query for a validated record
    ///
    /// - Fetch: arguments are `{id}`.
    /// - Search: arguments are the non-empty validated fields; an empty
    ///   mapping matches everything.
    /// - Create: arguments are the complete validated record.
    pub fn build(record: ValidatedRecord) -> Self {
        let operation = record.operation();
        let action = operation.kind();
        let resource = operation.resource();

        let arguments = match action {
            OperationKind::Fetch | OperationKind::Create => record.into_fields(),
            OperationKind::Search => record
                .into_fields()
                .into_iter()
                .filter(|(_, value)| !is_blank(value))
                .collect(),
        };

        tracing::debug!(
            operation = %operation,
            arguments = arguments.len(),
            "Query built"
        );

        Self {
            operation,
            action,
            resource,
            arguments,
            selection: resource.field_selection(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn action(&self) -> OperationKind {
        self.action
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    pub fn arguments(&self) -> &Map<String, Value> {
        &self.arguments
    }

    /// Fields requested from the remote side
    pub fn selection(&self) -> &'static [&'static str] {
        self.selection
    }

    /// Identifier argument of a fetch query
    pub fn identifier(&self) -> Option<&str> {
        match self.action {
            OperationKind::Fetch => self.arguments.get("id").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Name of the field the remote side answers under
    ///
    /// Fetch and search results come back under the plural collection name
    /// (`events`); create results under `create_<singular>`.
    pub fn response_field(&self) -> String {
        match self.action {
            OperationKind::Fetch | OperationKind::Search => self.resource.plural().to_string(),
            OperationKind::Create => format!("create_{}", self.resource.singular()),
        }
    }
}

impl From<ValidatedRecord> for Query {
    fn from(record: ValidatedRecord) -> Self {
        Self::build(record)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use serde_json::json;

    const ID: &str = "01ARZ3NDEKTSV4RRFFQ69G5FAV";

    #[test]
    fn test_fetch_query() {
        let record = validate(Operation::FetchReceiver, json!(ID)).unwrap();
        let query = Query::build(record);
        assert_eq!(query.action(), OperationKind::Fetch);
        assert_eq!(query.resource(), ResourceKind::EventReceiver);
        assert_eq!(query.identifier(), Some(ID));
        assert_eq!(query.arguments().len(), 1);
        assert_eq!(query.selection(), ResourceKind::EventReceiver.field_selection());
        assert_eq!(query.response_field(), "event_receivers");
    }

    #[test]
    fn test_empty_search_matches_all() {
        let record = validate(Operation::SearchGroups, json!({"data": {}})).unwrap();
        let query = Query::build(record);
        assert!(query.arguments().is_empty());
        assert_eq!(query.identifier(), None);
        assert_eq!(query.response_field(), "event_receiver_groups");
    }

    #[test]
    fn test_search_keeps_only_present_fields() {
        let record = validate(
            Operation::SearchEvents,
            json!({"data": {"name": "foo", "release": "", "package": null}}),
        )
        .unwrap();
        let query: Query = record.into();
        assert_eq!(query.arguments().len(), 1);
        assert_eq!(query.arguments()["name"], "foo");
    }

    #[test]
    fn test_search_by_identifier() {
        let record = validate(
            Operation::SearchReceivers,
            json!({"data": {"id": format!(" {} ", ID), "name": ""}}),
        )
        .unwrap();
        let query = Query::build(record);
        assert_eq!(query.arguments(), json!({"id": ID}).as_object().unwrap());
        assert_eq!(query.identifier(), None);

        let err = validate(Operation::SearchGroups, json!({"data": {"id": "short"}})).unwrap_err();
        assert_eq!(err.violations[0].path, "data.id");
    }

    #[test]
    fn test_create_query_keeps_group_order_and_duplicates() {
        let other = "01ARZ3NDEKTSV4RRFFQ69G5FAW";
        let record = validate(
            Operation::CreateGroup,
            json!({"data": {
                "name": "all",
                "type": "bundle",
                "version": "1.0.0",
                "description": "everything",
                "event_receiver_ids": [other, ID, other]
            }}),
        )
        .unwrap();
        let query = Query::build(record);
        assert_eq!(query.action(), OperationKind::Create);
        assert_eq!(query.arguments()["event_receiver_ids"], json!([other, ID, other]));
        assert_eq!(query.response_field(), "create_event_receiver_group");
    }

    #[test]
    fn test_query_serializes() {
        let record = validate(Operation::FetchEvent, json!(ID)).unwrap();
        let value = serde_json::to_value(Query::build(record)).unwrap();
        assert_eq!(value["operation"], "fetch_event");
        assert_eq!(value["action"], "fetch");
        assert_eq!(value["resource"], "Event");
        assert_eq!(value["arguments"]["id"], ID);
    }
}
