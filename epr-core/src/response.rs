//! Response mapping
//!
//! Converts what an [`ApiClient`](crate::ApiClient) returned into typed
//! domain objects, or into the error taxonomy when the call failed or the
//! answer cannot be used.
//!
//! Accepted result shapes:
//!
//! - GraphQL envelopes: `{"data": {"events": [...]}}`, unwrapped through the
//!   query's response field
//! - bare mappings and lists, used as-is
//! - bare identifiers for create results, combined with the query arguments
//!
//! Error envelopes (`{"error": ..., "status": ...}` or GraphQL
//! `{"errors": [...]}`) become [`CoreError::Remote`] whatever the transport
//! status was.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::{RawResult, TransportFailure};
use crate::error::{CoreError, Result};
use crate::model::{DomainObject, Event, EventReceiver, EventReceiverGroup, Resource};
use crate::query::Query;
use crate::resource::{is_identifier, ResourceKind};
use crate::schema::OperationKind;
use crate::validate::json_type_name;

/// Outcome of a successful invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Mapped {
    /// Fetch and create results
    One(DomainObject),
    /// Search results, possibly empty
    Many(Vec<DomainObject>),
}

impl Mapped {
    pub fn one(&self) -> Option<&DomainObject> {
        match self {
            Mapped::One(obj) => Some(obj),
            Mapped::Many(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Mapped::One(_) => 1,
            Mapped::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<DomainObject> {
        match self {
            Mapped::One(obj) => vec![obj],
            Mapped::Many(items) => items,
        }
    }
}

/// Map the raw outcome of `query` into domain objects or an error
pub fn map_response(query: &Query, raw: RawResult) -> Result<Mapped> {
    let body = match raw {
        Ok(body) => body,
        Err(failure) => return Err(map_failure(failure)),
    };

    if let Some(err) = remote_error(&body, None) {
        return Err(err);
    }

    let result = unwrap_envelope(body, &query.response_field());
    let mapped = match query.action() {
        OperationKind::Search => map_search(query.resource(), result),
        OperationKind::Fetch => map_fetch(query, result),
        OperationKind::Create => map_create(query, result),
    };

    if let Err(err) = &mapped {
        tracing::warn!(
            operation = %query.operation(),
            code = err.error_code(),
            "Response mapping failed"
        );
    }
    mapped
}

fn map_failure(failure: TransportFailure) -> CoreError {
    let retryable = failure.is_retryable();
    match failure {
        TransportFailure::Status { status, body } => {
            remote_error(&body, Some(status)).unwrap_or_else(|| CoreError::Transport {
                cause: format!("HTTP {}", status),
                retryable,
            })
        }
        other => CoreError::Transport {
            cause: other.to_string(),
            retryable,
        },
    }
}

/// Recognize an error envelope in `body`
fn remote_error(body: &Value, http_status: Option<u16>) -> Option<CoreError> {
    let obj = body.as_object()?;

    let message = match (obj.get("error"), obj.get("errors")) {
        (Some(Value::String(msg)), _) => msg.clone(),
        (Some(Value::Object(inner)), _) => inner
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Value::Object(inner.clone()).to_string()),
        (_, Some(Value::Array(errors))) if !errors.is_empty() => errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };

    let status = envelope_status(obj)
        .or_else(|| {
            obj.get("error")
                .and_then(Value::as_object)
                .and_then(envelope_status)
        })
        .or(http_status);

    Some(CoreError::Remote { status, message })
}

fn envelope_status(obj: &Map<String, Value>) -> Option<u16> {
    ["status", "code"]
        .iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|v| v.as_u64().and_then(|n| u16::try_from(n).ok()))
}

/// Strip a GraphQL `data` wrapper and the response field beneath it
fn unwrap_envelope(body: Value, response_field: &str) -> Value {
    let inner = match body {
        Value::Object(mut obj) if obj.contains_key("data") => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    match inner {
        Value::Object(mut obj) if obj.contains_key(response_field) => {
            obj.remove(response_field).unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn map_search(kind: ResourceKind, result: Value) -> Result<Mapped> {
    match result {
        Value::Null => Ok(Mapped::Many(Vec::new())),
        Value::Array(items) => items
            .into_iter()
            .map(|item| decode(kind, item))
            .collect::<Result<Vec<_>>>()
            .map(Mapped::Many),
        other => Err(CoreError::Decode {
            resource: kind,
            missing_keys: Vec::new(),
            detail: Some(format!("expected sequence, got {}", json_type_name(&other))),
        }),
    }
}

fn map_fetch(query: &Query, result: Value) -> Result<Mapped> {
    let kind = query.resource();
    match result {
        Value::Object(_) => decode(kind, result).map(Mapped::One),
        Value::Array(mut items) if items.len() == 1 => {
            decode(kind, items.remove(0)).map(Mapped::One)
        }
        Value::Array(items) if !items.is_empty() => Err(CoreError::Decode {
            resource: kind,
            missing_keys: Vec::new(),
            detail: Some(format!("expected one result, got {}", items.len())),
        }),
        Value::Array(_) | Value::Null => Err(CoreError::Remote {
            status: Some(404),
            message: format!(
                "{} '{}' not found",
                kind,
                query.identifier().unwrap_or_default()
            ),
        }),
        other => Err(CoreError::Decode {
            resource: kind,
            missing_keys: Vec::new(),
            detail: Some(format!("expected mapping, got {}", json_type_name(&other))),
        }),
    }
}

fn map_create(query: &Query, result: Value) -> Result<Mapped> {
    let kind = query.resource();
    match result {
        Value::String(id) => {
            let mut fields = query.arguments().clone();
            fields.insert("id".to_string(), Value::String(id));
            decode(kind, Value::Object(fields)).map(Mapped::One)
        }
        Value::Array(mut items) if items.len() == 1 => {
            decode(kind, items.remove(0)).map(Mapped::One)
        }
        other => decode(kind, other).map(Mapped::One),
    }
}

fn decode(kind: ResourceKind, value: Value) -> Result<DomainObject> {
    match kind {
        ResourceKind::Event => decode_as::<Event>(value),
        ResourceKind::EventReceiver => decode_as::<EventReceiver>(value),
        ResourceKind::EventReceiverGroup => decode_as::<EventReceiverGroup>(value),
    }
}

fn decode_as<T: Resource>(value: Value) -> Result<DomainObject> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => {
            return Err(CoreError::Decode {
                resource: T::KIND,
                missing_keys: Vec::new(),
                detail: Some(format!("expected mapping, got {}", json_type_name(&value))),
            })
        }
    };

    let missing_keys: Vec<String> = T::REQUIRED_KEYS
        .iter()
        .filter(|key| obj.get(**key).map_or(true, Value::is_null))
        .map(|key| key.to_string())
        .collect();
    if !missing_keys.is_empty() {
        return Err(CoreError::Decode {
            resource: T::KIND,
            missing_keys,
            detail: None,
        });
    }

    let mut object: T = serde_json::from_value(value).map_err(|e| CoreError::Decode {
        resource: T::KIND,
        missing_keys: Vec::new(),
        detail: Some(e.to_string()),
    })?;
    object.normalize();

    if let Some((field, _)) = object
        .identifiers()
        .into_iter()
        .find(|(_, id)| !is_identifier(id))
    {
        return Err(CoreError::Decode {
            resource: T::KIND,
            missing_keys: Vec::new(),
            detail: Some(format!("{}: not an identifier", field)),
        });
    }
    Ok(object.into_domain())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::schema::Operation;
    use crate::validate::validate;
    use serde_json::json;

    const ID: &str = "01ARZ3NDEKTSV4RRFFQ69G5FAV";

    fn query(op: Operation, input: Value) -> Query {
        Query::build(validate(op, input).unwrap())
    }

    fn receiver(id: &str) -> Value {
        json!({
            "id": id,
            "name": "builds",
            "type": "build",
            "version": "1.0.0",
            "description": "d"
        })
    }

    #[test]
    fn test_search_unwraps_graphql_envelope() {
        let q = query(Operation::SearchReceivers, json!({"data": {}}));
        let body = json!({"data": {"event_receivers": [receiver(ID)]}});
        let mapped = map_response(&q, Ok(body)).unwrap();
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped.into_vec()[0].id(), ID);
    }

    #[test]
    fn test_empty_search_results() {
        let q = query(Operation::SearchEvents, json!({"data": {}}));
        assert!(map_response(&q, Ok(json!([]))).unwrap().is_empty());
        assert!(map_response(&q, Ok(json!(null))).unwrap().is_empty());
        assert!(map_response(&q, Ok(json!({"data": {"events": null}})))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_search_rejects_mapping_result() {
        let q = query(Operation::SearchReceivers, json!({"data": {}}));
        let err = map_response(&q, Ok(receiver(ID))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_fetch_single_element_list() {
        let q = query(Operation::FetchReceiver, json!(ID));
        let mapped = map_response(&q, Ok(json!([receiver(ID)]))).unwrap();
        assert_eq!(mapped.one().unwrap().kind(), ResourceKind::EventReceiver);
    }

    #[test]
    fn test_fetch_empty_is_not_found() {
        let q = query(Operation::FetchReceiver, json!(ID));
        let err = map_response(&q, Ok(json!({"data": {"event_receivers": []}}))).unwrap_err();
        assert_eq!(
            err,
            CoreError::Remote {
                status: Some(404),
                message: format!("EventReceiver '{}' not found", ID)
            }
        );
    }

    #[test]
    fn test_decode_lists_every_missing_key() {
        let q = query(Operation::FetchReceiver, json!(ID));
        let err = map_response(&q, Ok(json!({"id": ID, "name": "x", "type": null}))).unwrap_err();
        match err {
            CoreError::Decode {
                resource,
                missing_keys,
                ..
            } => {
                assert_eq!(resource, ResourceKind::EventReceiver);
                assert_eq!(missing_keys, vec!["type", "version", "description"]);
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_reports_ill_typed_keys() {
        let q = query(Operation::FetchReceiver, json!(ID));
        let mut body = receiver(ID);
        body["version"] = json!(3);
        let err = map_response(&q, Ok(body)).unwrap_err();
        match err {
            CoreError::Decode {
                missing_keys,
                detail,
                ..
            } => {
                assert!(missing_keys.is_empty());
                assert!(detail.is_some());
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_envelopes() {
        let q = query(Operation::FetchEvent, json!(ID));

        let err = map_response(&q, Ok(json!({"error": "not found", "status": 404}))).unwrap_err();
        assert_eq!(
            err,
            CoreError::Remote {
                status: Some(404),
                message: "not found".to_string()
            }
        );

        let err = map_response(
            &q,
            Ok(json!({"data": null, "errors": [{"message": "a"}, {"message": "b"}]})),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::Remote {
                status: None,
                message: "a; b".to_string()
            }
        );
    }

    #[test]
    fn test_status_failures() {
        let q = query(Operation::FetchEvent, json!(ID));

        let err = map_response(
            &q,
            Err(TransportFailure::Status {
                status: 409,
                body: json!({"error": {"message": "duplicate"}}),
            }),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::Remote {
                status: Some(409),
                message: "duplicate".to_string()
            }
        );

        let err = map_response(
            &q,
            Err(TransportFailure::Status {
                status: 502,
                body: json!("<html>bad gateway</html>"),
            }),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.is_recoverable());

        let err = map_response(&q, Err(TransportFailure::Timeout { after_ms: 5 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_create_with_bare_identifier() {
        let q = query(
            Operation::CreateGroup,
            json!({"data": {
                "name": "all",
                "type": "bundle",
                "version": "1.0.0",
                "description": "everything",
                "event_receiver_ids": [ID]
            }}),
        );
        let new_id = "01HPW0DY340VMM3DNMX8JCQDGN";
        let body = json!({"data": {"create_event_receiver_group": new_id}});
        let mapped = map_response(&q, Ok(body)).unwrap();
        let group = mapped.one().unwrap().as_group().unwrap();
        assert_eq!(group.id, new_id);
        assert_eq!(group.event_receiver_ids, vec![ID]);
        assert!(group.enabled);
    }

    #[test]
    fn test_group_ids_retrimmed() {
        let q = query(Operation::SearchGroups, json!({"data": {}}));
        let body = json!([{
            "id": ID,
            "name": "all",
            "type": "bundle",
            "version": "1.0.0",
            "description": "everything",
            "event_receiver_ids": [format!("  {}", ID)]
        }]);
        let mapped = map_response(&q, Ok(body)).unwrap();
        let items = mapped.into_vec();
        assert_eq!(items[0].as_group().unwrap().event_receiver_ids, vec![ID]);
    }

    fn assert_bad_identifier(err: CoreError, field: &str) {
        match err {
            CoreError::Decode { detail, .. } => {
                assert_eq!(detail, Some(format!("{}: not an identifier", field)));
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_group_member_id_rejected() {
        let q = query(Operation::SearchGroups, json!({"data": {}}));
        let body = json!([{
            "id": ID,
            "name": "all",
            "type": "bundle",
            "version": "1.0.0",
            "description": "everything",
            "event_receiver_ids": [ID, "   ", "short"]
        }]);
        let err = map_response(&q, Ok(body)).unwrap_err();
        assert_bad_identifier(err, "event_receiver_ids[1]");
    }

    #[test]
    fn test_bad_top_level_id_rejected() {
        let q = query(Operation::SearchReceivers, json!({"data": {}}));
        let err = map_response(&q, Ok(json!([receiver("nope")]))).unwrap_err();
        assert_bad_identifier(err, "id");

        let q = query(Operation::FetchEvent, json!(ID));
        let body = json!({
            "id": ID,
            "name": "foo",
            "version": "1.0.0",
            "release": "2023.11.16",
            "platform_id": "x86-64-gnu-linux-7",
            "package": "rpm",
            "description": "d",
            "event_receiver_id": "01ARZ3NDEKTSV4RRFFQ69G5F",
            "success": true
        });
        let err = map_response(&q, Ok(body)).unwrap_err();
        assert_bad_identifier(err, "event_receiver_id");
    }

    #[test]
    fn test_create_with_empty_bare_identifier() {
        let q = query(
            Operation::CreateReceiver,
            json!({"data": {
                "name": "builds",
                "type": "build",
                "version": "1.0.0",
                "description": "d"
            }}),
        );
        let err = map_response(&q, Ok(json!({"data": {"create_event_receiver": ""}}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_bad_identifier(err, "id");
    }
}
