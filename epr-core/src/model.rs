//! Domain objects returned to callers after response mapping

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::resource::ResourceKind;

/// A resource type the response mapper can decode
pub trait Resource: DeserializeOwned + Serialize + Sized {
    /// Kind this type decodes
    const KIND: ResourceKind;

    /// Keys that must be present (and non-null) in a raw result
    const REQUIRED_KEYS: &'static [&'static str];

    /// Post-decode normalization
    fn normalize(&mut self) {}

    /// Identifier-valued fields as (path, value), checked after decoding
    fn identifiers(&self) -> Vec<(String, &str)>;

    /// Wrap into the kind-erased domain object
    fn into_domain(self) -> DomainObject;
}

/// Treat an explicit `null` the same as an absent key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_enabled() -> bool {
    true
}

/// An event recorded in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub version: String,
    pub release: String,
    pub platform_id: String,
    pub package: String,
    pub description: String,

    /// Arbitrary JSON payload
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: Map<String, Value>,

    pub success: bool,

    /// Receiver this event targets
    pub event_receiver_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Embedded receiver, when the remote side expands it
    #[serde(
        default,
        rename = "EventReceiver",
        alias = "event_receiver",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_receiver: Option<Value>,
}

impl Resource for Event {
    const KIND: ResourceKind = ResourceKind::Event;
    const REQUIRED_KEYS: &'static [&'static str] = &[
        "id",
        "name",
        "version",
        "release",
        "platform_id",
        "package",
        "description",
        "event_receiver_id",
        "success",
    ];

    fn identifiers(&self) -> Vec<(String, &str)> {
        vec![
            ("id".to_string(), self.id.as_str()),
            ("event_receiver_id".to_string(), self.event_receiver_id.as_str()),
        ]
    }

    fn into_domain(self) -> DomainObject {
        DomainObject::Event(self)
    }
}

/// A receiver that events are delivered to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReceiver {
    pub id: String,
    pub name: String,
    pub r#type: String,
    pub version: String,
    pub description: String,

    /// JSON schema the receiver's event payloads conform to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,

    /// SHA-256 fingerprint computed by the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Resource for EventReceiver {
    const KIND: ResourceKind = ResourceKind::EventReceiver;
    const REQUIRED_KEYS: &'static [&'static str] = &["id", "name", "type", "version", "description"];

    fn identifiers(&self) -> Vec<(String, &str)> {
        vec![("id".to_string(), self.id.as_str())]
    }

    fn into_domain(self) -> DomainObject {
        DomainObject::EventReceiver(self)
    }
}

/// An ordered group of receivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReceiverGroup {
    pub id: String,
    pub name: String,
    pub r#type: String,
    pub version: String,
    pub description: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Member receivers, in the order the registry returned them
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_receiver_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for EventReceiverGroup {
    const KIND: ResourceKind = ResourceKind::EventReceiverGroup;
    const REQUIRED_KEYS: &'static [&'static str] = &["id", "name", "type", "version", "description"];

    /// Server-returned ids are re-trimmed, same as caller input.
    fn normalize(&mut self) {
        for id in &mut self.event_receiver_ids {
            let trimmed = id.trim();
            if trimmed.len() != id.len() {
                *id = trimmed.to_string();
            }
        }
    }

    fn identifiers(&self) -> Vec<(String, &str)> {
        let members = self
            .event_receiver_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (format!("event_receiver_ids[{}]", i), id.as_str()));
        std::iter::once(("id".to_string(), self.id.as_str()))
            .chain(members)
            .collect()
    }

    fn into_domain(self) -> DomainObject {
        DomainObject::EventReceiverGroup(self)
    }
}

/// Any one of the three domain objects
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainObject {
    Event(Event),
    EventReceiver(EventReceiver),
    EventReceiverGroup(EventReceiverGroup),
}

impl DomainObject {
    /// Kind of the wrapped object
    pub fn kind(&self) -> ResourceKind {
        match self {
            DomainObject::Event(_) => ResourceKind::Event,
            DomainObject::EventReceiver(_) => ResourceKind::EventReceiver,
            DomainObject::EventReceiverGroup(_) => ResourceKind::EventReceiverGroup,
        }
    }

    /// Identifier of the wrapped object
    pub fn id(&self) -> &str {
        match self {
            DomainObject::Event(e) => &e.id,
            DomainObject::EventReceiver(r) => &r.id,
            DomainObject::EventReceiverGroup(g) => &g.id,
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            DomainObject::Event(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_receiver(&self) -> Option<&EventReceiver> {
        match self {
            DomainObject::EventReceiver(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&EventReceiverGroup> {
        match self {
            DomainObject::EventReceiverGroup(g) => Some(g),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_null_payload_becomes_empty() {
        let event: Event = serde_json::from_value(json!({
            "id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "name": "foo",
            "version": "1.0.0",
            "release": "2023.11.16",
            "platform_id": "x86-64-gnu-linux-7",
            "package": "rpm",
            "description": "a build",
            "payload": null,
            "success": true,
            "event_receiver_id": "01ARZ3NDEKTSV4RRFFQ69G5FAW"
        }))
        .unwrap();
        assert!(event.payload.is_empty());
        assert!(event.created_at.is_none());
        assert!(event.event_receiver.is_none());
    }

    #[test]
    fn test_event_reads_embedded_receiver() {
        let event: Event = serde_json::from_value(json!({
            "id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "name": "foo",
            "version": "1.0.0",
            "release": "stable",
            "platform_id": "x86-64",
            "package": "rpm",
            "description": "a build",
            "success": false,
            "event_receiver_id": "01ARZ3NDEKTSV4RRFFQ69G5FAW",
            "created_at": "2024-03-01T12:00:00Z",
            "EventReceiver": {"name": "builds"}
        }))
        .unwrap();
        assert_eq!(event.event_receiver, Some(json!({"name": "builds"})));
        assert!(event.created_at.is_some());
    }

    #[test]
    fn test_receiver_type_key() {
        let receiver: EventReceiver = serde_json::from_value(json!({
            "id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "name": "builds",
            "type": "dev.example.build",
            "version": "1.0.0",
            "description": "build events"
        }))
        .unwrap();
        assert_eq!(receiver.r#type, "dev.example.build");

        let back = serde_json::to_value(&receiver).unwrap();
        assert_eq!(back["type"], "dev.example.build");
        assert!(back.get("schema").is_none());
    }

    #[test]
    fn test_group_defaults() {
        let group: EventReceiverGroup = serde_json::from_value(json!({
            "id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "name": "all",
            "type": "bundle",
            "version": "1.0.0",
            "description": "everything"
        }))
        .unwrap();
        assert!(group.enabled);
        assert!(group.event_receiver_ids.is_empty());
    }

    #[test]
    fn test_group_normalize_trims_ids() {
        let mut group: EventReceiverGroup = serde_json::from_value(json!({
            "id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "name": "all",
            "type": "bundle",
            "version": "1.0.0",
            "description": "everything",
            "event_receiver_ids": [" 01ARZ3NDEKTSV4RRFFQ69G5FAW ", "01ARZ3NDEKTSV4RRFFQ69G5FAX"]
        }))
        .unwrap();
        group.normalize();
        assert_eq!(
            group.event_receiver_ids,
            vec!["01ARZ3NDEKTSV4RRFFQ69G5FAW", "01ARZ3NDEKTSV4RRFFQ69G5FAX"]
        );
    }

    #[test]
    fn test_domain_object_accessors() {
        let obj = DomainObject::EventReceiver(EventReceiver {
            id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            name: "builds".to_string(),
            r#type: "build".to_string(),
            version: "1.0.0".to_string(),
            description: "d".to_string(),
            schema: None,
            fingerprint: None,
            created_at: None,
        });
        assert_eq!(obj.kind(), ResourceKind::EventReceiver);
        assert_eq!(obj.id(), "01ARZ3NDEKTSV4RRFFQ69G5FAV");
        assert!(obj.as_receiver().is_some());
        assert!(obj.as_event().is_none());
    }
}
