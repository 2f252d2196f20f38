//! Resource kinds and identifiers

use serde::{Deserialize, Serialize};

/// Length of every registry identifier
pub const IDENTIFIER_LEN: usize = 26;

/// Returns true if `value` is a registry identifier
///
/// Identifiers are ULID-shaped: exactly 26 ASCII alphanumeric characters,
/// case-sensitive.
pub fn is_identifier(value: &str) -> bool {
    value.len() == IDENTIFIER_LEN && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

const EVENT_FIELDS: &[&str] = &[
    "id",
    "name",
    "version",
    "release",
    "platform_id",
    "package",
    "description",
    "success",
    "event_receiver_id",
    "created_at",
    "payload",
];

const RECEIVER_FIELDS: &[&str] = &[
    "id",
    "name",
    "type",
    "version",
    "description",
    "schema",
    "fingerprint",
    "created_at",
];

const GROUP_FIELDS: &[&str] = &[
    "id",
    "name",
    "type",
    "version",
    "description",
    "enabled",
    "event_receiver_ids",
    "fingerprint",
    "created_at",
    "updated_at",
];

/// The three resource kinds held by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Event,
    EventReceiver,
    EventReceiverGroup,
}

impl ResourceKind {
    /// All resource kinds
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Event,
        ResourceKind::EventReceiver,
        ResourceKind::EventReceiverGroup,
    ];

    /// Type name (e.g. `EventReceiver`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Event => "Event",
            ResourceKind::EventReceiver => "EventReceiver",
            ResourceKind::EventReceiverGroup => "EventReceiverGroup",
        }
    }

    /// Snake-case singular name used as an argument name (e.g. `event_receiver`)
    pub fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Event => "event",
            ResourceKind::EventReceiver => "event_receiver",
            ResourceKind::EventReceiverGroup => "event_receiver_group",
        }
    }

    /// Snake-case plural name used as a collection name (e.g. `event_receivers`)
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Event => "events",
            ResourceKind::EventReceiver => "event_receivers",
            ResourceKind::EventReceiverGroup => "event_receiver_groups",
        }
    }

    /// Canonical field selection requested for this kind
    ///
    /// Fixed per kind; callers cannot change it.
    pub fn field_selection(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Event => EVENT_FIELDS,
            ResourceKind::EventReceiver => RECEIVER_FIELDS,
            ResourceKind::EventReceiverGroup => GROUP_FIELDS,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
