//! Schema Registry
//!
//! A fixed table mapping each of the nine operations to the schema its input
//! must satisfy. Schemas are `'static` data; nothing here is mutable at
//! runtime except the lazily compiled lexical patterns.
//!
//! ## Envelopes
//!
//! | Operation kind | Envelope | Example input |
//! |----------------|----------|---------------|
//! | Fetch | `Scalar` | `"01ARZ3NDEKTSV4RRFFQ69G5FAV"` |
//! | Search | `Mapping` | `{"data": {"name": "foo"}}` |
//! | Create | `Mapping` | `{"data": {"name": "foo", ...}}` |

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::resource::{is_identifier, ResourceKind};

/// The nine operations understood by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    FetchEvent,
    FetchReceiver,
    FetchGroup,
    SearchEvents,
    SearchReceivers,
    SearchGroups,
    CreateEvent,
    CreateReceiver,
    CreateGroup,
}

/// What an operation does, independent of resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Look up one object by identifier
    Fetch,
    /// Filter objects by field values
    Search,
    /// Create a new object
    Create,
}

impl Operation {
    /// Every operation, in registry order
    pub const ALL: [Operation; 9] = [
        Operation::FetchEvent,
        Operation::FetchReceiver,
        Operation::FetchGroup,
        Operation::SearchEvents,
        Operation::SearchReceivers,
        Operation::SearchGroups,
        Operation::CreateEvent,
        Operation::CreateReceiver,
        Operation::CreateGroup,
    ];

    /// Wire name of the operation (e.g. `search_receivers`)
    pub fn name(&self) -> &'static str {
        match self {
            Operation::FetchEvent => "fetch_event",
            Operation::FetchReceiver => "fetch_receiver",
            Operation::FetchGroup => "fetch_group",
            Operation::SearchEvents => "search_events",
            Operation::SearchReceivers => "search_receivers",
            Operation::SearchGroups => "search_groups",
            Operation::CreateEvent => "create_event",
            Operation::CreateReceiver => "create_receiver",
            Operation::CreateGroup => "create_group",
        }
    }

    /// Wire names of every operation
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Operation::name).collect()
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::FetchEvent | Operation::FetchReceiver | Operation::FetchGroup => {
                OperationKind::Fetch
            }
            Operation::SearchEvents | Operation::SearchReceivers | Operation::SearchGroups => {
                OperationKind::Search
            }
            Operation::CreateEvent | Operation::CreateReceiver | Operation::CreateGroup => {
                OperationKind::Create
            }
        }
    }

    pub fn resource(&self) -> ResourceKind {
        match self {
            Operation::FetchEvent | Operation::SearchEvents | Operation::CreateEvent => {
                ResourceKind::Event
            }
            Operation::FetchReceiver | Operation::SearchReceivers | Operation::CreateReceiver => {
                ResourceKind::EventReceiver
            }
            Operation::FetchGroup | Operation::SearchGroups | Operation::CreateGroup => {
                ResourceKind::EventReceiverGroup
            }
        }
    }

    /// Schema registered for this operation
    pub fn schema(&self) -> &'static Schema {
        match self {
            Operation::FetchEvent => &FETCH_EVENT,
            Operation::FetchReceiver => &FETCH_RECEIVER,
            Operation::FetchGroup => &FETCH_GROUP,
            Operation::SearchEvents => &SEARCH_EVENTS,
            Operation::SearchReceivers => &SEARCH_RECEIVERS,
            Operation::SearchGroups => &SEARCH_GROUPS,
            Operation::CreateEvent => &CREATE_EVENT,
            Operation::CreateReceiver => &CREATE_RECEIVER,
            Operation::CreateGroup => &CREATE_GROUP,
        }
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| CoreError::UnknownOperation {
                name: s.to_string(),
            })
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of the top-level input value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    /// A bare scalar, bound to the single declared field
    Scalar,
    /// A mapping with the fields nested under a `data` key
    Mapping,
}

impl Envelope {
    /// Key under which `Mapping` envelopes carry their fields
    pub const DATA_KEY: &'static str = "data";
}

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Boolean,
    Mapping,
    IdentifierList,
}

impl FieldType {
    /// Name used in type violations
    pub fn describe(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Mapping => "mapping",
            FieldType::IdentifierList => "list of identifiers",
        }
    }
}

/// Lexical patterns a string field can be held to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Identifier,
    Name,
    Version,
    Release,
    PlatformId,
    Package,
    Type,
}

static NAME_RE: OnceLock<Option<Regex>> = OnceLock::new();
static VERSION_RE: OnceLock<Option<Regex>> = OnceLock::new();
static RELEASE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PLATFORM_ID_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PACKAGE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static TYPE_RE: OnceLock<Option<Regex>> = OnceLock::new();

impl Pattern {
    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Identifier => "identifier",
            Pattern::Name => "name",
            Pattern::Version => "version",
            Pattern::Release => "release",
            Pattern::PlatformId => "platform_id",
            Pattern::Package => "package",
            Pattern::Type => "type",
        }
    }

    /// Regular expression source for this pattern
    pub fn source(&self) -> &'static str {
        match self {
            Pattern::Identifier => "^[0-9A-Za-z]{26}$",
            Pattern::Name => {
                r"^[A-Za-z0-9]+([._-]?[A-Za-z0-9]+)*(/[A-Za-z0-9]+([._-]?[A-Za-z0-9]+)*)*$"
            }
            Pattern::Version => {
                r"^v?[0-9]+(\.[0-9]+)?(\.[0-9]+)?(-[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$"
            }
            Pattern::Release => r"^\S+$",
            Pattern::PlatformId => "^([0-9a-zA-Z]+)(-[0-9a-zA-Z]+)+$",
            Pattern::Package => "^[A-Za-z]+$",
            Pattern::Type => "^[^ ]+$",
        }
    }

    /// Human-readable description used in constraint violations
    pub fn hint(&self) -> &'static str {
        match self {
            Pattern::Identifier => "26 alphanumeric characters",
            Pattern::Name => "alphanumeric segments joined by '.', '_', '-' or '/'",
            Pattern::Version => "a semantic version such as 1.0.0 or v1.0.0",
            Pattern::Release => "no whitespace",
            Pattern::PlatformId => "dash-separated alphanumeric parts such as x86-64-gnu-linux",
            Pattern::Package => "letters only",
            Pattern::Type => "no spaces",
        }
    }

    fn compiled(&self) -> Option<&'static Regex> {
        let cell = match self {
            Pattern::Identifier => return None,
            Pattern::Name => &NAME_RE,
            Pattern::Version => &VERSION_RE,
            Pattern::Release => &RELEASE_RE,
            Pattern::PlatformId => &PLATFORM_ID_RE,
            Pattern::Package => &PACKAGE_RE,
            Pattern::Type => &TYPE_RE,
        };
        cell.get_or_init(|| Regex::new(self.source()).ok()).as_ref()
    }

    /// Returns true if `value` satisfies this pattern
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Pattern::Identifier => is_identifier(value),
            _ => self.compiled().map_or(false, |re| re.is_match(value)),
        }
    }
}

/// A rule a present field value must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// String has at least this many characters
    MinLength(usize),
    /// String matches the pattern
    Pattern(Pattern),
    /// List has at least this many elements
    MinItems(usize),
    /// Every list element matches the pattern
    EachMatches(Pattern),
}

impl Constraint {
    /// Rule name reported in violations (e.g. `pattern(version)`)
    pub fn name(&self) -> String {
        match self {
            Constraint::MinLength(n) => format!("min_length({})", n),
            Constraint::Pattern(p) => format!("pattern({})", p.name()),
            Constraint::MinItems(n) => format!("min_items({})", n),
            Constraint::EachMatches(p) => format!("each_matches({})", p.name()),
        }
    }
}

/// Declaration of one input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub constraints: &'static [Constraint],
    pub description: &'static str,
}

impl FieldSpec {
    const fn required(
        name: &'static str,
        ty: FieldType,
        constraints: &'static [Constraint],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            ty,
            required: true,
            constraints,
            description,
        }
    }

    const fn optional(
        name: &'static str,
        ty: FieldType,
        constraints: &'static [Constraint],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            ty,
            required: false,
            constraints,
            description,
        }
    }
}

/// Input schema of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub operation: Operation,
    pub envelope: Envelope,
    /// Fields in declaration order; violations are reported in this order
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Field rules
// ═══════════════════════════════════════════════════════════════════════════

const ID: &[Constraint] = &[Constraint::Pattern(Pattern::Identifier)];
const NAME: &[Constraint] = &[Constraint::MinLength(1), Constraint::Pattern(Pattern::Name)];
const VERSION: &[Constraint] = &[
    Constraint::MinLength(1),
    Constraint::Pattern(Pattern::Version),
];
const RELEASE: &[Constraint] = &[
    Constraint::MinLength(1),
    Constraint::Pattern(Pattern::Release),
];
const PLATFORM_ID: &[Constraint] = &[
    Constraint::MinLength(1),
    Constraint::Pattern(Pattern::PlatformId),
];
const PACKAGE: &[Constraint] = &[
    Constraint::MinLength(1),
    Constraint::Pattern(Pattern::Package),
];
const TYPE: &[Constraint] = &[Constraint::MinLength(1), Constraint::Pattern(Pattern::Type)];
const DESCRIPTION: &[Constraint] = &[Constraint::MinLength(1)];
const RECEIVER_IDS: &[Constraint] = &[
    Constraint::MinItems(1),
    Constraint::EachMatches(Pattern::Identifier),
];

const FETCH_FIELDS: &[FieldSpec] = &[FieldSpec::required(
    "id",
    FieldType::String,
    ID,
    "Identifier of the object to fetch",
)];

const EVENT_SEARCH_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("id", FieldType::String, ID, "Event identifier"),
    FieldSpec::optional("name", FieldType::String, NAME, "Event name"),
    FieldSpec::optional("version", FieldType::String, VERSION, "Event version"),
    FieldSpec::optional("release", FieldType::String, RELEASE, "Release label"),
    FieldSpec::optional("platform_id", FieldType::String, PLATFORM_ID, "Platform identifier"),
    FieldSpec::optional("package", FieldType::String, PACKAGE, "Package type"),
    FieldSpec::optional("description", FieldType::String, DESCRIPTION, "Event description"),
    FieldSpec::optional("event_receiver_id", FieldType::String, ID, "Receiver identifier"),
    FieldSpec::optional("success", FieldType::Boolean, &[], "Whether the event succeeded"),
];

const EVENT_CREATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", FieldType::String, NAME, "Event name"),
    FieldSpec::required("version", FieldType::String, VERSION, "Event version"),
    FieldSpec::required("release", FieldType::String, RELEASE, "Release label"),
    FieldSpec::required("platform_id", FieldType::String, PLATFORM_ID, "Platform identifier"),
    FieldSpec::required("package", FieldType::String, PACKAGE, "Package type"),
    FieldSpec::required("description", FieldType::String, DESCRIPTION, "Event description"),
    FieldSpec::required("event_receiver_id", FieldType::String, ID, "Receiver identifier"),
    FieldSpec::required("success", FieldType::Boolean, &[], "Whether the event succeeded"),
    FieldSpec::required("payload", FieldType::Mapping, &[], "Arbitrary JSON payload"),
];

const RECEIVER_SEARCH_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("id", FieldType::String, ID, "Receiver identifier"),
    FieldSpec::optional("name", FieldType::String, NAME, "Receiver name"),
    FieldSpec::optional("type", FieldType::String, TYPE, "Receiver type"),
    FieldSpec::optional("version", FieldType::String, VERSION, "Receiver version"),
    FieldSpec::optional("description", FieldType::String, DESCRIPTION, "Receiver description"),
];

const RECEIVER_CREATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", FieldType::String, NAME, "Receiver name"),
    FieldSpec::required("type", FieldType::String, TYPE, "Receiver type"),
    FieldSpec::required("version", FieldType::String, VERSION, "Receiver version"),
    FieldSpec::required("description", FieldType::String, DESCRIPTION, "Receiver description"),
];

const GROUP_SEARCH_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("id", FieldType::String, ID, "Group identifier"),
    FieldSpec::optional("name", FieldType::String, NAME, "Group name"),
    FieldSpec::optional("type", FieldType::String, TYPE, "Group type"),
    FieldSpec::optional("version", FieldType::String, VERSION, "Group version"),
    FieldSpec::optional("description", FieldType::String, DESCRIPTION, "Group description"),
];

const GROUP_CREATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", FieldType::String, NAME, "Group name"),
    FieldSpec::required("type", FieldType::String, TYPE, "Group type"),
    FieldSpec::required("version", FieldType::String, VERSION, "Group version"),
    FieldSpec::required("description", FieldType::String, DESCRIPTION, "Group description"),
    FieldSpec::required(
        "event_receiver_ids",
        FieldType::IdentifierList,
        RECEIVER_IDS,
        "Member receiver identifiers, in order",
    ),
];

// ═══════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════

static FETCH_EVENT: Schema = Schema {
    operation: Operation::FetchEvent,
    envelope: Envelope::Scalar,
    fields: FETCH_FIELDS,
};
static FETCH_RECEIVER: Schema = Schema {
    operation: Operation::FetchReceiver,
    envelope: Envelope::Scalar,
    fields: FETCH_FIELDS,
};
static FETCH_GROUP: Schema = Schema {
    operation: Operation::FetchGroup,
    envelope: Envelope::Scalar,
    fields: FETCH_FIELDS,
};
static SEARCH_EVENTS: Schema = Schema {
    operation: Operation::SearchEvents,
    envelope: Envelope::Mapping,
    fields: EVENT_SEARCH_FIELDS,
};
static SEARCH_RECEIVERS: Schema = Schema {
    operation: Operation::SearchReceivers,
    envelope: Envelope::Mapping,
    fields: RECEIVER_SEARCH_FIELDS,
};
static SEARCH_GROUPS: Schema = Schema {
    operation: Operation::SearchGroups,
    envelope: Envelope::Mapping,
    fields: GROUP_SEARCH_FIELDS,
};
static CREATE_EVENT: Schema = Schema {
    operation: Operation::CreateEvent,
    envelope: Envelope::Mapping,
    fields: EVENT_CREATE_FIELDS,
};
static CREATE_RECEIVER: Schema = Schema {
    operation: Operation::CreateReceiver,
    envelope: Envelope::Mapping,
    fields: RECEIVER_CREATE_FIELDS,
};
static CREATE_GROUP: Schema = Schema {
    operation: Operation::CreateGroup,
    envelope: Envelope::Mapping,
    fields: GROUP_CREATE_FIELDS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_compiles() {
        for pattern in [
            Pattern::Name,
            Pattern::Version,
            Pattern::Release,
            Pattern::PlatformId,
            Pattern::Package,
            Pattern::Type,
        ] {
            assert!(pattern.compiled().is_some(), "{} failed to compile", pattern.name());
        }
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
            assert_eq!(op.schema().operation, op);
        }
        assert!("delete_event".parse::<Operation>().is_err());
        assert_eq!(Operation::names().len(), 9);
    }

    #[test]
    fn test_envelopes() {
        for op in Operation::ALL {
            let expected = match op.kind() {
                OperationKind::Fetch => Envelope::Scalar,
                _ => Envelope::Mapping,
            };
            assert_eq!(op.schema().envelope, expected);
        }
    }

    #[test]
    fn test_search_fields_are_optional() {
        for op in [
            Operation::SearchEvents,
            Operation::SearchReceivers,
            Operation::SearchGroups,
        ] {
            assert_eq!(op.schema().required_fields().count(), 0);
            assert_eq!(op.schema().fields[0].name, "id");
        }
    }

    #[test]
    fn test_create_group_requires_receiver_ids() {
        let field = Operation::CreateGroup
            .schema()
            .field("event_receiver_ids")
            .unwrap();
        assert!(field.required);
        assert_eq!(field.ty, FieldType::IdentifierList);
        assert!(field.constraints.contains(&Constraint::MinItems(1)));
    }

    #[test]
    fn test_name_pattern() {
        assert!(Pattern::Name.is_match("foo"));
        assert!(Pattern::Name.is_match("foo.bar-baz_1"));
        assert!(Pattern::Name.is_match("org/project"));
        assert!(!Pattern::Name.is_match("foo bar"));
        assert!(!Pattern::Name.is_match("foo..bar"));
        assert!(!Pattern::Name.is_match("-foo"));
    }

    #[test]
    fn test_version_pattern() {
        assert!(Pattern::Version.is_match("1"));
        assert!(Pattern::Version.is_match("1.0.0"));
        assert!(Pattern::Version.is_match("1.2.3-rc.1+build.5"));
        assert!(Pattern::Version.is_match("v1.0.0"));
        assert!(!Pattern::Version.is_match("V1.0.0"));
        assert!(!Pattern::Version.is_match("version-1"));
        assert!(!Pattern::Version.is_match("1.0.0 "));
    }

    #[test]
    fn test_other_patterns() {
        assert!(Pattern::Release.is_match("2023.11.16"));
        assert!(!Pattern::Release.is_match("2023 11"));
        assert!(Pattern::PlatformId.is_match("x86-64-gnu-linux-7"));
        assert!(!Pattern::PlatformId.is_match("linux"));
        assert!(Pattern::Package.is_match("rpm"));
        assert!(!Pattern::Package.is_match("rpm4"));
        assert!(Pattern::Type.is_match("dev.example.build"));
        assert!(!Pattern::Type.is_match("two words"));
        assert!(Pattern::Identifier.is_match("01ARZ3NDEKTSV4RRFFQ69G5FAV"));
    }

    #[test]
    fn test_constraint_names() {
        assert_eq!(Constraint::MinItems(1).name(), "min_items(1)");
        assert_eq!(
            Constraint::EachMatches(Pattern::Identifier).name(),
            "each_matches(identifier)"
        );
        assert_eq!(Constraint::Pattern(Pattern::Version).name(), "pattern(version)");
    }
}
