//! MCP tool surface
//!
//! One tool per core operation. Input schemas are generated from the
//! schema registry, so the published contract and the validator never
//! drift apart.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use epr_core::{
    invoke, ApiClient, CallContext, Constraint, CoreError, Envelope, FieldSpec, FieldType,
    Operation, OperationKind, ResourceKind,
};

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (the operation name)
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Description shown to the agent
    pub description: String,

    /// JSON Schema for the tool arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool call request
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Tool call response
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

impl ToolResult {
    fn ok(value: &impl Serialize) -> Self {
        Self {
            content: vec![ToolContent::text(to_pretty(value))],
            is_error: false,
        }
    }

    fn error(err: &CoreError) -> Self {
        Self {
            content: vec![ToolContent::text(to_pretty(&err.to_error_response()))],
            is_error: true,
        }
    }
}

fn to_pretty(value: &impl Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn noun(resource: ResourceKind) -> &'static str {
    match resource {
        ResourceKind::Event => "event",
        ResourceKind::EventReceiver => "event receiver",
        ResourceKind::EventReceiverGroup => "event receiver group",
    }
}

fn title_noun(resource: ResourceKind) -> &'static str {
    match resource {
        ResourceKind::Event => "Event",
        ResourceKind::EventReceiver => "Event Receiver",
        ResourceKind::EventReceiverGroup => "Event Receiver Group",
    }
}

/// Tool definition for one operation
pub fn tool_definition(operation: Operation) -> ToolDefinition {
    let resource = operation.resource();
    let (title, description) = match operation.kind() {
        OperationKind::Fetch => (
            format!("Fetch {}", title_noun(resource)),
            format!("Fetch an {} from EPR by its 26-character id", noun(resource)),
        ),
        OperationKind::Search => (
            format!("Search {}s", title_noun(resource)),
            format!(
                "Search for {}s in EPR. Every supplied field must match; an empty data object matches everything.",
                noun(resource)
            ),
        ),
        OperationKind::Create => (
            format!("Create {}", title_noun(resource)),
            format!("Create a new {} in EPR", noun(resource)),
        ),
    };

    ToolDefinition {
        name: operation.name().to_string(),
        title,
        description,
        input_schema: input_schema(operation),
    }
}

/// Get all EPR tool definitions, in registry order
pub fn tool_definitions() -> Vec<ToolDefinition> {
    Operation::ALL.iter().copied().map(tool_definition).collect()
}

/// JSON Schema describing the arguments of `operation`'s tool
pub fn input_schema(operation: Operation) -> Value {
    let schema = operation.schema();
    let object = fields_schema(schema.fields);
    match schema.envelope {
        Envelope::Scalar => object,
        Envelope::Mapping => {
            let mut properties = Map::new();
            properties.insert(Envelope::DATA_KEY.to_string(), object);
            json!({
                "type": "object",
                "required": [Envelope::DATA_KEY],
                "properties": properties
            })
        }
    }
}

fn fields_schema(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for spec in fields {
        properties.insert(spec.name.to_string(), field_schema(spec));
        if spec.required {
            required.push(Value::String(spec.name.to_string()));
        }
    }

    let mut object = Map::new();
    object.insert("type".to_string(), json!("object"));
    if !required.is_empty() {
        object.insert("required".to_string(), Value::Array(required));
    }
    object.insert("properties".to_string(), Value::Object(properties));
    Value::Object(object)
}

/// Optional (search) fields only publish their type: blank values are
/// accepted and dropped by the validator.
fn field_schema(spec: &FieldSpec) -> Value {
    let mut schema = Map::new();
    match spec.ty {
        FieldType::String => {
            schema.insert("type".to_string(), json!("string"));
        }
        FieldType::Boolean => {
            schema.insert("type".to_string(), json!("boolean"));
        }
        FieldType::Mapping => {
            schema.insert("type".to_string(), json!("object"));
        }
        FieldType::IdentifierList => {
            schema.insert("type".to_string(), json!("array"));
            schema.insert("items".to_string(), json!({"type": "string"}));
        }
    }
    schema.insert("description".to_string(), json!(spec.description));

    if spec.required {
        for constraint in spec.constraints {
            match constraint {
                Constraint::MinLength(n) => {
                    schema.insert("minLength".to_string(), json!(n));
                }
                Constraint::Pattern(p) => {
                    schema.insert("pattern".to_string(), json!(p.source()));
                }
                Constraint::MinItems(n) => {
                    schema.insert("minItems".to_string(), json!(n));
                }
                Constraint::EachMatches(p) => {
                    schema.insert(
                        "items".to_string(),
                        json!({"type": "string", "pattern": p.source()}),
                    );
                }
            }
        }
    }
    Value::Object(schema)
}

/// Turn tool arguments into the raw input the core expects
///
/// Fetch tools take `{"id": ...}` (a bare id is accepted too); search and
/// create tools take `{"data": {...}}` unchanged.
pub fn raw_input(operation: Operation, arguments: Value) -> Value {
    match operation.schema().envelope {
        Envelope::Scalar => match arguments {
            Value::Object(mut args) => args.remove("id").unwrap_or(Value::Null),
            other => other,
        },
        Envelope::Mapping => arguments,
    }
}

/// Run a tool call for a known operation
pub async fn call_tool<C>(client: &C, operation: Operation, arguments: Value, ctx: &CallContext) -> ToolResult
where
    C: ApiClient + ?Sized,
{
    let raw = raw_input(operation, arguments);
    match invoke(client, operation.name(), raw, ctx).await {
        Ok(mapped) => ToolResult::ok(&mapped),
        Err(err) => {
            tracing::debug!(tool = operation.name(), code = err.error_code(), "Tool call failed");
            ToolResult::error(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_tools() {
        let tools = tool_definitions();
        assert_eq!(tools.len(), 9);
        assert_eq!(tools[0].name, "fetch_event");
        assert_eq!(tools[0].title, "Fetch Event");
        assert_eq!(tools[5].title, "Search Event Receiver Groups");
        assert_eq!(tools[8].title, "Create Event Receiver Group");
    }

    #[test]
    fn test_fetch_schema() {
        let schema = input_schema(Operation::FetchReceiver);
        assert_eq!(schema["required"], json!(["id"]));
        assert_eq!(schema["properties"]["id"]["pattern"], "^[0-9A-Za-z]{26}$");
    }

    #[test]
    fn test_create_group_schema() {
        let schema = input_schema(Operation::CreateGroup);
        assert_eq!(schema["required"], json!(["data"]));
        let ids = &schema["properties"]["data"]["properties"]["event_receiver_ids"];
        assert_eq!(ids["type"], "array");
        assert_eq!(ids["minItems"], 1);
        assert_eq!(ids["items"]["pattern"], "^[0-9A-Za-z]{26}$");
    }

    #[test]
    fn test_search_schema_has_no_required_fields() {
        let schema = input_schema(Operation::SearchEvents);
        let data = &schema["properties"]["data"];
        assert!(data.get("required").is_none());
        assert_eq!(data["properties"]["success"]["type"], "boolean");
        assert!(data["properties"]["name"].get("pattern").is_none());
    }

    #[test]
    fn test_raw_input() {
        let id = "01ARZ3NDEKTSV4RRFFQ69G5FAV";
        assert_eq!(raw_input(Operation::FetchEvent, json!({"id": id})), json!(id));
        assert_eq!(raw_input(Operation::FetchEvent, json!(id)), json!(id));
        assert_eq!(raw_input(Operation::FetchEvent, json!({})), Value::Null);
        assert_eq!(
            raw_input(Operation::SearchEvents, json!({"data": {}})),
            json!({"data": {}})
        );
    }
}
