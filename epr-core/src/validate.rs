//! Schema validation
//!
//! Applies an operation's [`Schema`] to raw caller input. Every declared
//! field is checked in declaration order and every problem is collected, so
//! one [`ValidationError`] describes everything wrong with the invocation.
//!
//! Envelope mismatches short-circuit: if the input does not even have the
//! right outer shape there are no fields to inspect.
//!
//! Fields the schema does not declare are ignored and never reach the
//! validated record.

use serde_json::{Map, Value};

use crate::error::{ValidationError, Violation};
use crate::resource::ResourceKind;
use crate::sanitize::sanitize;
use crate::schema::{Constraint, Envelope, FieldSpec, FieldType, Operation, Pattern, Schema};

/// Longest value excerpt quoted in a constraint violation
const SUMMARY_LIMIT: usize = 32;

/// Input that passed validation for one operation
///
/// Holds only declared, present fields with their sanitized values. Can only
/// be produced by [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    operation: Operation,
    fields: Map<String, Value>,
}

impl ValidatedRecord {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn resource(&self) -> ResourceKind {
        self.operation.resource()
    }

    /// Validated fields in schema-declaration order
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

/// Name of a JSON value's type, as used in shape and type violations
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

fn summarize(value: &str) -> String {
    if value.chars().count() <= SUMMARY_LIMIT {
        value.to_string()
    } else {
        let head: String = value.chars().take(SUMMARY_LIMIT).collect();
        format!("{}...", head)
    }
}

/// Validate `raw` against the schema registered for `operation`
pub fn validate(operation: Operation, raw: Value) -> Result<ValidatedRecord, ValidationError> {
    let schema = operation.schema();
    let mut violations = Vec::new();
    let mut fields = Map::new();

    match schema.envelope {
        Envelope::Scalar => {
            if matches!(raw, Value::Object(_) | Value::Array(_)) {
                violations.push(Violation::shape("$", "scalar", json_type_name(&raw)));
            } else {
                let value = sanitize(raw);
                for spec in schema.fields {
                    check_field(spec, spec.name, Some(&value), &mut fields, &mut violations);
                }
            }
        }
        Envelope::Mapping => match raw {
            Value::Object(mut outer) => match outer.remove(Envelope::DATA_KEY) {
                None | Some(Value::Null) => {
                    violations.push(Violation::missing(Envelope::DATA_KEY));
                }
                Some(Value::Object(data)) => {
                    let data = sanitize(Value::Object(data));
                    check_mapping(schema, &data, &mut fields, &mut violations);
                }
                Some(other) => {
                    violations.push(Violation::shape(
                        Envelope::DATA_KEY,
                        "mapping",
                        json_type_name(&other),
                    ));
                }
            },
            other => {
                violations.push(Violation::shape("$", "mapping", json_type_name(&other)));
            }
        },
    }

    if violations.is_empty() {
        tracing::debug!(
            operation = %operation,
            fields = fields.len(),
            "Input validated"
        );
        Ok(ValidatedRecord { operation, fields })
    } else {
        tracing::debug!(
            operation = %operation,
            violations = violations.len(),
            "Input rejected"
        );
        Err(ValidationError {
            operation,
            resource: operation.resource(),
            violations,
        })
    }
}

fn check_mapping(
    schema: &Schema,
    data: &Value,
    fields: &mut Map<String, Value>,
    violations: &mut Vec<Violation>,
) {
    for spec in schema.fields {
        let path = format!("{}.{}", Envelope::DATA_KEY, spec.name);
        check_field(spec, &path, data.get(spec.name), fields, violations);
    }
}

fn check_field(
    spec: &FieldSpec,
    path: &str,
    value: Option<&Value>,
    fields: &mut Map<String, Value>,
    violations: &mut Vec<Violation>,
) {
    let value = match value {
        None | Some(Value::Null) => {
            if spec.required {
                violations.push(Violation::missing(path));
            }
            return;
        }
        Some(value) => value,
    };

    match (spec.ty, value) {
        (FieldType::String, Value::String(s)) => {
            if s.is_empty() {
                if spec.required {
                    violations.push(Violation::missing(path));
                }
                return;
            }
            if let Some(violation) = check_string(spec.constraints, path, s) {
                violations.push(violation);
                return;
            }
        }
        (FieldType::Boolean, Value::Bool(_)) | (FieldType::Mapping, Value::Object(_)) => {}
        (FieldType::IdentifierList, Value::Array(items)) => {
            let before = violations.len();
            check_list(spec.constraints, path, items, violations);
            if violations.len() != before {
                return;
            }
        }
        (ty, other) => {
            violations.push(Violation::wrong_type(
                path,
                ty.describe(),
                json_type_name(other),
            ));
            return;
        }
    }

    fields.insert(spec.name.to_string(), value.clone());
}

/// First constraint `value` violates, if any
fn check_string(constraints: &[Constraint], path: &str, value: &str) -> Option<Violation> {
    constraints.iter().find_map(|constraint| match constraint {
        Constraint::MinLength(min) if value.chars().count() < *min => Some(Violation::constraint(
            path,
            constraint.name(),
            format!("'{}' is shorter than {} characters", summarize(value), min),
        )),
        Constraint::Pattern(pattern) if !pattern.is_match(value) => {
            Some(pattern_violation(path, constraint, *pattern, value))
        }
        _ => None,
    })
}

fn check_list(constraints: &[Constraint], path: &str, items: &[Value], violations: &mut Vec<Violation>) {
    for constraint in constraints {
        match constraint {
            Constraint::MinItems(min) if items.len() < *min => {
                violations.push(Violation::constraint(
                    path,
                    constraint.name(),
                    format!("expected at least {} item(s), got {}", min, items.len()),
                ));
                return;
            }
            Constraint::EachMatches(pattern) => {
                for (index, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, index);
                    match item {
                        Value::String(s) if pattern.is_match(s) => {}
                        Value::String(s) => {
                            violations.push(pattern_violation(&item_path, constraint, *pattern, s));
                        }
                        other => {
                            violations.push(Violation::wrong_type(
                                item_path,
                                FieldType::String.describe(),
                                json_type_name(other),
                            ));
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn pattern_violation(path: &str, constraint: &Constraint, pattern: Pattern, value: &str) -> Violation {
    Violation::constraint(
        path,
        constraint.name(),
        format!(
            "'{}' does not match the {} pattern ({})",
            summarize(value),
            pattern.name(),
            pattern.hint()
        ),
    )
}
