//! Error types for EPR core operations
//!
//! Every failure the core can report belongs to a closed taxonomy
//! ([`ErrorKind`]). Validation problems are accumulated into a single
//! [`ValidationError`] so that a caller sees every violated field in one
//! round trip; failures that can only happen after the outbound call
//! (decode, remote, transport) are reported through [`CoreError`].
//!
//! # Error Codes
//!
//! Each kind has a stable, uppercase error code (e.g. `CONSTRAINT_ERROR`)
//! suitable for client-side branching and log aggregation.
//!
//! # Example
//!
//! ```rust
//! use epr_core::{prepare, CoreError, ErrorKind};
//! use serde_json::json;
//!
//! let err = prepare("fetch_event", json!("too-short")).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Constraint);
//! assert_eq!(err.http_status_code(), 400);
//!
//! if let CoreError::Validation(validation) = err {
//!     assert_eq!(validation.violations[0].path, "id");
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resource::ResourceKind;
use crate::schema::Operation;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// The closed set of failure kinds shared by every component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input envelope does not match the operation
    Shape,
    /// Required field absent or empty after sanitization
    MissingField,
    /// Field present with the wrong type
    Type,
    /// Length, pattern or list-size rule violated
    Constraint,
    /// External result malformed for the resource kind
    Decode,
    /// External system returned an application-level error
    Remote,
    /// External call failed at the network layer
    Transport,
}

impl ErrorKind {
    /// Stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Shape => "SHAPE_ERROR",
            ErrorKind::MissingField => "MISSING_FIELD_ERROR",
            ErrorKind::Type => "TYPE_ERROR",
            ErrorKind::Constraint => "CONSTRAINT_ERROR",
            ErrorKind::Decode => "DECODE_ERROR",
            ErrorKind::Remote => "REMOTE_ERROR",
            ErrorKind::Transport => "TRANSPORT_ERROR",
        }
    }

    /// Returns true for the kinds detected locally, before any external call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ErrorKind::Shape | ErrorKind::MissingField | ErrorKind::Type | ErrorKind::Constraint
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Broad grouping of errors, for callers that only need coarse handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller input rejected locally (400)
    Validation,
    /// Requested resource or operation does not exist (404)
    NotFound,
    /// Remote system answered, but not usefully (502)
    External,
    /// Remote system could not be reached (503)
    Unavailable,
}

/// A single field-level problem found during validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Path to the offending element (e.g. `data.event_receiver_ids[1]`)
    pub path: String,

    /// Which validation kind this violation belongs to
    pub kind: ErrorKind,

    /// Name of the rule that was violated (e.g. `required`, `pattern(identifier)`)
    pub constraint: String,

    /// Human-readable explanation
    pub reason: String,
}

impl Violation {
    /// Envelope mismatch at `path`
    pub fn shape(path: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self {
            path: path.into(),
            kind: ErrorKind::Shape,
            constraint: "envelope".to_string(),
            reason: format!("expected {}, got {}", expected, actual),
        }
    }

    /// Required field absent or empty
    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ErrorKind::MissingField,
            constraint: "required".to_string(),
            reason: "field is required and must not be empty".to_string(),
        }
    }

    /// Field present with the wrong type
    pub fn wrong_type(path: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self {
            path: path.into(),
            kind: ErrorKind::Type,
            constraint: format!("type({})", expected),
            reason: format!("expected {}, got {}", expected, actual),
        }
    }

    /// Constraint rule violated
    pub fn constraint(
        path: impl Into<String>,
        constraint: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            kind: ErrorKind::Constraint,
            constraint: constraint.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.kind, self.reason)
    }
}

/// Every violation found while validating one invocation
///
/// Carries no partial result. Violations are ordered by schema declaration
/// order so the list is deterministic.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Invalid input for '{operation}' ({resource}): {}", join_violations(.violations))]
pub struct ValidationError {
    /// Operation whose schema was applied
    pub operation: Operation,

    /// Resource kind the operation targets
    pub resource: ResourceKind,

    /// Field-level violations in schema-declaration order
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Kind of the first violation; the kind reported for the whole error
    pub fn primary_kind(&self) -> ErrorKind {
        self.violations
            .first()
            .map(|v| v.kind)
            .unwrap_or(ErrorKind::Shape)
    }

    /// Iterate over the paths of every violated field
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.path.as_str())
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {})", code),
        None => String::new(),
    }
}

fn fmt_decode(missing_keys: &[String], detail: &Option<String>) -> String {
    let mut parts = Vec::new();
    if !missing_keys.is_empty() {
        parts.push(format!("missing keys [{}]", missing_keys.join(", ")));
    }
    if let Some(detail) = detail {
        parts.push(detail.clone());
    }
    parts.join("; ")
}

/// Errors that can occur in the validate → build → send → map pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    // ═══════════════════════════════════════════════════════════════════════
    // Detected locally, before any external call
    // ═══════════════════════════════════════════════════════════════════════

    /// Input failed schema validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Operation name is not one of the registered operations
    #[error("Unknown operation: '{name}'. Expected one of: {}", Operation::names().join(", "))]
    UnknownOperation { name: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Detected after the external call
    // ═══════════════════════════════════════════════════════════════════════

    /// External result is malformed for the resource kind
    #[error("Malformed {resource} result: {}", fmt_decode(.missing_keys, .detail))]
    Decode {
        resource: ResourceKind,
        missing_keys: Vec<String>,
        detail: Option<String>,
    },

    /// External system reported an application-level error
    #[error("Remote error{}: {message}", fmt_status(.status))]
    Remote { status: Option<u16>, message: String },

    /// External call failed at the network layer
    #[error("Transport error: {cause}")]
    Transport { cause: String, retryable: bool },
}

impl CoreError {
    /// Returns the taxonomy kind of this error
    ///
    /// An unknown operation name is reported as a shape mismatch: the
    /// invocation itself does not fit any declared operation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(err) => err.primary_kind(),
            CoreError::UnknownOperation { .. } => ErrorKind::Shape,
            CoreError::Decode { .. } => ErrorKind::Decode,
            CoreError::Remote { .. } => ErrorKind::Remote,
            CoreError::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Returns the category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::Validation(_) => ErrorCategory::Validation,
            CoreError::UnknownOperation { .. } => ErrorCategory::NotFound,
            CoreError::Remote {
                status: Some(404), ..
            } => ErrorCategory::NotFound,
            CoreError::Decode { .. } | CoreError::Remote { .. } => ErrorCategory::External,
            CoreError::Transport { .. } => ErrorCategory::Unavailable,
        }
    }

    /// Returns the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        self.kind().code()
    }

    /// Returns true if a caller-side retry might succeed
    ///
    /// The core never retries on its own; this is a hint for the caller.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CoreError::Transport { retryable, .. } => *retryable,
            CoreError::Remote { status, .. } => {
                matches!(status, Some(408) | Some(429) | Some(500..=599))
            }
            _ => false,
        }
    }

    /// Returns the HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            CoreError::Validation(_) => 400,
            CoreError::UnknownOperation { .. } => 404,
            CoreError::Decode { .. } => 502,
            CoreError::Remote { status, .. } => status.unwrap_or(502),
            CoreError::Transport { .. } => 503,
        }
    }

    /// Returns the validation violations, empty for non-validation errors
    pub fn violations(&self) -> &[Violation] {
        match self {
            CoreError::Validation(err) => &err.violations,
            _ => &[],
        }
    }

    /// Converts this error to a JSON-serializable response object
    ///
    /// ```json
    /// {
    ///   "error": {
    ///     "code": "MISSING_FIELD_ERROR",
    ///     "kind": "missing_field",
    ///     "message": "Invalid input for 'create_receiver' ...",
    ///     "recoverable": false,
    ///     "violations": [{"path": "data.name", ...}]
    ///   }
    /// }
    /// ```
    pub fn to_error_response(&self) -> ErrorResponse {
        let status = match self {
            CoreError::Remote { status, .. } => *status,
            _ => None,
        };
        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                kind: self.kind(),
                message: self.to_string(),
                recoverable: self.is_recoverable(),
                status,
                violations: self.violations().to_vec(),
            },
        }
    }
}

/// JSON-serializable error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail for JSON responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable error code (e.g., "CONSTRAINT_ERROR")
    pub code: String,
    /// Taxonomy kind
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Whether a retry might succeed
    pub recoverable: bool,
    /// Remote status, when the remote side reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Field-level violations for validation errors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}
