//! # EPR Core - Event Provenance Registry tool core
//!
//! Turns loosely-typed tool invocations into well-typed requests for the
//! Event Provenance Registry, and maps what comes back into typed domain
//! objects:
//!
//! - **Sanitizer**: trims every string in an arbitrarily nested input
//! - **Schema Registry**: one fixed schema per operation
//! - **Validator**: applies a schema and reports every violated field at once
//! - **Query Builder**: validated input becomes an inert [`Query`]
//! - **Response Mapper**: raw results become [`Event`], [`EventReceiver`] or
//!   [`EventReceiverGroup`] values, or a [`CoreError`]
//!
//! ## Flow
//!
//! ```text
//!  caller input ──► sanitize ──► validate ──► Query::build
//!                                 (schema)         │
//!                                                  ▼
//!   Mapped / CoreError ◄── map_response ◄── ApiClient::send
//! ```
//!
//! The core holds no mutable state and never performs I/O itself; the
//! single suspension point is [`ApiClient::send`].
//!
//! ## Example
//!
//! ```rust
//! use epr_core::{prepare, OperationKind, ResourceKind};
//! use serde_json::json;
//!
//! let query = prepare(
//!     "search_receivers",
//!     json!({"data": {"name": "  builds ", "version": ""}}),
//! )
//! .unwrap();
//!
//! assert_eq!(query.action(), OperationKind::Search);
//! assert_eq!(query.resource(), ResourceKind::EventReceiver);
//! assert_eq!(query.arguments().len(), 1);
//! assert_eq!(query.arguments()["name"], "builds");
//! ```

pub mod client;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod resource;
pub mod response;
pub mod sanitize;
pub mod schema;
pub mod validate;

// Re-export main types
pub use client::{ApiClient, CallContext, RawResult, TransportFailure};
pub use error::{
    CoreError, ErrorCategory, ErrorDetail, ErrorKind, ErrorResponse, Result, ValidationError,
    Violation,
};
pub use model::{DomainObject, Event, EventReceiver, EventReceiverGroup, Resource};
pub use pipeline::{invoke, prepare};
pub use query::Query;
pub use resource::{is_identifier, ResourceKind, IDENTIFIER_LEN};
pub use response::{map_response, Mapped};
pub use sanitize::sanitize;
pub use schema::{
    Constraint, Envelope, FieldSpec, FieldType, Operation, OperationKind, Pattern, Schema,
};
pub use validate::{validate, ValidatedRecord};
