//! EPR Client - carries core queries to the Event Provenance Registry
//!
//! The client side of the [`epr_core::ApiClient`] seam:
//! - Renders each [`epr_core::Query`] into a GraphQL document plus variables
//! - Posts it to the registry's GraphQL endpoint through a transport backend
//! - Enforces the per-call deadline
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 EPR CLIENT                    │
//! │                                               │
//! │   Query ──► GraphQlRequest ──► GraphQlClient  │
//! │                                     │         │
//! │                          ┌──────────▼───────┐ │
//! │                          │ TransportBackend │ │
//! │                          │  (StaticBackend) │ │
//! │                          └──────────────────┘ │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Network backends live outside this crate; [`StaticBackend`] answers
//! from canned responses for tests and embedding.
//!
//! ## Usage
//!
//! ```rust
//! use epr_client::{ClientConfig, GraphQlClient, StaticBackend};
//! use epr_core::{invoke, CallContext};
//! use serde_json::json;
//!
//! tokio_test::block_on(async {
//!     let backend = StaticBackend::always(json!({"data": {"event_receivers": []}}));
//!     let client = GraphQlClient::new(ClientConfig::default(), backend);
//!
//!     let found = invoke(&client, "search_receivers", json!({"data": {}}), &CallContext::new())
//!         .await
//!         .unwrap();
//!     assert!(found.is_empty());
//! });
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod graphql;
pub mod transport;

pub use client::GraphQlClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ClientError, ClientResult};
pub use graphql::GraphQlRequest;
pub use transport::{RecordedRequest, StaticBackend, TransportBackend};
