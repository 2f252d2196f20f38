//! End-to-end invocation
//!
//! `operation name + raw input` → validate → build → send → map.

use serde_json::Value;

use crate::client::{ApiClient, CallContext};
use crate::error::Result;
use crate::query::Query;
use crate::response::{map_response, Mapped};
use crate::schema::Operation;
use crate::validate::validate;

/// Resolve, sanitize and validate an invocation, and build its query
///
/// Performs no I/O. Every validation problem is reported at once.
pub fn prepare(operation_name: &str, raw: Value) -> Result<Query> {
    let operation: Operation = operation_name.parse()?;
    let record = validate(operation, raw)?;
    Ok(Query::build(record))
}

/// Run one invocation against `client`
///
/// The only suspension point is the client's `send`. Nothing is retried;
/// `ctx` is passed to the client unchanged.
pub async fn invoke<C>(client: &C, operation_name: &str, raw: Value, ctx: &CallContext) -> Result<Mapped>
where
    C: ApiClient + ?Sized,
{
    let query = prepare(operation_name, raw).map_err(|err| {
        tracing::debug!(
            operation = operation_name,
            code = err.error_code(),
            "Invocation rejected before dispatch"
        );
        err
    })?;

    tracing::debug!(
        operation = %query.operation(),
        client = client.name(),
        request_id = ctx.request_id.as_deref().unwrap_or("-"),
        "Dispatching query"
    );
    let raw = client.send(&query, ctx).await;
    let mapped = map_response(&query, raw)?;

    tracing::info!(
        operation = %query.operation(),
        results = mapped.len(),
        "Invocation completed"
    );
    Ok(mapped)
}
