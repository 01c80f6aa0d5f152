//! Connection trait

use crate::{QueryResult, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Handle for cancelling a running query from any thread.
///
/// Safe to call from any thread and idempotent; if no query is
/// running, cancelling is a no-op.
pub trait QueryCancelHandle: Send + Sync {
    /// Cancel the currently running query on the associated connection.
    fn cancel(&self);
}

/// A database connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute a query that returns rows (SELECT, PRAGMA)
    async fn query(&self, sql: &str) -> Result<QueryResult>;

    /// Execute a statement that modifies data; returns affected rows
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Get a handle that can be used to cancel running queries.
    ///
    /// Returns `None` if the driver does not support cancellation.
    fn cancel_handle(&self) -> Option<Arc<dyn QueryCancelHandle>> {
        None
    }
}
