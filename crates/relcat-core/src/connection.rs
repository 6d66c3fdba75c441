//! Connection and provider traits

use crate::{QueryResult, Result, StatementResult, Value};
use async_trait::async_trait;

/// A database connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "mysql")
    fn driver_name(&self) -> &str;

    /// Execute a statement that returns no rows (DDL, DML)
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows. Parameters bind to positional `?`
    /// placeholders.
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;
}

/// Source of connections for table operations.
///
/// A connection handed out by `acquire` goes back to its source when the
/// returned box is dropped, on every exit path.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn Connection>>;
}
