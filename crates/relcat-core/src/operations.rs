//! Public table operations surface

use crate::{Result, Table, TableChange};
use async_trait::async_trait;

/// Create, inspect, alter and drop tables of one backend.
///
/// Every call names its database explicitly. Implementations validate
/// locally before sending anything to the server, so a rejected request
/// leaves the catalog untouched.
#[async_trait]
pub trait TableOperations: Send + Sync {
    /// Create `table` in `database` and return it as the backend stores it
    async fn create(&self, database: &str, table: &Table) -> Result<Table>;

    /// Load the current definition of a table
    async fn load(&self, database: &str, table_name: &str) -> Result<Table>;

    /// Names of the base tables in `database`
    async fn list_tables(&self, database: &str) -> Result<Vec<String>>;

    async fn rename(&self, database: &str, old_name: &str, new_name: &str) -> Result<()>;

    /// Apply `changes` in a single statement and return the altered table
    async fn alter_table(
        &self,
        database: &str,
        table_name: &str,
        changes: &[TableChange],
    ) -> Result<Table>;

    async fn drop(&self, database: &str, table_name: &str) -> Result<()>;
}
