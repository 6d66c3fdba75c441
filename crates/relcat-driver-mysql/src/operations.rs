//! `TableOperations` for MySQL

use async_trait::async_trait;
use relcat_core::{ConnectionProvider, Result, Table, TableChange, TableOperations};
use std::sync::Arc;

use crate::alter::AlterTableBuilder;
use crate::ddl::{build_create_table, build_drop_table, build_rename_table};
use crate::error_converter::{ER_TABLE_EXISTS, convert_error};
use crate::schema;

/// Table operations over connections from a [`ConnectionProvider`].
///
/// Each call borrows one connection for its whole duration and hands it
/// back when the call returns, whether it succeeded or not.
#[derive(Clone)]
pub struct MySqlTableOperations {
    provider: Arc<dyn ConnectionProvider>,
}

impl MySqlTableOperations {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TableOperations for MySqlTableOperations {
    #[tracing::instrument(skip(self, table), fields(table = %table.name()))]
    async fn create(&self, database: &str, table: &Table) -> Result<Table> {
        let sql = build_create_table(database, table)?;
        let conn = self.provider.acquire().await?;

        tracing::debug!(driver = conn.driver_name(), sql = %sql, "creating table");
        conn.execute(&sql, &[])
            .await
            .map_err(|e| convert_error(e, database, Some(table.name())))?;

        let created = schema::load_table(conn.as_ref(), database, table.name()).await?;
        tracing::info!("table created");
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    async fn load(&self, database: &str, table_name: &str) -> Result<Table> {
        let conn = self.provider.acquire().await?;
        schema::load_table(conn.as_ref(), database, table_name).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        let conn = self.provider.acquire().await?;
        schema::list_tables(conn.as_ref(), database).await
    }

    #[tracing::instrument(skip(self))]
    async fn rename(&self, database: &str, old_name: &str, new_name: &str) -> Result<()> {
        let sql = build_rename_table(database, old_name, new_name);
        let conn = self.provider.acquire().await?;

        tracing::debug!(driver = conn.driver_name(), sql = %sql, "renaming table");
        conn.execute(&sql, &[]).await.map_err(|e| {
            // the clash is with the target name, anything else with the source
            if e.native_code() == Some(ER_TABLE_EXISTS) {
                convert_error(e, database, Some(new_name))
            } else {
                convert_error(e, database, Some(old_name))
            }
        })?;

        tracing::info!("table renamed");
        Ok(())
    }

    #[tracing::instrument(skip(self, changes), fields(changes = changes.len()))]
    async fn alter_table(
        &self,
        database: &str,
        table_name: &str,
        changes: &[TableChange],
    ) -> Result<Table> {
        let conn = self.provider.acquire().await?;
        let snapshot = schema::load_table(conn.as_ref(), database, table_name).await?;

        match AlterTableBuilder::new(database, &snapshot).build(changes)? {
            Some(sql) => {
                tracing::debug!(driver = conn.driver_name(), sql = %sql, "altering table");
                conn.execute(&sql, &[])
                    .await
                    .map_err(|e| convert_error(e, database, Some(table_name)))?;
            }
            None => {
                tracing::debug!("nothing to alter");
                return Ok(snapshot);
            }
        }

        let altered = schema::load_table(conn.as_ref(), database, table_name).await?;
        tracing::info!("table altered");
        Ok(altered)
    }

    #[tracing::instrument(skip(self))]
    async fn drop(&self, database: &str, table_name: &str) -> Result<()> {
        let sql = build_drop_table(database, table_name);
        let conn = self.provider.acquire().await?;

        tracing::debug!(driver = conn.driver_name(), sql = %sql, "dropping table");
        conn.execute(&sql, &[])
            .await
            .map_err(|e| convert_error(e, database, Some(table_name)))?;

        tracing::info!("table dropped");
        Ok(())
    }
}
