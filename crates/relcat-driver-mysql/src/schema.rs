//! MySQL catalog introspection
//!
//! Rebuilds a neutral [`Table`] from `information_schema`. Every lookup is
//! parameterised and scoped to an explicit database.

use indexmap::IndexMap;
use relcat_core::{Column, Connection, Index, RelcatError, Result, Row, Table, Value};

use crate::ddl::{AUTO_INCREMENT_OFFSET_KEY, ENGINE_KEY};
use crate::type_converter::{MySqlTypeDescriptor, from_mysql_type};

const DEFAULT_ENGINE: &str = "InnoDB";

const TABLE_QUERY: &str = "SELECT TABLE_COMMENT AS table_comment, \
        ENGINE AS engine, \
        AUTO_INCREMENT AS auto_increment \
     FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND TABLE_TYPE = 'BASE TABLE'";

const COLUMNS_QUERY: &str = "SELECT COLUMN_NAME AS column_name, \
        DATA_TYPE AS data_type, \
        COLUMN_TYPE AS column_type, \
        CHARACTER_MAXIMUM_LENGTH AS character_maximum_length, \
        NUMERIC_PRECISION AS numeric_precision, \
        NUMERIC_SCALE AS numeric_scale, \
        IS_NULLABLE AS is_nullable, \
        COLUMN_COMMENT AS column_comment, \
        EXTRA AS extra \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
     ORDER BY ORDINAL_POSITION";

const INDEXES_QUERY: &str = "SELECT INDEX_NAME AS index_name, \
        COLUMN_NAME AS column_name \
     FROM information_schema.STATISTICS \
     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND NON_UNIQUE = 0 \
     ORDER BY INDEX_NAME, SEQ_IN_INDEX";

const SCHEMA_QUERY: &str = "SELECT SCHEMA_NAME AS schema_name \
     FROM information_schema.SCHEMATA \
     WHERE SCHEMA_NAME = ?";

const LIST_TABLES_QUERY: &str = "SELECT TABLE_NAME AS table_name \
     FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' \
     ORDER BY TABLE_NAME";

const DEFAULT_ENGINE_QUERY: &str = "SELECT @@default_storage_engine AS engine";

fn params(database: &str, table_name: &str) -> [Value; 2] {
    [Value::from(database), Value::from(table_name)]
}

fn non_empty(row: &Row, name: &str) -> Option<String> {
    row.get_str(name)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Load the full definition of `database`.`table_name`
#[tracing::instrument(skip(conn))]
pub async fn load_table(conn: &dyn Connection, database: &str, table_name: &str) -> Result<Table> {
    let result = conn
        .query(TABLE_QUERY, &params(database, table_name))
        .await?;
    let Some(table_row) = result.rows.first() else {
        return Err(RelcatError::NoSuchTable(format!(
            "{}.{}",
            database, table_name
        )));
    };

    let columns = load_columns(conn, database, table_name).await?;
    let indexes = load_indexes(conn, database, table_name).await?;

    let mut properties = IndexMap::new();
    let engine = match non_empty(table_row, "engine") {
        Some(engine) => engine,
        None => default_engine(conn).await,
    };
    properties.insert(ENGINE_KEY.to_string(), engine);
    if let Some(offset) = table_row.get_by_name("auto_increment").and_then(|v| v.as_u64()) {
        properties.insert(AUTO_INCREMENT_OFFSET_KEY.to_string(), offset.to_string());
    }

    let table = Table::builder(table_name)
        .comment_opt(non_empty(table_row, "table_comment"))
        .columns(columns)
        .indexes(indexes)
        .properties(properties)
        .build()?;

    tracing::debug!(
        columns = table.columns().len(),
        indexes = table.indexes().len(),
        "table loaded"
    );
    Ok(table)
}

async fn load_columns(
    conn: &dyn Connection,
    database: &str,
    table_name: &str,
) -> Result<Vec<Column>> {
    let result = conn
        .query(COLUMNS_QUERY, &params(database, table_name))
        .await?;

    result
        .rows
        .iter()
        .map(|row| {
            let name = row.get_str("column_name").unwrap_or("").to_string();
            let descriptor = MySqlTypeDescriptor {
                data_type: row.get_str("data_type").unwrap_or("").to_string(),
                column_type: row.get_str("column_type").unwrap_or("").to_string(),
                character_maximum_length: row
                    .get_by_name("character_maximum_length")
                    .and_then(|v| v.as_u64()),
                numeric_precision: row
                    .get_by_name("numeric_precision")
                    .and_then(|v| v.as_u64()),
                numeric_scale: row.get_by_name("numeric_scale").and_then(|v| v.as_u64()),
            };
            let nullable = row.get_str("is_nullable").unwrap_or("NO") == "YES";
            let extra = row.get_str("extra").unwrap_or("").to_ascii_lowercase();

            Column::builder(name)
                .data_type(from_mysql_type(&descriptor))
                .nullable(nullable)
                .comment_opt(non_empty(row, "column_comment"))
                .auto_increment(extra.contains("auto_increment"))
                .build()
        })
        .collect()
}

/// Primary key first, then unique indexes in name order
async fn load_indexes(
    conn: &dyn Connection,
    database: &str,
    table_name: &str,
) -> Result<Vec<Index>> {
    let result = conn
        .query(INDEXES_QUERY, &params(database, table_name))
        .await?;

    let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
    for row in &result.rows {
        let (Some(index_name), Some(column_name)) =
            (row.get_str("index_name"), row.get_str("column_name"))
        else {
            continue;
        };
        grouped
            .entry(index_name.to_string())
            .or_default()
            .push(column_name.to_string());
    }

    let mut indexes = Vec::with_capacity(grouped.len());
    if let Some(columns) = grouped.shift_remove("PRIMARY") {
        indexes.push(Index::primary_key(&columns));
    }
    indexes.extend(
        grouped
            .into_iter()
            .map(|(name, columns)| Index::unique(name, &columns)),
    );
    Ok(indexes)
}

async fn default_engine(conn: &dyn Connection) -> String {
    match conn.query(DEFAULT_ENGINE_QUERY, &[]).await {
        Ok(result) => result
            .rows
            .first()
            .and_then(|row| non_empty(row, "engine"))
            .unwrap_or_else(|| DEFAULT_ENGINE.to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "could not read default storage engine, assuming {}", DEFAULT_ENGINE);
            DEFAULT_ENGINE.to_string()
        }
    }
}

/// Names of the base tables in `database`
#[tracing::instrument(skip(conn))]
pub async fn list_tables(conn: &dyn Connection, database: &str) -> Result<Vec<String>> {
    let schemas = conn.query(SCHEMA_QUERY, &[Value::from(database)]).await?;
    if !schemas.has_rows() {
        return Err(RelcatError::NoSuchSchema(database.to_string()));
    }

    let result = conn
        .query(LIST_TABLES_QUERY, &[Value::from(database)])
        .await?;
    Ok(result
        .rows
        .iter()
        .filter_map(|row| row.get_str("table_name").map(|s| s.to_string()))
        .collect())
}
