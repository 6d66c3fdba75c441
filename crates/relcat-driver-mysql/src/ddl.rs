//! DDL generation for MySQL tables
//!
//! Generates CREATE TABLE, DROP TABLE and RENAME TABLE statements from the
//! neutral table model. Everything here is a pure function of its input;
//! validation failures surface before any SQL exists.

use crate::index::{append_indexes_sql, validate_auto_increment, validate_indexes};
use crate::type_converter::to_mysql_type;
use indexmap::IndexMap;
use relcat_core::{Column, RelcatError, Result, Table};

/// Table property selecting the storage engine (`ENGINE=`)
pub const ENGINE_KEY: &str = "engine";
/// Table property setting the next auto-increment value (`AUTO_INCREMENT=`)
pub const AUTO_INCREMENT_OFFSET_KEY: &str = "auto-increment-offset";

/// Backtick-quote an identifier, doubling embedded backticks
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Single-quote a string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// `` `database`.`table` ``
pub fn qualified_name(database: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(database), quote_ident(table))
}

/// Column definition as used in CREATE TABLE and ALTER TABLE clauses
pub fn column_definition(column: &Column) -> Result<String> {
    let type_sql = to_mysql_type(column.data_type())?;
    Ok(column_definition_with_type(column, &type_sql))
}

/// Column definition with an already rendered type
pub(crate) fn column_definition_with_type(column: &Column, type_sql: &str) -> String {
    let mut def = format!("{} {}", quote_ident(column.name()), type_sql);

    def.push_str(if column.nullable() { " NULL" } else { " NOT NULL" });

    if column.auto_increment() {
        def.push_str(" AUTO_INCREMENT");
    }

    if let Some(comment) = column.comment() {
        def.push_str(&format!(" COMMENT {}", quote_literal(comment)));
    }

    def
}

/// Render one table option from a property.
///
/// Only syntax is checked here. Whether the engine exists is up to the
/// server.
pub fn table_option(key: &str, value: &str) -> Result<String> {
    match key {
        ENGINE_KEY => {
            let valid = !value.is_empty()
                && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(RelcatError::validation(format!(
                    "Invalid value for table property {}: {}",
                    key, value
                )));
            }
            Ok(format!("ENGINE={}", value))
        }
        AUTO_INCREMENT_OFFSET_KEY => {
            let offset = value.trim().parse::<u64>().map_err(|_| {
                RelcatError::validation(format!(
                    "Invalid value for table property {}: {}",
                    key, value
                ))
            })?;
            Ok(format!("AUTO_INCREMENT={}", offset))
        }
        other => Err(RelcatError::validation(format!(
            "Unsupported table property: {}",
            other
        ))),
    }
}

pub fn table_options(properties: &IndexMap<String, String>) -> Result<Vec<String>> {
    properties
        .iter()
        .map(|(key, value)| table_option(key, value))
        .collect()
}

/// Generate the CREATE TABLE statement, validating types, indexes,
/// auto-increment legality and properties first.
pub fn build_create_table(database: &str, table: &Table) -> Result<String> {
    if table.columns().is_empty() {
        return Err(RelcatError::validation(format!(
            "Table {} must have at least one column",
            table.name()
        )));
    }

    let column_defs = table
        .columns()
        .iter()
        .map(|c| column_definition(c).map(|def| format!("  {}", def)))
        .collect::<Result<Vec<_>>>()?;

    validate_indexes(table.columns(), table.indexes())?;
    validate_auto_increment(table.columns(), table.indexes())?;
    let options = table_options(table.properties())?;

    let mut sql = format!(
        "CREATE TABLE {} (\n",
        qualified_name(database, table.name())
    );
    sql.push_str(&column_defs.join(",\n"));
    append_indexes_sql(table.indexes(), &mut sql)?;
    sql.push_str("\n)");

    if let Some(comment) = table.comment() {
        sql.push_str(&format!(" COMMENT={}", quote_literal(comment)));
    }
    for option in options {
        sql.push(' ');
        sql.push_str(&option);
    }

    Ok(sql)
}

pub fn build_drop_table(database: &str, table_name: &str) -> String {
    format!("DROP TABLE {}", qualified_name(database, table_name))
}

pub fn build_rename_table(database: &str, old_name: &str, new_name: &str) -> String {
    format!(
        "RENAME TABLE {} TO {}",
        qualified_name(database, old_name),
        qualified_name(database, new_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use relcat_core::{DataType, Index};

    fn column(name: &str, data_type: DataType) -> relcat_core::ColumnBuilder {
        Column::builder(name).data_type(data_type)
    }

    #[test]
    fn test_quote_ident_doubles_backticks() {
        assert_eq!(quote_ident("users"), "`users`");
        assert_eq!(quote_ident("select"), "`select`");
        assert_eq!(quote_ident("a`b"), "`a``b`");
    }

    #[test]
    fn test_quote_literal_escapes() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal(r"a\b"), r"'a\\b'");
    }

    #[test]
    fn test_generate_create_table() {
        let table = Table::builder("op_table")
            .comment("test_comment")
            .column(
                column("col_1", DataType::varchar(255))
                    .comment("test_comment")
                    .build()
                    .unwrap(),
            )
            .column(
                column("col_2", DataType::Integer)
                    .not_null()
                    .auto_increment(true)
                    .build()
                    .unwrap(),
            )
            .index(Index::primary_key(&["col_2"]))
            .index(Index::unique("uk_1", &["col_1"]))
            .property(ENGINE_KEY, "InnoDB")
            .property(AUTO_INCREMENT_OFFSET_KEY, "10")
            .build()
            .unwrap();

        let sql = build_create_table("db", &table).unwrap();
        assert_eq!(
            sql,
            indoc! {"
                CREATE TABLE `db`.`op_table` (
                  `col_1` varchar(255) NULL COMMENT 'test_comment',
                  `col_2` int NOT NULL AUTO_INCREMENT,
                CONSTRAINT PRIMARY KEY (`col_2`),
                CONSTRAINT `uk_1` UNIQUE (`col_1`)
                ) COMMENT='test_comment' ENGINE=InnoDB AUTO_INCREMENT=10"}
        );
    }

    #[test]
    fn test_generate_create_table_minimal() {
        let table = Table::builder("t")
            .column(column("c", DataType::decimal(10, 2)).build().unwrap())
            .build()
            .unwrap();
        assert_eq!(
            build_create_table("db", &table).unwrap(),
            "CREATE TABLE `db`.`t` (\n  `c` decimal(10,2) NULL\n)"
        );
    }

    #[test]
    fn test_create_rejects_unsupported_type() {
        let table = Table::builder("t")
            .column(column("col_1", DataType::Boolean).build().unwrap())
            .build()
            .unwrap();
        let err = build_create_table("db", &table).unwrap_err();
        assert_eq!(err.to_string(), "Not a supported type: boolean");
    }

    #[test]
    fn test_create_rejects_auto_increment_without_key() {
        let table = Table::builder("t")
            .column(
                column("id", DataType::Long)
                    .auto_increment(true)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert!(build_create_table("db", &table).is_err());
    }

    #[test]
    fn test_create_rejects_empty_table() {
        let table = Table::builder("t").build().unwrap();
        assert!(build_create_table("db", &table).is_err());
    }

    #[test]
    fn test_table_options() {
        assert_eq!(table_option(ENGINE_KEY, "MyISAM").unwrap(), "ENGINE=MyISAM");
        assert_eq!(
            table_option(AUTO_INCREMENT_OFFSET_KEY, "10").unwrap(),
            "AUTO_INCREMENT=10"
        );
        // unknown engines are left for the server to reject
        assert_eq!(table_option(ENGINE_KEY, "ABC").unwrap(), "ENGINE=ABC");

        assert!(table_option(ENGINE_KEY, "InnoDB; DROP TABLE x").is_err());
        assert!(table_option(AUTO_INCREMENT_OFFSET_KEY, "-1").is_err());
        let err = table_option("charset", "utf8").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported table property: charset");
    }

    #[test]
    fn test_generate_drop_and_rename() {
        assert_eq!(build_drop_table("db", "users"), "DROP TABLE `db`.`users`");
        assert_eq!(
            build_rename_table("db", "old", "new"),
            "RENAME TABLE `db`.`old` TO `db`.`new`"
        );
    }
}
