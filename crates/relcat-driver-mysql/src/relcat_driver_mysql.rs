//! MySQL/MariaDB table operations
//!
//! Turns the neutral table model into MySQL DDL, reads it back from
//! `information_schema`, and exposes both through [`MySqlTableOperations`].

mod alter;
mod connection;
mod ddl;
mod driver;
mod error_converter;
mod index;
mod operations;
mod schema;
mod type_converter;

#[cfg(test)]
mod alter_tests;
#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod operations_tests;
#[cfg(test)]
mod schema_tests;
#[cfg(test)]
mod test_support;

pub use alter::AlterTableBuilder;
pub use connection::{MySqlConnection, MySqlPool};
pub use ddl::{
    AUTO_INCREMENT_OFFSET_KEY, ENGINE_KEY, build_create_table, build_drop_table,
    build_rename_table, column_definition, qualified_name, quote_ident, quote_literal,
    table_option, table_options,
};
pub use driver::MySqlDriver;
pub use error_converter::{ER_BAD_DB, ER_BAD_TABLE, ER_NO_SUCH_TABLE, ER_TABLE_EXISTS, convert_error};
pub use index::{
    append_indexes_sql, render_constraints, validate_auto_increment, validate_indexes,
};
pub use operations::MySqlTableOperations;
pub use schema::{list_tables, load_table};
pub use type_converter::{
    MySqlTypeDescriptor, from_mysql_type, to_existing_mysql_type, to_mysql_type,
};
