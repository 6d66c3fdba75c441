//! Classification of native MySQL failures

use relcat_core::RelcatError;

/// `ER_TABLE_EXISTS_ERROR`
pub const ER_TABLE_EXISTS: u16 = 1050;
/// `ER_BAD_TABLE_ERROR`, raised by DROP TABLE
pub const ER_BAD_TABLE: u16 = 1051;
/// `ER_NO_SUCH_TABLE`
pub const ER_NO_SUCH_TABLE: u16 = 1146;
/// `ER_BAD_DB_ERROR`
pub const ER_BAD_DB: u16 = 1049;

/// Translate an execution failure into the engine-independent error kinds.
///
/// Only `RelcatError::Execution` values are inspected; codes without a
/// dedicated kind, and every other error, pass through untouched so the
/// native message stays visible.
pub fn convert_error(error: RelcatError, database: &str, table: Option<&str>) -> RelcatError {
    let Some(code) = error.native_code() else {
        return error;
    };
    let qualified = || match table {
        Some(table) => format!("{}.{}", database, table),
        None => database.to_string(),
    };
    match code {
        ER_TABLE_EXISTS => RelcatError::TableAlreadyExists(qualified()),
        ER_BAD_TABLE | ER_NO_SUCH_TABLE => RelcatError::NoSuchTable(qualified()),
        ER_BAD_DB => RelcatError::NoSuchSchema(database.to_string()),
        _ => error,
    }
}
