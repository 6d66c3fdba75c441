//! Error types for relcat

use crate::DataType;
use thiserror::Error;

/// Core error type for relcat operations
///
/// Backend crates translate native driver failures into these variants so
/// callers can react to "table already exists" or "no such table" without
/// knowing which engine produced them.
#[derive(Error, Debug)]
pub enum RelcatError {
    #[error("Not a supported type: {0}")]
    UnsupportedType(DataType),

    #[error("{0}")]
    Validation(String),

    #[error("Table does not exist: {0}")]
    NoSuchTable(String),

    #[error("Database does not exist: {0}")]
    NoSuchSchema(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("{0}")]
    Execution(DatabaseError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RelcatError {
    /// Shorthand for building a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        RelcatError::Validation(message.into())
    }

    /// Native backend error code, if this error came from the database
    pub fn native_code(&self) -> Option<u16> {
        match self {
            RelcatError::Execution(err) => err.code,
            _ => None,
        }
    }
}

/// A failure reported by the database server itself.
///
/// The message is kept verbatim so callers can diagnose backend-specific
/// problems (e.g. `Unknown storage engine 'ABC'`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DatabaseError {
    /// Vendor error code (e.g. 1146 for MySQL `ER_NO_SUCH_TABLE`)
    pub code: Option<u16>,
    /// Five character SQLSTATE
    pub sql_state: Option<String>,
    /// Server message
    pub message: String,
}

impl DatabaseError {
    pub fn new(code: Option<u16>, sql_state: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            sql_state,
            message: message.into(),
        }
    }

    /// An error raised by the client library rather than the server
    pub fn client(message: impl Into<String>) -> Self {
        Self::new(None, None, message)
    }
}

/// Result type alias for relcat operations
pub type Result<T> = std::result::Result<T, RelcatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_message_names_type() {
        let err = RelcatError::UnsupportedType(DataType::list(DataType::Date, true));
        assert_eq!(err.to_string(), "Not a supported type: list<date>");
    }

    #[test]
    fn test_execution_preserves_native_message() {
        let err = RelcatError::Execution(DatabaseError::new(
            Some(1286),
            Some("42000".to_string()),
            "Unknown storage engine 'ABC'",
        ));
        assert!(err.to_string().contains("Unknown storage engine 'ABC'"));
        assert_eq!(err.native_code(), Some(1286));
    }

    #[test]
    fn test_native_code_absent_for_local_errors() {
        assert_eq!(RelcatError::validation("bad").native_code(), None);
        assert_eq!(RelcatError::NoSuchTable("db.t".into()).native_code(), None);
    }
}
