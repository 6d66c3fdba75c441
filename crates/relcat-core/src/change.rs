//! Structural change requests applied by `TableOperations::alter_table`

use crate::{DataType, RelcatError, Result};
use serde::{Deserialize, Serialize};

/// Where a column lands when added or moved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnPosition {
    First,
    After(String),
    /// Backend default placement: the end of the table
    Default,
}

/// One structural change to an existing table.
///
/// Columns are addressed by field path; top-level columns use a path with a
/// single segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableChange {
    AddColumn {
        field_name: Vec<String>,
        data_type: DataType,
        comment: Option<String>,
        position: ColumnPosition,
        nullable: bool,
        auto_increment: bool,
    },
    DeleteColumn {
        field_name: Vec<String>,
        if_exists: bool,
    },
    RenameColumn {
        field_name: Vec<String>,
        new_name: String,
    },
    UpdateColumnType {
        field_name: Vec<String>,
        new_type: DataType,
    },
    UpdateColumnComment {
        field_name: Vec<String>,
        new_comment: String,
    },
    UpdateColumnPosition {
        field_name: Vec<String>,
        position: ColumnPosition,
    },
    UpdateColumnNullability {
        field_name: Vec<String>,
        nullable: bool,
    },
    UpdateComment {
        new_comment: String,
    },
    SetProperty {
        key: String,
        value: String,
    },
}

impl TableChange {
    /// Nullable column without comment, appended at the end
    pub fn add_column(name: impl Into<String>, data_type: DataType) -> Self {
        Self::add_column_with(name, data_type, None, ColumnPosition::Default, true, false)
    }

    pub fn add_column_with(
        name: impl Into<String>,
        data_type: DataType,
        comment: Option<String>,
        position: ColumnPosition,
        nullable: bool,
        auto_increment: bool,
    ) -> Self {
        TableChange::AddColumn {
            field_name: vec![name.into()],
            data_type,
            comment,
            position,
            nullable,
            auto_increment,
        }
    }

    pub fn delete_column(name: impl Into<String>, if_exists: bool) -> Self {
        TableChange::DeleteColumn {
            field_name: vec![name.into()],
            if_exists,
        }
    }

    pub fn rename_column(name: impl Into<String>, new_name: impl Into<String>) -> Self {
        TableChange::RenameColumn {
            field_name: vec![name.into()],
            new_name: new_name.into(),
        }
    }

    pub fn update_column_type(name: impl Into<String>, new_type: DataType) -> Self {
        TableChange::UpdateColumnType {
            field_name: vec![name.into()],
            new_type,
        }
    }

    pub fn update_column_comment(name: impl Into<String>, new_comment: impl Into<String>) -> Self {
        TableChange::UpdateColumnComment {
            field_name: vec![name.into()],
            new_comment: new_comment.into(),
        }
    }

    pub fn update_column_position(name: impl Into<String>, position: ColumnPosition) -> Self {
        TableChange::UpdateColumnPosition {
            field_name: vec![name.into()],
            position,
        }
    }

    pub fn update_column_nullability(name: impl Into<String>, nullable: bool) -> Self {
        TableChange::UpdateColumnNullability {
            field_name: vec![name.into()],
            nullable,
        }
    }

    pub fn update_comment(new_comment: impl Into<String>) -> Self {
        TableChange::UpdateComment {
            new_comment: new_comment.into(),
        }
    }

    pub fn set_property(key: impl Into<String>, value: impl Into<String>) -> Self {
        TableChange::SetProperty {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Field path the change targets, `None` for table-level changes
    pub fn field_name(&self) -> Option<&[String]> {
        match self {
            TableChange::AddColumn { field_name, .. }
            | TableChange::DeleteColumn { field_name, .. }
            | TableChange::RenameColumn { field_name, .. }
            | TableChange::UpdateColumnType { field_name, .. }
            | TableChange::UpdateColumnComment { field_name, .. }
            | TableChange::UpdateColumnPosition { field_name, .. }
            | TableChange::UpdateColumnNullability { field_name, .. } => Some(field_name),
            TableChange::UpdateComment { .. } | TableChange::SetProperty { .. } => None,
        }
    }
}

/// Resolve a field path to a top-level column name.
///
/// Flat relational tables have no nested columns, so only single-segment
/// paths are accepted.
pub fn top_level_column(field_name: &[String]) -> Result<&str> {
    match field_name {
        [name] if !name.is_empty() => Ok(name),
        [] | [_] => Err(RelcatError::validation("Field name must not be empty")),
        _ => Err(RelcatError::validation(format!(
            "Nested columns are not supported: {}",
            field_name.join(".")
        ))),
    }
}
