//! Neutral table model: columns, indexes and tables
//!
//! Values are immutable once built. Use `Column::to_builder()` or
//! `Table::to_builder()` to derive a modified copy.

use crate::{DataType, RelcatError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A column of a relational table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data_type: DataType,
    nullable: bool,
    comment: Option<String>,
    default_value: Option<String>,
    auto_increment: bool,
}

impl Column {
    pub fn builder(name: impl Into<String>) -> ColumnBuilder {
        ColumnBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Default value expression. Carried on the model only; backends neither
    /// render nor load it.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn auto_increment(&self) -> bool {
        self.auto_increment
    }

    /// Start a builder pre-filled with this column's attributes
    pub fn to_builder(&self) -> ColumnBuilder {
        ColumnBuilder {
            name: self.name.clone(),
            data_type: Some(self.data_type.clone()),
            nullable: self.nullable,
            comment: self.comment.clone(),
            default_value: self.default_value.clone(),
            auto_increment: self.auto_increment,
        }
    }
}

/// Builder for [`Column`]
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    name: String,
    data_type: Option<DataType>,
    nullable: bool,
    comment: Option<String>,
    default_value: Option<String>,
    auto_increment: bool,
}

impl ColumnBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            nullable: true,
            comment: None,
            default_value: None,
            auto_increment: false,
        }
    }

    /// Builder: rename
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: set data type
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Builder: set nullability
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Builder: set as not null
    pub fn not_null(self) -> Self {
        self.nullable(false)
    }

    /// Builder: set the comment
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Builder: set or clear the comment
    pub fn comment_opt(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Builder: set default value
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Builder: set auto increment
    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    pub fn build(self) -> Result<Column> {
        if self.name.is_empty() {
            return Err(RelcatError::validation("Column name must not be empty"));
        }
        let data_type = self.data_type.ok_or_else(|| {
            RelcatError::validation(format!("Column {} has no data type", self.name))
        })?;
        Ok(Column {
            name: self.name,
            data_type,
            nullable: self.nullable,
            comment: self.comment,
            default_value: self.default_value,
            auto_increment: self.auto_increment,
        })
    }
}

/// Kind of index a backend must enforce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    PrimaryKey,
    Unique,
}

/// A primary-key or unique constraint over one or more columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub index_type: IndexType,
    /// Required for unique indexes, ignored for primary keys
    pub name: Option<String>,
    /// Field paths in key order. Flat tables use single-segment paths.
    pub field_names: Vec<Vec<String>>,
}

impl Index {
    pub fn new(index_type: IndexType, name: Option<String>, field_names: Vec<Vec<String>>) -> Self {
        Self {
            index_type,
            name,
            field_names,
        }
    }

    /// Primary key over top-level columns
    pub fn primary_key<S: AsRef<str>>(columns: &[S]) -> Self {
        Self::new(IndexType::PrimaryKey, None, single_segment_paths(columns))
    }

    /// Named unique index over top-level columns
    pub fn unique<S: AsRef<str>>(name: impl Into<String>, columns: &[S]) -> Self {
        Self::new(
            IndexType::Unique,
            Some(name.into()),
            single_segment_paths(columns),
        )
    }

    /// Last segment of every field path, in key order.
    /// Empty paths are skipped.
    pub fn column_names(&self) -> Vec<&str> {
        self.field_names
            .iter()
            .filter_map(|path| path.last().map(String::as_str))
            .collect()
    }
}

fn single_segment_paths<S: AsRef<str>>(columns: &[S]) -> Vec<Vec<String>> {
    columns
        .iter()
        .map(|c| vec![c.as_ref().to_string()])
        .collect()
}

/// A relational table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    comment: Option<String>,
    columns: Vec<Column>,
    properties: IndexMap<String, String>,
    indexes: Vec<Index>,
}

impl Table {
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            name: name.into(),
            comment: None,
            columns: Vec::new(),
            properties: IndexMap::new(),
            indexes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Columns in physical order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn to_builder(&self) -> TableBuilder {
        TableBuilder {
            name: self.name.clone(),
            comment: self.comment.clone(),
            columns: self.columns.clone(),
            properties: self.properties.clone(),
            indexes: self.indexes.clone(),
        }
    }
}

/// Builder for [`Table`]
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    comment: Option<String>,
    columns: Vec<Column>,
    properties: IndexMap<String, String>,
    indexes: Vec<Index>,
}

impl TableBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn comment_opt(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn properties(mut self, properties: IndexMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn indexes(mut self, indexes: impl IntoIterator<Item = Index>) -> Self {
        self.indexes.extend(indexes);
        self
    }

    /// Fails on an empty table name or duplicate column names
    pub fn build(self) -> Result<Table> {
        if self.name.is_empty() {
            return Err(RelcatError::validation("Table name must not be empty"));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name() == column.name()) {
                return Err(RelcatError::validation(format!(
                    "Duplicate column name: {}",
                    column.name()
                )));
            }
        }
        Ok(Table {
            name: self.name,
            comment: self.comment,
            columns: self.columns,
            properties: self.properties,
            indexes: self.indexes,
        })
    }
}
