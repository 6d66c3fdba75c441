//! Index constraints and auto-increment legality

use crate::ddl::quote_ident;
use relcat_core::{Column, Index, IndexType, RelcatError, Result};

/// Render one `CONSTRAINT` clause per index, joined with `",\n"`, in input
/// order.
pub fn render_constraints(indexes: &[Index]) -> Result<String> {
    let clauses = indexes
        .iter()
        .map(render_constraint)
        .collect::<Result<Vec<_>>>()?;
    Ok(clauses.join(",\n"))
}

/// Append every index as a `",\n"`-prefixed clause, the form used at the
/// tail of a `CREATE TABLE` column list.
pub fn append_indexes_sql(indexes: &[Index], sql: &mut String) -> Result<()> {
    for index in indexes {
        sql.push_str(",\n");
        sql.push_str(&render_constraint(index)?);
    }
    Ok(())
}

fn render_constraint(index: &Index) -> Result<String> {
    let columns = index
        .column_names()
        .into_iter()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ");
    match index.index_type {
        IndexType::PrimaryKey => Ok(format!("CONSTRAINT PRIMARY KEY ({})", columns)),
        IndexType::Unique => {
            let name = unique_name(index)?;
            Ok(format!(
                "CONSTRAINT {} UNIQUE ({})",
                quote_ident(name),
                columns
            ))
        }
    }
}

fn unique_name(index: &Index) -> Result<&str> {
    match index.name.as_deref() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(RelcatError::validation("Unique index must have a name")),
    }
}

/// Check index invariants against the table's columns
pub fn validate_indexes(columns: &[Column], indexes: &[Index]) -> Result<()> {
    let primary_keys = indexes
        .iter()
        .filter(|i| i.index_type == IndexType::PrimaryKey)
        .count();
    if primary_keys > 1 {
        return Err(RelcatError::validation(
            "A table can only have one primary key",
        ));
    }

    for index in indexes {
        if index.index_type == IndexType::Unique {
            unique_name(index)?;
        }
        if index.field_names.is_empty() {
            return Err(RelcatError::validation(format!(
                "Index {} must reference at least one column",
                index.name.as_deref().unwrap_or("PRIMARY")
            )));
        }
        if index.field_names.iter().any(|path| path.is_empty()) {
            return Err(RelcatError::validation(
                "Index field name must not be empty",
            ));
        }
        for name in index.column_names() {
            if !columns.iter().any(|c| c.name() == name) {
                return Err(RelcatError::validation(format!(
                    "Index column does not exist: {}",
                    name
                )));
            }
        }
    }
    Ok(())
}

/// MySQL allows at most one auto-increment column, and it must be part of a
/// key.
pub fn validate_auto_increment(columns: &[Column], indexes: &[Index]) -> Result<()> {
    let auto_columns: Vec<&str> = columns
        .iter()
        .filter(|c| c.auto_increment())
        .map(|c| c.name())
        .collect();

    match auto_columns.as_slice() {
        [] => Ok(()),
        [name] => {
            let is_key = indexes
                .iter()
                .any(|index| index.column_names().contains(name));
            if is_key {
                Ok(())
            } else {
                Err(RelcatError::validation(
                    "Incorrect table definition; there can be only one auto column and it must be defined as a key",
                ))
            }
        }
        many => Err(RelcatError::validation(format!(
            "Only one column can be auto-incremented. There are multiple auto-increment columns in your table: [{}]",
            many.join(",")
        ))),
    }
}
