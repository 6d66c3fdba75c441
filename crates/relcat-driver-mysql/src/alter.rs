//! Compiles a list of `TableChange`s into a single MySQL `ALTER TABLE`
//!
//! Every change is resolved against the snapshot the table had before the
//! alteration. All changes aimed at one existing column are folded into a
//! working copy of that column and emitted as one `MODIFY COLUMN` (or
//! `CHANGE COLUMN` when renamed) carrying the full definition, since MySQL
//! re-specifies the whole column on modification.

use crate::ddl::{
    column_definition, column_definition_with_type, qualified_name, quote_ident, quote_literal,
    table_option,
};
use crate::index::validate_auto_increment;
use crate::type_converter::{to_existing_mysql_type, to_mysql_type};
use indexmap::IndexMap;
use relcat_core::{
    Column, ColumnPosition, Index, RelcatError, Result, Table, TableChange, top_level_column,
};

/// Builds the `ALTER TABLE` statement for one table
pub struct AlterTableBuilder<'a> {
    database: &'a str,
    snapshot: &'a Table,
}

/// Identity of an emitted clause, in order of first appearance
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Modify(String),
    Add(String),
    Drop(String),
    Comment,
    Property(String),
}

/// Accumulated changes to one existing column
#[derive(Debug)]
struct WorkingColumn {
    column: Column,
    renamed: bool,
    type_changed: bool,
    /// Set once any attribute other than position was touched
    altered: bool,
    position: Option<ColumnPosition>,
}

#[derive(Debug, Default)]
struct AlterPlan {
    order: Vec<Target>,
    working: IndexMap<String, WorkingColumn>,
    added: IndexMap<String, (Column, ColumnPosition)>,
    dropped: Vec<String>,
    comment: Option<String>,
    properties: IndexMap<String, String>,
}

impl AlterPlan {
    fn touch(&mut self, target: Target) {
        if !self.order.contains(&target) {
            self.order.push(target);
        }
    }

    fn is_dropped(&self, name: &str) -> bool {
        self.dropped.iter().any(|d| d == name)
    }
}

impl<'a> AlterTableBuilder<'a> {
    pub fn new(database: &'a str, snapshot: &'a Table) -> Self {
        Self { database, snapshot }
    }

    /// Compile `changes` into one statement.
    ///
    /// Returns `Ok(None)` when nothing is left to execute, e.g. when the only
    /// changes are `if_exists` deletes of absent columns.
    pub fn build(&self, changes: &[TableChange]) -> Result<Option<String>> {
        let mut plan = AlterPlan::default();
        for change in changes {
            self.apply(&mut plan, change)?;
        }
        self.check_auto_increment(&plan)?;

        let mut clauses = Vec::new();
        for target in &plan.order {
            if let Some(clause) = self.render(&plan, target)? {
                clauses.push(clause);
            }
        }

        if clauses.is_empty() {
            return Ok(None);
        }

        Ok(Some(format!(
            "ALTER TABLE {}\n{}",
            qualified_name(self.database, self.snapshot.name()),
            clauses.join(",\n")
        )))
    }

    fn apply(&self, plan: &mut AlterPlan, change: &TableChange) -> Result<()> {
        match change {
            TableChange::AddColumn {
                field_name,
                data_type,
                comment,
                position,
                nullable,
                auto_increment,
            } => {
                let name = top_level_column(field_name)?;
                if self.snapshot.column(name).is_some()
                    || plan.added.contains_key(name)
                    || plan.working.values().any(|w| w.column.name() == name)
                {
                    return Err(RelcatError::validation(format!(
                        "Column already exists: {}",
                        name
                    )));
                }
                if let ColumnPosition::After(after) = position {
                    self.require_column(after)?;
                }
                let column = Column::builder(name)
                    .data_type(data_type.clone())
                    .comment_opt(comment.clone())
                    .nullable(*nullable)
                    .auto_increment(*auto_increment)
                    .build()?;
                // reject unsupported types before any SQL exists
                to_mysql_type(column.data_type())?;
                plan.added
                    .insert(name.to_string(), (column, position.clone()));
                plan.touch(Target::Add(name.to_string()));
            }
            TableChange::DeleteColumn {
                field_name,
                if_exists,
            } => {
                let name = top_level_column(field_name)?;
                if self.snapshot.column(name).is_none() {
                    if *if_exists {
                        return Ok(());
                    }
                    return Err(RelcatError::validation(format!(
                        "Delete column does not exist: {}",
                        name
                    )));
                }
                if plan.working.contains_key(name) {
                    return Err(RelcatError::validation(format!(
                        "Column {} cannot be both modified and deleted",
                        name
                    )));
                }
                if !plan.is_dropped(name) {
                    plan.dropped.push(name.to_string());
                    plan.touch(Target::Drop(name.to_string()));
                }
            }
            TableChange::RenameColumn {
                field_name,
                new_name,
            } => {
                let name = top_level_column(field_name)?;
                if new_name.is_empty() {
                    return Err(RelcatError::validation("Column name must not be empty"));
                }
                let taken = plan.added.contains_key(new_name.as_str())
                    || plan
                        .working
                        .iter()
                        .any(|(original, w)| original.as_str() != name && w.column.name() == new_name);
                if new_name != name && (self.snapshot.column(new_name).is_some() || taken) {
                    return Err(RelcatError::validation(format!(
                        "Column already exists: {}",
                        new_name
                    )));
                }
                let working = self.working_column(plan, name)?;
                working.column = working.column.to_builder().name(new_name.clone()).build()?;
                working.renamed = new_name != name;
                working.altered = true;
            }
            TableChange::UpdateColumnType {
                field_name,
                new_type,
            } => {
                let name = top_level_column(field_name)?;
                to_mysql_type(new_type)?;
                let working = self.working_column(plan, name)?;
                let mut builder = working.column.to_builder().data_type(new_type.clone());
                if working.column.auto_increment() && !new_type.is_integral() {
                    tracing::warn!(
                        column = %name,
                        new_type = %new_type,
                        "dropping AUTO_INCREMENT from column retyped to a non-integral type"
                    );
                    builder = builder.auto_increment(false);
                }
                working.column = builder.build()?;
                working.type_changed = true;
                working.altered = true;
            }
            TableChange::UpdateColumnComment {
                field_name,
                new_comment,
            } => {
                let name = top_level_column(field_name)?;
                let working = self.working_column(plan, name)?;
                working.column = working.column.to_builder().comment(new_comment.clone()).build()?;
                working.altered = true;
            }
            TableChange::UpdateColumnNullability {
                field_name,
                nullable,
            } => {
                let name = top_level_column(field_name)?;
                let working = self.working_column(plan, name)?;
                working.column = working.column.to_builder().nullable(*nullable).build()?;
                working.altered = true;
            }
            TableChange::UpdateColumnPosition {
                field_name,
                position,
            } => {
                let name = top_level_column(field_name)?;
                if let ColumnPosition::After(after) = position {
                    self.require_column(after)?;
                    if after == name {
                        return Err(RelcatError::validation(format!(
                            "Column {} cannot be positioned after itself",
                            name
                        )));
                    }
                }
                let working = self.working_column(plan, name)?;
                working.position = Some(position.clone());
            }
            TableChange::UpdateComment { new_comment } => {
                plan.comment = Some(new_comment.clone());
                plan.touch(Target::Comment);
            }
            TableChange::SetProperty { key, value } => {
                table_option(key, value)?;
                plan.properties.insert(key.clone(), value.clone());
                plan.touch(Target::Property(key.clone()));
            }
        }
        Ok(())
    }

    fn require_column(&self, name: &str) -> Result<&'a Column> {
        self.snapshot
            .column(name)
            .ok_or_else(|| RelcatError::validation(format!("Column does not exist: {}", name)))
    }

    fn working_column<'p>(
        &self,
        plan: &'p mut AlterPlan,
        name: &str,
    ) -> Result<&'p mut WorkingColumn> {
        let column = self.require_column(name)?;
        if plan.is_dropped(name) {
            return Err(RelcatError::validation(format!(
                "Column {} cannot be both modified and deleted",
                name
            )));
        }
        plan.touch(Target::Modify(name.to_string()));
        Ok(plan
            .working
            .entry(name.to_string())
            .or_insert_with(|| WorkingColumn {
                column: column.clone(),
                renamed: false,
                type_changed: false,
                altered: false,
                position: None,
            }))
    }

    /// Name a snapshot column will have once the statement has run
    fn final_name<'p>(&self, plan: &'p AlterPlan, name: &'p str) -> &'p str {
        plan.working
            .get(name)
            .map(|w| w.column.name())
            .unwrap_or(name)
    }

    fn render_position(
        &self,
        plan: &AlterPlan,
        own_name: &str,
        position: &ColumnPosition,
    ) -> Result<Option<String>> {
        match position {
            ColumnPosition::First => Ok(Some(" FIRST".to_string())),
            ColumnPosition::After(after) => {
                if plan.is_dropped(after) {
                    return Err(RelcatError::validation(format!(
                        "Cannot position column after deleted column: {}",
                        after
                    )));
                }
                Ok(Some(format!(
                    " AFTER {}",
                    quote_ident(self.final_name(plan, after))
                )))
            }
            ColumnPosition::Default => {
                // MySQL appends by placing the column after the last one
                let last = self
                    .snapshot
                    .columns()
                    .iter()
                    .map(|c| c.name())
                    .filter(|n| !plan.is_dropped(n))
                    .last();
                match last {
                    Some(last) if last != own_name => Ok(Some(format!(
                        " AFTER {}",
                        quote_ident(self.final_name(plan, last))
                    ))),
                    _ => Ok(None),
                }
            }
        }
    }

    fn render(&self, plan: &AlterPlan, target: &Target) -> Result<Option<String>> {
        match target {
            Target::Add(name) => {
                let Some((column, position)) = plan.added.get(name) else {
                    return Ok(None);
                };
                let mut clause = format!("ADD COLUMN {}", column_definition(column)?);
                // ADD COLUMN already appends by default
                if *position != ColumnPosition::Default {
                    if let Some(pos) = self.render_position(plan, name, position)? {
                        clause.push_str(&pos);
                    }
                }
                Ok(Some(clause))
            }
            Target::Drop(name) => Ok(Some(format!("DROP COLUMN {}", quote_ident(name)))),
            Target::Modify(name) => {
                let Some(working) = plan.working.get(name) else {
                    return Ok(None);
                };
                let position = match &working.position {
                    Some(position) => self.render_position(plan, name, position)?,
                    None => None,
                };
                if !working.altered && position.is_none() {
                    return Ok(None);
                }

                let type_sql = if working.type_changed {
                    to_mysql_type(working.column.data_type())?
                } else {
                    to_existing_mysql_type(working.column.data_type())?
                };
                let definition = column_definition_with_type(&working.column, &type_sql);
                let mut clause = if working.renamed {
                    format!("CHANGE COLUMN {} {}", quote_ident(name), definition)
                } else {
                    format!("MODIFY COLUMN {}", definition)
                };
                if let Some(position) = position {
                    clause.push_str(&position);
                }
                Ok(Some(clause))
            }
            Target::Comment => Ok(plan
                .comment
                .as_ref()
                .map(|comment| format!("COMMENT={}", quote_literal(comment)))),
            Target::Property(key) => match plan.properties.get(key) {
                Some(value) => table_option(key, value).map(Some),
                None => Ok(None),
            },
        }
    }

    /// Re-check auto-increment legality on the post-alteration column list
    /// against the snapshot's indexes (with renamed key columns followed).
    fn check_auto_increment(&self, plan: &AlterPlan) -> Result<()> {
        let mut columns: Vec<Column> = self
            .snapshot
            .columns()
            .iter()
            .filter(|c| !plan.is_dropped(c.name()))
            .map(|c| {
                plan.working
                    .get(c.name())
                    .map(|w| w.column.clone())
                    .unwrap_or_else(|| c.clone())
            })
            .collect();
        columns.extend(plan.added.values().map(|(c, _)| c.clone()));

        let indexes: Vec<Index> = self
            .snapshot
            .indexes()
            .iter()
            .map(|index| {
                let field_names = index
                    .column_names()
                    .into_iter()
                    .filter(|n| !plan.is_dropped(n))
                    .map(|n| vec![self.final_name(plan, n).to_string()])
                    .collect();
                Index::new(index.index_type, index.name.clone(), field_names)
            })
            .collect();

        validate_auto_increment(&columns, &indexes)
    }
}
