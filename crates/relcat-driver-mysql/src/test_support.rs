//! Scripted connection for exercising catalog and operation code without a
//! server

use async_trait::async_trait;
use relcat_core::{
    Connection, ConnectionProvider, DatabaseError, QueryResult, RelcatError, Result, Row,
    StatementResult, Value,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) enum Response {
    Rows(QueryResult),
    Affected(u64),
    Fail(RelcatError),
}

#[derive(Default)]
struct Script {
    responses: Mutex<VecDeque<Response>>,
    statements: Mutex<Vec<String>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// Hands out connections that answer from one shared response queue, in
/// order, and record every statement they receive
#[derive(Clone, Default)]
pub(crate) struct ScriptedProvider {
    script: Arc<Script>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: Response) -> &Self {
        self.script.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn rows(&self, result: QueryResult) -> &Self {
        self.respond(Response::Rows(result))
    }

    pub fn affected(&self, rows: u64) -> &Self {
        self.respond(Response::Affected(rows))
    }

    pub fn fail_with_code(&self, code: u16, message: &str) -> &Self {
        self.respond(Response::Fail(RelcatError::Execution(DatabaseError::new(
            Some(code),
            Some("HY000".to_string()),
            message,
        ))))
    }

    pub fn connection(&self) -> ScriptedConnection {
        self.script.acquired.fetch_add(1, Ordering::SeqCst);
        ScriptedConnection {
            script: self.script.clone(),
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.script.statements.lock().unwrap().clone()
    }

    /// Statements that were run through `execute`
    pub fn executed(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|s| !s.starts_with("SELECT"))
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.script.responses.lock().unwrap().len()
    }

    pub fn acquired(&self) -> usize {
        self.script.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.script.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionProvider for ScriptedProvider {
    async fn acquire(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(self.connection()))
    }
}

pub(crate) struct ScriptedConnection {
    script: Arc<Script>,
}

impl ScriptedConnection {
    fn next(&self, sql: &str) -> Option<Response> {
        self.script.statements.lock().unwrap().push(sql.to_string());
        self.script.responses.lock().unwrap().pop_front()
    }
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        self.script.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    fn driver_name(&self) -> &str {
        "scripted"
    }

    async fn execute(&self, sql: &str, _params: &[Value]) -> Result<StatementResult> {
        match self.next(sql) {
            Some(Response::Affected(affected_rows)) => Ok(StatementResult { affected_rows }),
            Some(Response::Fail(err)) => Err(err),
            Some(Response::Rows(_)) => panic!("rows scripted for statement: {}", sql),
            None => Ok(StatementResult::default()),
        }
    }

    async fn query(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
        match self.next(sql) {
            Some(Response::Rows(result)) => Ok(result),
            Some(Response::Fail(err)) => Err(err),
            Some(Response::Affected(_)) => panic!("row count scripted for query: {}", sql),
            None => Ok(QueryResult::empty()),
        }
    }
}

/// Build a result set from string-ish cells; `None` becomes NULL
pub(crate) fn result_set(columns: &[&str], rows: Vec<Vec<Option<Value>>>) -> QueryResult {
    let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let rows = rows
        .into_iter()
        .map(|cells| {
            Row::new(
                columns.clone(),
                cells
                    .into_iter()
                    .map(|cell| cell.unwrap_or(Value::Null))
                    .collect(),
            )
        })
        .collect();
    QueryResult { columns, rows }
}

pub(crate) fn s(value: &str) -> Option<Value> {
    Some(Value::from(value))
}

pub(crate) fn n(value: u64) -> Option<Value> {
    Some(Value::UInt64(value))
}

/// One `information_schema.TABLES` row
pub(crate) fn table_row(comment: &str, engine: Option<&str>, auto_increment: Option<u64>) -> QueryResult {
    result_set(
        &["table_comment", "engine", "auto_increment"],
        vec![vec![s(comment), engine.and_then(s), auto_increment.and_then(n)]],
    )
}

/// Column row fields: name, data_type, column_type, char length, nullable,
/// comment, extra
pub(crate) struct ColumnRow<'a> {
    pub name: &'a str,
    pub data_type: &'a str,
    pub column_type: &'a str,
    pub length: Option<u64>,
    pub nullable: bool,
    pub comment: &'a str,
    pub extra: &'a str,
}

pub(crate) fn column_rows(columns: &[ColumnRow<'_>]) -> QueryResult {
    result_set(
        &[
            "column_name",
            "data_type",
            "column_type",
            "character_maximum_length",
            "numeric_precision",
            "numeric_scale",
            "is_nullable",
            "column_comment",
            "extra",
        ],
        columns
            .iter()
            .map(|c| {
                vec![
                    s(c.name),
                    s(c.data_type),
                    s(c.column_type),
                    c.length.and_then(n),
                    None,
                    None,
                    s(if c.nullable { "YES" } else { "NO" }),
                    s(c.comment),
                    s(c.extra),
                ]
            })
            .collect(),
    )
}

/// Index rows as `(index name, column)` pairs in `SEQ_IN_INDEX` order
pub(crate) fn index_rows(entries: &[(&str, &str)]) -> QueryResult {
    result_set(
        &["index_name", "column_name"],
        entries
            .iter()
            .map(|(index, column)| vec![s(index), s(column)])
            .collect(),
    )
}
