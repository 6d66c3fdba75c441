//! MySQL connection implementation

use async_trait::async_trait;
use chrono::{Datelike, Timelike};
use mysql_async::{Conn, Params, Pool, Row as MySqlRow, consts::ColumnType, prelude::*};
use relcat_core::{
    Connection, ConnectionProvider, DatabaseError, QueryResult, RelcatError, Result, Row,
    StatementResult, Value,
};
use tokio::sync::Mutex;

/// One pooled MySQL connection.
///
/// The connection goes back to its pool when this value is dropped.
pub struct MySqlConnection {
    conn: Mutex<Conn>,
}

impl MySqlConnection {
    pub fn new(conn: Conn) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

/// Map a driver failure, keeping the server's code, SQLSTATE and message
pub(crate) fn mysql_error_to_relcat(err: mysql_async::Error) -> RelcatError {
    match err {
        mysql_async::Error::Server(server) => RelcatError::Execution(DatabaseError::new(
            Some(server.code),
            Some(server.state),
            server.message,
        )),
        other => RelcatError::Execution(DatabaseError::client(other.to_string())),
    }
}

/// Convert our Value into a mysql_async parameter
pub(crate) fn value_to_mysql(value: &Value) -> mysql_async::Value {
    match value {
        Value::Null => mysql_async::Value::NULL,
        Value::Bool(v) => mysql_async::Value::Int(i64::from(*v)),
        Value::Int64(v) => mysql_async::Value::Int(*v),
        Value::UInt64(v) => mysql_async::Value::UInt(*v),
        Value::Float64(v) => mysql_async::Value::Double(*v),
        Value::Decimal(v) | Value::String(v) => mysql_async::Value::Bytes(v.as_bytes().to_vec()),
        Value::Bytes(v) => mysql_async::Value::Bytes(v.clone()),
        Value::Date(d) => mysql_async::Value::Date(
            d.year() as u16,
            d.month() as u8,
            d.day() as u8,
            0,
            0,
            0,
            0,
        ),
        Value::Time(t) => mysql_async::Value::Time(
            false,
            0,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            t.nanosecond() / 1_000,
        ),
        Value::DateTime(dt) => mysql_async::Value::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond() / 1_000,
        ),
    }
}

fn to_params(params: &[Value]) -> Params {
    Params::Positional(params.iter().map(value_to_mysql).collect())
}

/// Convert mysql_async Value to our Value type, using column type metadata
/// to correctly interpret byte strings from the text protocol.
pub(crate) fn mysql_value_to_value(val: mysql_async::Value, col_type: ColumnType) -> Value {
    match val {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => match col_type {
                ColumnType::MYSQL_TYPE_TINY
                | ColumnType::MYSQL_TYPE_SHORT
                | ColumnType::MYSQL_TYPE_LONG
                | ColumnType::MYSQL_TYPE_LONGLONG
                | ColumnType::MYSQL_TYPE_INT24
                | ColumnType::MYSQL_TYPE_YEAR => match s.parse::<i64>() {
                    Ok(v) => Value::Int64(v),
                    Err(_) => s.parse::<u64>().map(Value::UInt64).unwrap_or(Value::String(s)),
                },
                ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => {
                    s.parse::<f64>().map(Value::Float64).unwrap_or(Value::String(s))
                }
                ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
                    Value::Decimal(s)
                }
                _ => Value::String(s),
            },
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        mysql_async::Value::Int(i) => Value::Int64(i),
        mysql_async::Value::UInt(u) => Value::UInt64(u),
        mysql_async::Value::Float(f) => Value::Float64(f64::from(f)),
        mysql_async::Value::Double(d) => Value::Float64(d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            let date = chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            let is_date_only = hour == 0 && min == 0 && sec == 0 && micro == 0;
            match date {
                Some(date) if is_date_only && col_type == ColumnType::MYSQL_TYPE_DATE => {
                    Value::Date(date)
                }
                Some(date) => date
                    .and_hms_micro_opt(hour as u32, min as u32, sec as u32, micro)
                    .map(Value::DateTime)
                    .unwrap_or(Value::Null),
                None => Value::String(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, min, sec
                )),
            }
        }
        mysql_async::Value::Time(negative, days, hours, mins, secs, micros) => {
            let total_hours = days * 24 + u32::from(hours);
            let sign = if negative { "-" } else { "" };
            Value::String(format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                sign, total_hours, mins, secs, micros
            ))
        }
    }
}

fn convert_rows(mysql_rows: Vec<MySqlRow>) -> QueryResult {
    let Some(first) = mysql_rows.first() else {
        return QueryResult::empty();
    };
    let columns: Vec<String> = first
        .columns_ref()
        .iter()
        .map(|c| c.name_str().to_string())
        .collect();
    let column_types: Vec<ColumnType> = first
        .columns_ref()
        .iter()
        .map(|c| c.column_type())
        .collect();

    let rows = mysql_rows
        .into_iter()
        .map(|mysql_row| {
            let values = column_types
                .iter()
                .enumerate()
                .map(|(idx, col_type)| {
                    let mysql_val: mysql_async::Value =
                        mysql_row.get(idx).unwrap_or(mysql_async::Value::NULL);
                    mysql_value_to_value(mysql_val, *col_type)
                })
                .collect();
            Row::new(columns.clone(), values)
        })
        .collect();

    QueryResult { columns, rows }
}

#[async_trait]
impl Connection for MySqlConnection {
    fn driver_name(&self) -> &str {
        "mysql"
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        let mut conn = self.conn.lock().await;
        let outcome = if params.is_empty() {
            conn.query_drop(sql).await
        } else {
            conn.exec_drop(sql, to_params(params)).await
        };
        outcome.map_err(mysql_error_to_relcat)?;

        let affected_rows = conn.affected_rows();
        tracing::debug!(affected_rows = affected_rows, "statement executed");
        Ok(StatementResult { affected_rows })
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let mut conn = self.conn.lock().await;
        let outcome: std::result::Result<Vec<MySqlRow>, mysql_async::Error> =
            if params.is_empty() {
                conn.query(sql).await
            } else {
                conn.exec(sql, to_params(params)).await
            };
        let mysql_rows = outcome.map_err(mysql_error_to_relcat)?;

        let result = convert_rows(mysql_rows);
        tracing::debug!(row_count = result.row_count(), "query executed");
        Ok(result)
    }
}

/// Pool-backed [`ConnectionProvider`]
#[derive(Clone)]
pub struct MySqlPool {
    pool: Pool,
}

impl MySqlPool {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Close every pooled connection
    pub async fn disconnect(self) -> Result<()> {
        tracing::info!("closing MySQL connection pool");
        self.pool
            .disconnect()
            .await
            .map_err(|e| RelcatError::Connection(format!("Failed to close MySQL pool: {}", e)))
    }
}

#[async_trait]
impl ConnectionProvider for MySqlPool {
    async fn acquire(&self) -> Result<Box<dyn Connection>> {
        let conn = self.pool.get_conn().await.map_err(|e| {
            RelcatError::Connection(format!("Failed to get MySQL connection: {}", e))
        })?;
        Ok(Box::new(MySqlConnection::new(conn)))
    }
}
