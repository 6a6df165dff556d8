//! Embedded SQLite adapter.
//!
//! SQLite has no date type: timestamps are stored as `YYYY-MM-DD HH:MM:SS`
//! text and bucketed with `datetime()` modifiers. Text cells in that exact
//! format come back as [`Value::Timestamp`].

use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDateTime;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use super::{Database, DEFAULT_SLOW_QUERY_LOG_MIN_SECONDS};
use crate::config::DatabaseSettings;
use crate::error::{AdapterError, SlicerResult};
use crate::frame::{DataFrame, Value};
use crate::schema::{DateUnit, DatetimeInterval};
use crate::sql::{func, lit_int, lit_str, BinaryOperator, Dialect, Expr, ExprExt};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A SQLite database opened through `rusqlite`.
#[derive(Debug)]
pub struct SqliteDatabase {
    conn: Mutex<Connection>,
    slow_query_log_min_seconds: f64,
}

impl SqliteDatabase {
    /// Open or create the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> SlicerResult<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> SlicerResult<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Open the database named by `[database]` settings.
    ///
    /// Without a `path` the database lives in memory.
    pub fn from_settings(settings: &DatabaseSettings) -> SlicerResult<Self> {
        let db = match settings.resolved_path()? {
            Some(path) => Self::open(path)?,
            None => Self::open_in_memory()?,
        };
        Ok(db.with_slow_query_log_min_seconds(settings.slow_query_log_min_seconds))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            slow_query_log_min_seconds: DEFAULT_SLOW_QUERY_LOG_MIN_SECONDS,
        }
    }

    pub fn with_slow_query_log_min_seconds(mut self, seconds: f64) -> Self {
        self.slow_query_log_min_seconds = seconds;
        self
    }

    /// Run one or more statements that return no rows, e.g. fixture DDL.
    pub fn execute_batch(&self, sql: &str) -> SlicerResult<()> {
        let conn = self.conn.lock().map_err(|_| AdapterError::Poisoned)?;
        conn.execute_batch(sql)?;
        Ok(())
    }
}

fn to_value(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            match NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT) {
                Ok(ts) => Value::Timestamp(ts),
                Err(_) => Value::Text(text.into_owned()),
            }
        }
        ValueRef::Blob(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn datetime(term: Expr, modifiers: &[&str]) -> Expr {
    let mut args = vec![term];
    args.extend(modifiers.iter().map(|m| lit_str(m)));
    func("datetime", args)
}

impl Database for SqliteDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn slow_query_log_min_seconds(&self) -> f64 {
        self.slow_query_log_min_seconds
    }

    fn trunc_date(&self, term: Expr, interval: DatetimeInterval) -> Expr {
        match interval {
            DatetimeInterval::Hourly => {
                func("strftime", vec![lit_str("%Y-%m-%d %H:00:00"), term])
            }
            DatetimeInterval::Daily => datetime(term, &["start of day"]),
            // Back up six days, then forward to the next Monday.
            DatetimeInterval::Weekly => datetime(term, &["start of day", "-6 days", "weekday 1"]),
            DatetimeInterval::Monthly => datetime(term, &["start of month"]),
            DatetimeInterval::Quarterly => {
                let months_into_quarter = Expr::BinaryOp {
                    left: Box::new(
                        func("strftime", vec![lit_str("%m"), term.clone()]).sub(lit_int(1)),
                    ),
                    op: BinaryOperator::Mod,
                    right: Box::new(lit_int(3)),
                };
                func(
                    "datetime",
                    vec![
                        term,
                        lit_str("start of month"),
                        func("printf", vec![lit_str("-%d months"), months_into_quarter]),
                    ],
                )
            }
            DatetimeInterval::Annually => datetime(term, &["start of year"]),
        }
    }

    fn date_add(&self, term: Expr, unit: DateUnit, n: i64) -> Expr {
        let modifier = match unit {
            DateUnit::Hour => format!("{:+} hours", n),
            DateUnit::Day => format!("{:+} days", n),
            DateUnit::Week => format!("{:+} days", n * 7),
            DateUnit::Month => format!("{:+} months", n),
            DateUnit::Quarter => format!("{:+} months", n * 3),
            DateUnit::Year => format!("{:+} years", n),
        };
        datetime(term, &[modifier.as_str()])
    }

    fn fetch_data(&self, sql: &str) -> SlicerResult<DataFrame> {
        let conn = self.conn.lock().map_err(|_| AdapterError::Poisoned)?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(width);
            for i in 0..width {
                record.push(to_value(row.get_ref(i)?));
            }
            records.push(record);
        }

        Ok(DataFrame::from_records(columns, records)?)
    }
}
