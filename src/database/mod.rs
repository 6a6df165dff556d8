//! Database adapters.
//!
//! A [`Database`] knows three things the query makers cannot express in the
//! portable SQL algebra: the dialect to render in, how to truncate a
//! timestamp to an interval, and how to shift a timestamp by a number of
//! units. It also runs the rendered SQL and returns the rows as a
//! [`DataFrame`].
//!
//! ```text
//!   Slicer ──► query makers ──► Query ──► to_sql(database.dialect())
//!                  │                           │
//!                  ├─ trunc_date / date_add    ▼
//!                  │                     database.fetch_data(sql) ──► DataFrame
//! ```
//!
//! [`SqliteDatabase`] executes in-process through `rusqlite`. The warehouse
//! adapters render their dialect and hand the SQL to a caller-supplied
//! [`Connector`].

mod mysql;
mod postgres;
mod sqlite;
mod vertica;

pub use mysql::MySqlDatabase;
pub use postgres::PostgresDatabase;
pub use sqlite::SqliteDatabase;
pub use vertica::VerticaDatabase;

use std::fmt;
use std::sync::Arc;

use crate::error::{AdapterError, SlicerResult};
use crate::frame::DataFrame;
use crate::schema::{DateUnit, DatetimeInterval};
use crate::sql::{Dialect, Expr};

/// Default threshold for the `slow_query` log, in seconds.
pub const DEFAULT_SLOW_QUERY_LOG_MIN_SECONDS: f64 = 15.0;

/// A warehouse the slicer compiles queries for and runs them against.
pub trait Database: fmt::Debug + Send + Sync {
    /// Dialect every query for this database is rendered in.
    fn dialect(&self) -> Dialect;

    /// Queries running at least this long are logged on `slow_query`.
    fn slow_query_log_min_seconds(&self) -> f64 {
        DEFAULT_SLOW_QUERY_LOG_MIN_SECONDS
    }

    /// Truncate `term` to the start of its `interval` bucket.
    fn trunc_date(&self, term: Expr, interval: DatetimeInterval) -> Expr;

    /// Shift `term` by `n` units. `n` may be negative.
    fn date_add(&self, term: Expr, unit: DateUnit, n: i64) -> Expr;

    /// Execute `sql` and return every row, columns named as selected.
    fn fetch_data(&self, sql: &str) -> SlicerResult<DataFrame>;
}

/// Executes SQL on behalf of a warehouse adapter.
///
/// Implemented for any `Fn(&str) -> SlicerResult<DataFrame>`, so tests and
/// callers can plug in a driver with a closure.
pub trait Connector: Send + Sync {
    fn fetch(&self, sql: &str) -> SlicerResult<DataFrame>;
}

impl<F> Connector for F
where
    F: Fn(&str) -> SlicerResult<DataFrame> + Send + Sync,
{
    fn fetch(&self, sql: &str) -> SlicerResult<DataFrame> {
        self(sql)
    }
}

/// Connection state shared by the adapters that delegate execution.
#[derive(Clone)]
pub(crate) struct ConnectorSlot {
    connector: Option<Arc<dyn Connector>>,
    slow_query_log_min_seconds: f64,
}

impl ConnectorSlot {
    pub(crate) fn new() -> Self {
        Self {
            connector: None,
            slow_query_log_min_seconds: DEFAULT_SLOW_QUERY_LOG_MIN_SECONDS,
        }
    }

    pub(crate) fn set_connector(&mut self, connector: Arc<dyn Connector>) {
        self.connector = Some(connector);
    }

    pub(crate) fn set_slow_query_threshold(&mut self, seconds: f64) {
        self.slow_query_log_min_seconds = seconds;
    }

    pub(crate) fn slow_query_log_min_seconds(&self) -> f64 {
        self.slow_query_log_min_seconds
    }

    pub(crate) fn fetch(&self, adapter: &str, sql: &str) -> SlicerResult<DataFrame> {
        match &self.connector {
            Some(connector) => connector.fetch(sql),
            None => Err(AdapterError::Connector(format!(
                "{} adapter has no connector configured",
                adapter
            ))
            .into()),
        }
    }
}

impl fmt::Debug for ConnectorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorSlot")
            .field("connected", &self.connector.is_some())
            .field("slow_query_log_min_seconds", &self.slow_query_log_min_seconds)
            .finish()
    }
}
