//! PostgreSQL adapter.

use super::{ConnectorSlot, Connector, Database};
use crate::error::SlicerResult;
use crate::frame::DataFrame;
use crate::schema::{DateUnit, DatetimeInterval};
use crate::sql::{func, interval, lit_str, DatePart, Dialect, Expr, ExprExt};

/// PostgreSQL: `DATE_TRUNC('day', x)` and `x + INTERVAL 'n' DAY`.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    slot: ConnectorSlot,
}

impl PostgresDatabase {
    /// An adapter that renders SQL but cannot execute it yet.
    pub fn new() -> Self {
        Self {
            slot: ConnectorSlot::new(),
        }
    }

    /// Execute queries through `connector`.
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.slot.set_connector(std::sync::Arc::new(connector));
        self
    }

    pub fn with_slow_query_log_min_seconds(mut self, seconds: f64) -> Self {
        self.slot.set_slow_query_threshold(seconds);
        self
    }
}

impl Default for PostgresDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for PostgresDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn slow_query_log_min_seconds(&self) -> f64 {
        self.slot.slow_query_log_min_seconds()
    }

    fn trunc_date(&self, term: Expr, interval: DatetimeInterval) -> Expr {
        let field = match interval {
            DatetimeInterval::Hourly => "hour",
            DatetimeInterval::Daily => "day",
            DatetimeInterval::Weekly => "week",
            DatetimeInterval::Monthly => "month",
            DatetimeInterval::Quarterly => "quarter",
            DatetimeInterval::Annually => "year",
        };
        func("DATE_TRUNC", vec![lit_str(field), term])
    }

    fn date_add(&self, term: Expr, unit: DateUnit, n: i64) -> Expr {
        // Interval qualifiers stop at DAY and MONTH granularity.
        let (n, part) = match unit {
            DateUnit::Hour => (n, DatePart::Hour),
            DateUnit::Day => (n, DatePart::Day),
            DateUnit::Week => (n * 7, DatePart::Day),
            DateUnit::Month => (n, DatePart::Month),
            DateUnit::Quarter => (n * 3, DatePart::Month),
            DateUnit::Year => (n, DatePart::Year),
        };
        term.add(interval(lit_str(&n.to_string()), part))
    }

    fn fetch_data(&self, sql: &str) -> SlicerResult<DataFrame> {
        self.slot.fetch("postgres", sql)
    }
}
