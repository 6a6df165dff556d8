//! MySQL adapter.

use super::{ConnectorSlot, Connector, Database};
use crate::error::SlicerResult;
use crate::frame::DataFrame;
use crate::schema::{DateUnit, DatetimeInterval};
use crate::sql::{func, interval, lit_int, lit_str, DatePart, Dialect, Expr, ExprExt};

/// MySQL has no `TRUNC` for dates; buckets are rebuilt with `DATE_FORMAT`.
#[derive(Debug, Clone)]
pub struct MySqlDatabase {
    slot: ConnectorSlot,
}

impl MySqlDatabase {
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

impl Default for MySqlDatabase {
    fn default() -> Self {
        Self::new()
    }
}

fn date_format(term: Expr, format: &str) -> Expr {
    func("DATE_FORMAT", vec![term, lit_str(format)])
}

impl Database for MySqlDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn slow_query_log_min_seconds(&self) -> f64 {
        self.slot.slow_query_log_min_seconds()
    }

    fn trunc_date(&self, term: Expr, bucket: DatetimeInterval) -> Expr {
        match bucket {
            DatetimeInterval::Hourly => date_format(term, "%Y-%m-%d %H:00:00"),
            DatetimeInterval::Daily => date_format(term, "%Y-%m-%d"),
            DatetimeInterval::Weekly => func(
                "DATE_SUB",
                vec![
                    func("DATE", vec![term.clone()]),
                    interval(func("WEEKDAY", vec![term]), DatePart::Day),
                ],
            ),
            DatetimeInterval::Monthly => date_format(term, "%Y-%m-01"),
            DatetimeInterval::Quarterly => {
                func("MAKEDATE", vec![func("YEAR", vec![term.clone()]), lit_int(1)]).add(
                    interval(func("QUARTER", vec![term]).sub(1), DatePart::Quarter),
                )
            }
            DatetimeInterval::Annually => date_format(term, "%Y-01-01"),
        }
    }

    fn date_add(&self, term: Expr, unit: DateUnit, n: i64) -> Expr {
        func("DATE_ADD", vec![term, interval(lit_int(n), unit.date_part())])
    }

    fn fetch_data(&self, sql: &str) -> SlicerResult<DataFrame> {
        self.slot.fetch("mysql", sql)
    }
}
