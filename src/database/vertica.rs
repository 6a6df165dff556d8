//! Vertica adapter.

use super::{ConnectorSlot, Connector, Database};
use crate::error::SlicerResult;
use crate::frame::DataFrame;
use crate::schema::{DateUnit, DatetimeInterval};
use crate::sql::{func, lit_int, lit_str, Dialect, Expr};

/// Vertica: `TRUNC(x, 'DD')` and `TIMESTAMPADD('day', n, x)`.
#[derive(Debug, Clone)]
pub struct VerticaDatabase {
    slot: ConnectorSlot,
}

impl VerticaDatabase {
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

impl Default for VerticaDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for VerticaDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Vertica
    }

    fn slow_query_log_min_seconds(&self) -> f64 {
        self.slot.slow_query_log_min_seconds()
    }

    fn trunc_date(&self, term: Expr, interval: DatetimeInterval) -> Expr {
        func("TRUNC", vec![term, lit_str(interval.trunc_key())])
    }

    fn date_add(&self, term: Expr, unit: DateUnit, n: i64) -> Expr {
        func("TIMESTAMPADD", vec![lit_str(unit.key()), lit_int(n), term])
    }

    fn fetch_data(&self, sql: &str) -> SlicerResult<DataFrame> {
        self.slot.fetch("vertica", sql)
    }
}
