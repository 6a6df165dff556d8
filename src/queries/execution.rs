//! Running rendered SQL with query logging.

use std::time::Instant;

use crate::database::Database;
use crate::error::SlicerResult;
use crate::frame::DataFrame;

/// Run `sql` on `database`, logging it on the `query` target and again on
/// `slow_query` when it takes at least the database's threshold.
pub fn fetch_data(database: &dyn Database, sql: &str) -> SlicerResult<DataFrame> {
    tracing::debug!(target: "query", dialect = %database.dialect(), "{}", sql);

    let started = Instant::now();
    let result = database.fetch_data(sql);
    let elapsed = started.elapsed().as_secs_f64();

    let message = timed(elapsed, sql);
    match &result {
        Ok(frame) => tracing::info!(target: "query", rows = frame.len(), "{}", message),
        Err(err) => tracing::error!(target: "query", error = %err, "{}", message),
    }

    if elapsed >= database.slow_query_log_min_seconds() {
        tracing::warn!(target: "slow_query", "{}", message);
    }

    result
}

/// `[0.012s]: SELECT ...`
fn timed(elapsed: f64, sql: &str) -> String {
    format!("[{:.3}s]: {}", elapsed, sql)
}
