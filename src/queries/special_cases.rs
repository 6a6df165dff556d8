//! Request rewrites for operations that need rows outside the filtered range.
//!
//! A rolling mean over `n` periods needs `n - 1` periods before the first
//! requested one. When the leading dimension is a datetime with a range
//! filter, the range is widened in SQL and the rows outside the requested
//! range are trimmed once the operation has run.

use chrono::{NaiveDate, NaiveDateTime};

use crate::database::Database;
use crate::frame::{DataFrame, FrameResult, Value};
use crate::operations::Operation;
use crate::schema::{DateUnit, Dimension, Filter, FilterKind};
use crate::sql::{Expr, Literal};

/// How far a range filter was widened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Widening {
    /// Periods added before the requested range.
    pub periods: usize,
    /// Lower bound of the requested range, when it is a literal.
    pub start: Option<NaiveDateTime>,
    /// Bucket size of the leading dimension.
    pub unit: DateUnit,
}

/// A literal range bound as a timestamp.
fn literal_start(low: &Expr) -> Option<NaiveDateTime> {
    match low {
        Expr::Literal(Literal::Timestamp(t)) => Some(*t),
        Expr::Literal(Literal::Date(d)) => d.and_hms_opt(0, 0, 0),
        Expr::Literal(Literal::String(s)) => ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            }),
        _ => None,
    }
}

/// Widen the range filter on the leading datetime dimension for any
/// rolling operations. Returns the filters to query with and, when a
/// filter was widened, how many rows to trim afterwards.
pub fn adjust_for_rolling_operations(
    database: &dyn Database,
    dimensions: &[Dimension],
    operations: &[Operation],
    filters: Vec<Filter>,
) -> (Vec<Filter>, Option<Widening>) {
    let window = operations
        .iter()
        .filter_map(|op| match op {
            Operation::RollingMean { window, .. } => Some(*window),
            _ => None,
        })
        .max();

    let (Some(window), Some(leading)) = (window, dimensions.first()) else {
        return (filters, None);
    };
    let Some(interval) = leading.datetime_interval() else {
        return (filters, None);
    };
    if window <= 1 {
        return (filters, None);
    }

    let periods = window - 1;
    let mut widened = false;
    let mut start = None;
    let filters = filters
        .into_iter()
        .map(|filter| match &filter {
            Filter::Dimension(f) if f.dimension_key == leading.key && f.kind == FilterKind::Range => {
                let Expr::Between {
                    expr,
                    low,
                    high,
                    negated: false,
                } = &f.definition
                else {
                    return filter;
                };
                widened = true;
                start = literal_start(low);
                let low = database.date_add((**low).clone(), interval.unit(), -(periods as i64));
                filter.with_definition(Expr::Between {
                    expr: expr.clone(),
                    low: Box::new(low),
                    high: high.clone(),
                    negated: false,
                })
            }
            _ => filter,
        })
        .collect();

    if widened {
        tracing::debug!(dimension = %leading.key, periods, "widened range filter for rolling operations");
        let unit = interval.unit();
        (filters, Some(Widening { periods, start, unit }))
    } else {
        (filters, None)
    }
}

/// Drop the rows a widened filter pulled in, keeping the frame's row order.
///
/// With a literal lower bound, a row goes when its leading bucket ends at or
/// before that bound. Otherwise the first `periods` rows of each group of
/// the trailing index levels go, counted in index order. Leading totals
/// rows always stay.
pub fn trim_widened_rows(frame: &DataFrame, widening: &Widening) -> FrameResult<DataFrame> {
    let leading: Vec<Value> = match frame.index_names().first() {
        Some(name) => frame.level(name)?,
        None => return Ok(frame.clone()),
    };
    let timestamps = leading
        .iter()
        .all(|v| v.is_totals_marker() || v.is_null() || v.as_timestamp().is_some());

    let keep: Vec<bool> = match widening.start {
        Some(start) if timestamps => leading
            .iter()
            .map(|label| match label.as_timestamp() {
                Some(t) if !label.is_totals_marker() => widening.unit.next(t).map_or(true, |end| end > start),
                _ => true,
            })
            .collect(),
        _ => {
            let order = frame.index_order()?;
            let sorted = frame.take(&order)?;
            let levels: Vec<usize> = (1..frame.index_names().len()).collect();
            let mut keep = vec![true; frame.len()];
            for positions in sorted.group_positions(&levels) {
                for p in positions.into_iter().take(widening.periods) {
                    if !leading[order[p]].is_totals_marker() {
                        keep[order[p]] = false;
                    }
                }
            }
            keep
        }
    };

    let mut flags = keep.into_iter();
    let mut trimmed = frame.clone();
    trimmed.retain(|_, _| flags.next().unwrap_or(true))?;
    Ok(trimmed)
}
