//! Post-query derived metrics.
//!
//! Operations run on the shaped frame after SQL. Each reads one metric
//! column and yields one new column aligned with the frame's rows:
//!
//! | Operation | Key | Column |
//! |---|---|---|
//! | `CumSum(votes)` | `cumsum(votes)` | running sum along the leading index level |
//! | `RollingMean(votes, 3, 3)` | `rollingmean(votes)` | mean of the last 3 rows |
//! | `Share(votes, party)` | `share(votes,political_party)` | percent of the `party` totals row |
//!
//! Operations are polars expressions. Cumulative and rolling operations run
//! `over` every index level but the first, in row order, so callers sort the
//! frame by index first. Rows whose leading label is a totals marker sit
//! outside the running computation and receive null.

use polars::prelude::{col, lit, when, DataType, Expr, RollingOptionsFixedWindow, NULL};

use crate::error::SlicerResult;
use crate::frame::{DataFrame, FrameError, Scratch, Value};
use crate::schema::{metric_alias, reference_key, Dimension, Metric, Reference};

/// A post-query derivation over one metric.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CumSum(Metric),
    CumProd(Metric),
    CumMean(Metric),
    RollingMean {
        metric: Metric,
        window: usize,
        min_periods: usize,
    },
    /// Percent of the totals row of `over`; 100 everywhere without `over`.
    Share {
        metric: Metric,
        over: Option<Dimension>,
    },
}

impl Operation {
    pub fn cumsum(metric: &Metric) -> Self {
        Operation::CumSum(metric.clone())
    }

    pub fn cumprod(metric: &Metric) -> Self {
        Operation::CumProd(metric.clone())
    }

    pub fn cummean(metric: &Metric) -> Self {
        Operation::CumMean(metric.clone())
    }

    pub fn rolling_mean(metric: &Metric, window: usize, min_periods: usize) -> Self {
        Operation::RollingMean {
            metric: metric.clone(),
            window,
            min_periods,
        }
    }

    pub fn share(metric: &Metric, over: Option<&Dimension>) -> Self {
        Operation::Share {
            metric: metric.clone(),
            over: over.cloned(),
        }
    }

    /// The metric this operation reads.
    pub fn metric(&self) -> &Metric {
        match self {
            Operation::CumSum(m) | Operation::CumProd(m) | Operation::CumMean(m) => m,
            Operation::RollingMean { metric, .. } | Operation::Share { metric, .. } => metric,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Operation::CumSum(_) => "cumsum",
            Operation::CumProd(_) => "cumprod",
            Operation::CumMean(_) => "cummean",
            Operation::RollingMean { .. } => "rollingmean",
            Operation::Share { .. } => "share",
        }
    }

    /// Key of the column this operation writes.
    pub fn key(&self) -> String {
        match self {
            Operation::Share {
                metric,
                over: Some(over),
            } => format!("share({},{})", metric.key, over.key),
            _ => format!("{}({})", self.name(), self.metric().key),
        }
    }

    pub fn label(&self) -> String {
        let label = &self.metric().label;
        match self {
            Operation::CumSum(_) => format!("CumSum({})", label),
            Operation::CumProd(_) => format!("CumProd({})", label),
            Operation::CumMean(_) => format!("CumMean({})", label),
            Operation::RollingMean { .. } => format!("RollingMean({})", label),
            Operation::Share { .. } => format!("Share({})", label),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        match self {
            Operation::Share { .. } => None,
            _ => self.metric().prefix.as_deref(),
        }
    }

    pub fn suffix(&self) -> Option<&str> {
        match self {
            Operation::Share { .. } => Some("%"),
            _ => self.metric().suffix.as_deref(),
        }
    }

    pub fn precision(&self) -> Option<usize> {
        match self {
            Operation::Share { .. } => Some(2),
            _ => self.metric().precision,
        }
    }

    /// Frame column written for `reference`, or for the base when `None`.
    pub fn alias(&self, reference: Option<&Reference>) -> String {
        metric_alias(&reference_key(&self.key(), reference))
    }

    /// Write this operation's column for `reference` (or the base when
    /// `None`) into `frame`. Rows must be in ascending index order.
    pub fn apply(&self, frame: &mut DataFrame, reference: Option<&Reference>) -> SlicerResult<()> {
        let source = metric_alias(&reference_key(&self.metric().key, reference));
        if !frame.has_column(&source) {
            return Err(FrameError::MissingColumn(source).into());
        }
        let target = self.alias(reference);

        match self {
            Operation::CumSum(_) => running(frame, &target, masked(&source).cum_sum(false))?,
            Operation::CumProd(_) => running(frame, &target, masked(&source).cum_prod(false))?,
            Operation::CumMean(_) => {
                let values = masked(&source).cast(DataType::Float64);
                let count = values.clone().is_not_null().cast(DataType::Float64).cum_sum(false);
                let mean = when(values.clone().is_null())
                    .then(lit(NULL))
                    .otherwise(values.cum_sum(false) / count);
                running(frame, &target, mean)?
            }
            Operation::RollingMean {
                window,
                min_periods,
                ..
            } => {
                let options = RollingOptionsFixedWindow {
                    window_size: (*window).max(1),
                    min_periods: (*min_periods).max(1),
                    ..Default::default()
                };
                let mean = masked(&source).cast(DataType::Float64).rolling_mean(options);
                running(frame, &target, mean)?
            }
            Operation::Share { over, .. } => share(frame, &source, &target, over.as_ref())?,
        }
        Ok(())
    }
}

// =============================================================================
// Cumulative and rolling
// =============================================================================

/// Rows whose leading label is a totals marker.
const LEADING_TOTALS: &str = "__leading_totals";

/// Rows whose `over` label is a totals marker.
const OVER_TOTALS: &str = "__over_totals";

/// Column holding the share denominator of each row's group.
const SHARE_TOTAL: &str = "__share_total";

/// The source column with leading-totals rows blanked out.
fn masked(source: &str) -> Expr {
    when(col(LEADING_TOTALS)).then(lit(NULL)).otherwise(col(source))
}

fn partition(names: &[String]) -> Vec<Expr> {
    names.iter().map(|n| col(n)).collect()
}

/// Evaluate `expr` within groups of every index level but the first, in
/// row order. Leading-totals rows receive null.
fn running(frame: &mut DataFrame, target: &str, expr: Expr) -> SlicerResult<()> {
    let leading_totals: Vec<bool> = frame
        .rows()
        .map(|(labels, _)| labels.first().is_some_and(Value::is_totals_marker))
        .collect();

    let trailing = partition(frame.index_names().get(1..).unwrap_or_default());
    let expr = if trailing.is_empty() { expr } else { expr.over(trailing) };
    let expr = when(col(LEADING_TOTALS)).then(lit(NULL)).otherwise(expr);

    frame.derive(target, expr, Scratch::default().mask(LEADING_TOTALS, leading_totals))?;
    Ok(())
}

// =============================================================================
// Share
// =============================================================================

/// Percent of the totals row of `over` within each group of the levels
/// above it. Groups without a totals row are 100.
fn share(frame: &mut DataFrame, source: &str, target: &str, over: Option<&Dimension>) -> SlicerResult<()> {
    let Some(over) = over else {
        frame.derive(target, lit(100.0), Scratch::default())?;
        return Ok(());
    };

    let level = frame
        .level_position(&over.alias())
        .ok_or_else(|| FrameError::MissingLevel(over.alias()))?;
    let totals: Vec<bool> = frame
        .rows()
        .map(|(labels, _)| labels[level].is_totals_marker())
        .collect();

    let above = partition(&frame.index_names()[..level]);
    let total = col(source)
        .cast(DataType::Float64)
        .filter(col(OVER_TOTALS))
        .first();
    let total = if above.is_empty() { total } else { total.over(above) };

    let value = col(source).cast(DataType::Float64);
    let percent = when(col(SHARE_TOTAL).is_null())
        .then(lit(100.0))
        .when(value.clone().is_null().or(col(SHARE_TOTAL).eq(lit(0.0))))
        .then(lit(NULL))
        .otherwise(value * lit(100.0) / col(SHARE_TOTAL));

    let scratch = Scratch::default()
        .mask(OVER_TOTALS, totals)
        .expr(SHARE_TOTAL, total);
    frame.derive(target, percent, scratch)?;
    Ok(())
}
