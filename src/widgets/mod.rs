//! Widgets: what a request renders its result frame into.
//!
//! A widget lists the metrics and operations it shows. The data pipeline
//! queries the union of every widget's metrics, runs their operations,
//! then hands each widget the shared frame:
//!
//! ```text
//!   frame ─┬─► FrameWidget      ──► DataFrame (labelled, optionally pivoted)
//!          ├─► DataTablesJs     ──► JSON {columns, data}
//!          ├─► HighCharts       ──► JSON {xAxis, yAxis, series}
//!          └─► CsvWidget        ──► CSV text
//! ```

mod csv;
mod datatables;
mod frame;
mod highcharts;

pub use self::csv::CsvWidget;
pub use datatables::DataTablesJs;
pub use frame::FrameWidget;
pub use highcharts::{Axis, HighCharts, Series, SeriesKind};

use std::fmt;

use crate::error::SlicerResult;
use crate::formats::Format;
use crate::frame::DataFrame;
use crate::operations::Operation;
use crate::schema::{metric_alias, Dimension, Metric, Reference, Slicer};

// =============================================================================
// Items
// =============================================================================

/// One thing a widget shows: a metric or a derived operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Metric(Metric),
    Operation(Operation),
}

impl Item {
    pub fn key(&self) -> String {
        match self {
            Item::Metric(m) => m.key.clone(),
            Item::Operation(op) => op.key(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Item::Metric(m) => m.label.clone(),
            Item::Operation(op) => op.label(),
        }
    }

    pub fn format(&self) -> Format<'_> {
        match self {
            Item::Metric(m) => Format {
                prefix: m.prefix.as_deref(),
                suffix: m.suffix.as_deref(),
                precision: m.precision,
            },
            Item::Operation(op) => Format {
                prefix: op.prefix(),
                suffix: op.suffix(),
                precision: op.precision(),
            },
        }
    }
}

impl From<&Metric> for Item {
    fn from(metric: &Metric) -> Self {
        Item::Metric(metric.clone())
    }
}

impl From<Operation> for Item {
    fn from(operation: Operation) -> Self {
        Item::Operation(operation)
    }
}

/// An item as it appears in the frame: under the base query or under one
/// reference.
#[derive(Debug, Clone, Copy)]
pub struct ItemColumn<'a> {
    pub item: &'a Item,
    pub reference: Option<&'a Reference>,
}

impl ItemColumn<'_> {
    /// Key of the column, e.g. `votes_dod_delta`.
    pub fn key(&self) -> String {
        match self.reference {
            Some(r) => r.metric_key(&self.item.key()),
            None => self.item.key(),
        }
    }

    /// Frame column the values are read from.
    pub fn alias(&self) -> String {
        metric_alias(&self.key())
    }

    /// `Votes`, or `Votes (DoD Δ%)` under a reference.
    pub fn label(&self) -> String {
        match self.reference {
            Some(r) => format!("{} ({})", self.item.label(), r.label()),
            None => self.item.label(),
        }
    }

    pub fn format(&self) -> Format<'_> {
        let format = self.item.format();
        match self.reference {
            Some(r) if r.delta_percent => Format {
                prefix: None,
                suffix: Some("%"),
                precision: format.precision,
            },
            _ => format,
        }
    }
}

/// Every column of `items`: the base columns first, then each reference's,
/// in reference order.
pub fn item_columns<'a>(items: &'a [Item], references: &'a [Reference]) -> Vec<ItemColumn<'a>> {
    std::iter::once(None)
        .chain(references.iter().map(Some))
        .flat_map(|reference| items.iter().map(move |item| ItemColumn { item, reference }))
        .collect()
}

// =============================================================================
// Widget
// =============================================================================

/// What a widget produced.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetOutput {
    Frame(DataFrame),
    Json(serde_json::Value),
    Csv(String),
}

/// A renderer over the shaped result frame.
pub trait Widget: fmt::Debug + Send + Sync {
    /// Name used in validation errors.
    fn name(&self) -> &'static str;

    fn items(&self) -> Vec<Item>;

    /// Metrics to query: every metric item and every operation's input,
    /// first occurrence of each key only.
    fn metrics(&self) -> Vec<Metric> {
        let mut metrics: Vec<Metric> = vec![];
        for item in self.items() {
            let metric = match item {
                Item::Metric(m) => m,
                Item::Operation(op) => op.metric().clone(),
            };
            if !metrics.iter().any(|m| m.key == metric.key) {
                metrics.push(metric);
            }
        }
        metrics
    }

    fn operations(&self) -> Vec<Operation> {
        self.items()
            .into_iter()
            .filter_map(|item| match item {
                Item::Operation(op) => Some(op),
                Item::Metric(_) => None,
            })
            .collect()
    }

    /// Reject requests this widget cannot render. Accepts everything by default.
    fn validate(&self, _dimensions: &[Dimension]) -> SlicerResult<()> {
        Ok(())
    }

    fn transform(
        &self,
        frame: &DataFrame,
        slicer: &Slicer,
        dimensions: &[Dimension],
        references: &[Reference],
    ) -> SlicerResult<WidgetOutput>;
}

/// Value of a dimension's display column on row `row`, if it has one.
pub(crate) fn display_cell(frame: &DataFrame, dimension: &Dimension, row: usize) -> Option<crate::frame::Value> {
    frame.value_at(&dimension.display_alias(), row)
}
