//! The widget-request builder.
//!
//! ```text
//!   validate widgets ─► widen rolling ranges ─► rebind references
//!     ─► resolve joins ─► make query ─► fetch ─► shape ─► operations
//!     ─► trim widened rows ─► scrub totals ─► widgets
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{SlicerResult, ValidationError};
use crate::frame::DataFrame;
use crate::operations::Operation;
use crate::schema::{Dimension, Field, Filter, Metric, Reference, Slicer};
use crate::sql::{Expr, SortDir};
use crate::widgets::{Widget, WidgetOutput};

use super::execution::fetch_data;
use super::joins::resolve_joins;
use super::makers::{make_orders, make_slicer_query, QueryPlan};
use super::shaper::{scrub_totals, shape};
use super::special_cases::{adjust_for_rolling_operations, trim_widened_rows, Widening};

/// Accumulates one data request against a [`Slicer`].
///
/// Every method takes the builder by value; clone it to branch a request.
#[derive(Clone)]
#[must_use = "call query() or fetch() to run the request"]
pub struct DataQueryBuilder<'a> {
    slicer: &'a Slicer,
    widgets: Vec<Arc<dyn Widget>>,
    dimensions: Vec<Dimension>,
    filters: Vec<Filter>,
    references: Vec<Reference>,
    orders: Vec<(Field, SortDir)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl fmt::Debug for DataQueryBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataQueryBuilder")
            .field("table", &self.slicer.table)
            .field("widgets", &self.widgets)
            .field("dimensions", &self.dimensions)
            .field("filters", &self.filters)
            .field("references", &self.references)
            .field("orders", &self.orders)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

/// A request compiled down to SQL, plus what post-processing needs.
struct Compiled {
    sql: String,
    /// Dimensions with the rollup flags the SQL was built with.
    sql_dimensions: Vec<Dimension>,
    references: Vec<Reference>,
    operations: Vec<Operation>,
    widening: Option<Widening>,
}

impl<'a> DataQueryBuilder<'a> {
    pub fn new(slicer: &'a Slicer) -> Self {
        Self {
            slicer,
            widgets: vec![],
            dimensions: vec![],
            filters: vec![],
            references: vec![],
            orders: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn widget(mut self, widget: impl Widget + 'static) -> Self {
        self.widgets.push(Arc::new(widget));
        self
    }

    /// Group by `dimension`. A dimension already selected under the same
    /// key is ignored.
    pub fn dimension(mut self, dimension: &Dimension) -> Self {
        if !self.dimensions.iter().any(|d| d.key == dimension.key) {
            self.dimensions.push(dimension.clone());
        }
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn reference(mut self, reference: Reference) -> Self {
        let duplicate = self
            .references
            .iter()
            .any(|r| r.key() == reference.key() && r.dimension.key == reference.dimension.key);
        if !duplicate {
            self.references.push(reference);
        }
        self
    }

    /// Order by `field`. Replaces the default ordering by dimensions.
    pub fn orderby(mut self, field: impl Into<Field>, direction: SortDir) -> Self {
        self.orders.push((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    // =========================================================================
    // Terminals
    // =========================================================================

    /// The SQL this request runs.
    pub fn query(&self) -> SlicerResult<String> {
        Ok(self.compile()?.sql)
    }

    /// Every SQL statement [`fetch`](Self::fetch) runs, in order.
    ///
    /// A data request runs exactly one statement. Choices and latest-value
    /// lookups are separate builders with their own `queries()`; nothing
    /// here triggers them.
    pub fn queries(&self) -> SlicerResult<Vec<String>> {
        Ok(vec![self.query()?])
    }

    /// Run the request and render every widget, in the order added.
    pub fn fetch(&self) -> SlicerResult<Vec<WidgetOutput>> {
        let compiled = self.compile()?;
        let database = self.slicer.database.as_ref();

        let raw = fetch_data(database, &compiled.sql)?;
        let mut frame = shape(raw, &compiled.sql_dimensions, !self.orders.is_empty())?;

        if !compiled.operations.is_empty() {
            frame = apply_operations(&frame, &compiled.operations, &compiled.references)?;
        }
        if let Some(widening) = &compiled.widening {
            frame = trim_widened_rows(&frame, widening)?;
        }
        scrub_totals(&mut frame, &self.dimensions)?;

        self.widgets
            .iter()
            .map(|w| w.transform(&frame, self.slicer, &self.dimensions, &compiled.references))
            .collect()
    }

    // =========================================================================
    // Compilation
    // =========================================================================

    /// Every widget's metrics, first occurrence of each key only.
    fn metrics(&self) -> Vec<Metric> {
        let mut metrics: Vec<Metric> = vec![];
        for metric in self.widgets.iter().flat_map(|w| w.metrics()) {
            if !metrics.iter().any(|m| m.key == metric.key) {
                metrics.push(metric);
            }
        }
        metrics
    }

    fn operations(&self) -> Vec<Operation> {
        let mut operations: Vec<Operation> = vec![];
        for operation in self.widgets.iter().flat_map(|w| w.operations()) {
            if !operations.iter().any(|o| o.key() == operation.key()) {
                operations.push(operation);
            }
        }
        operations
    }

    /// References bound to the selected instance of their dimension.
    fn bound_references(&self, dimensions: &[Dimension]) -> SlicerResult<Vec<Reference>> {
        self.references
            .iter()
            .map(|reference| {
                let dimension = dimensions
                    .iter()
                    .find(|d| d.key == reference.dimension.key)
                    .ok_or_else(|| {
                        ValidationError::Unsupported(format!(
                            "reference {} requires dimension `{}` to be selected",
                            reference.key(),
                            reference.dimension.key
                        ))
                    })?;
                Ok(Reference {
                    dimension: dimension.clone(),
                    ..reference.clone()
                })
            })
            .collect()
    }

    fn compile(&self) -> SlicerResult<Compiled> {
        for widget in &self.widgets {
            widget.validate(&self.dimensions)?;
        }

        let database = self.slicer.database.as_ref();
        let metrics = self.metrics();
        let operations = self.operations();

        let (filters, widening) =
            adjust_for_rolling_operations(database, &self.dimensions, &operations, self.filters.clone());

        // Share needs the totals of the dimension it divides over.
        let sql_dimensions: Vec<Dimension> = self
            .dimensions
            .iter()
            .map(|d| {
                let shared = operations.iter().any(|op| {
                    matches!(op, Operation::Share { over: Some(over), .. } if over.key == d.key)
                });
                if shared && !d.is_rollup {
                    d.rollup()
                } else {
                    d.clone()
                }
            })
            .collect();

        let references = self.bound_references(&sql_dimensions)?;

        let mut terms: Vec<&Expr> = vec![];
        for dimension in &sql_dimensions {
            terms.push(&dimension.definition);
            terms.extend(dimension.display_definition());
        }
        terms.extend(metrics.iter().map(|m| &m.definition));
        terms.extend(filters.iter().map(|f| f.definition()));
        let joins = resolve_joins(&self.slicer.joins, &self.slicer.table, terms)?;

        let plan = QueryPlan {
            database,
            table: &self.slicer.table,
            joins: &joins,
            dimensions: &sql_dimensions,
            metrics: &metrics,
            filters: &filters,
            references: &references,
        };

        let mut query = make_slicer_query(&plan).order_by(make_orders(&self.dimensions, &self.orders));
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }

        let sql = query.to_sql(database.dialect());
        tracing::debug!(
            dimensions = sql_dimensions.len(),
            metrics = metrics.len(),
            references = references.len(),
            joins = joins.len(),
            "compiled data query"
        );

        Ok(Compiled {
            sql,
            sql_dimensions,
            references,
            operations,
            widening,
        })
    }
}

/// Write each operation's column for the base and for every reference.
/// Run every operation for the base and each reference.
///
/// Operations accumulate in index order, so they run on a sorted copy. The
/// returned frame keeps the rows in `frame`'s order.
fn apply_operations(
    frame: &DataFrame,
    operations: &[Operation],
    references: &[Reference],
) -> SlicerResult<DataFrame> {
    let variants: Vec<Option<&Reference>> =
        std::iter::once(None).chain(references.iter().map(Some)).collect();

    let order = frame.index_order()?;
    let mut sorted = frame.take(&order)?;
    for operation in operations {
        for &reference in &variants {
            operation.apply(&mut sorted, reference)?;
        }
    }

    let mut restore = vec![0; order.len()];
    for (position, &row) in order.iter().enumerate() {
        restore[row] = position;
    }
    Ok(sorted.take(&restore)?)
}
