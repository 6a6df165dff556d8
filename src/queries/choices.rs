//! The dimension-choices builder: the distinct values a dimension takes.

use crate::error::SlicerResult;
use crate::formats::dimension_display;
use crate::frame::Value;
use crate::schema::{DatetimeInterval, Dimension, DimensionKind, Filter, Join, Slicer};
use crate::sql::{col, Expr, ExprExt, OrderByExpr, Query, TableRef};

use super::execution::fetch_data;
use super::joins::resolve_joins;
use super::makers::{dimension_select_items, with_joins};

/// Lists `(value, label)` pairs for one dimension.
///
/// Scans the slicer's hint table when it has one, re-homing every column
/// of the fact table onto it.
#[derive(Debug, Clone)]
#[must_use = "call query() or fetch() to run the request"]
pub struct DimensionChoicesBuilder<'a> {
    slicer: &'a Slicer,
    dimension: Dimension,
    filters: Vec<Filter>,
    force_include: Vec<Expr>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<'a> DimensionChoicesBuilder<'a> {
    pub fn new(slicer: &'a Slicer, dimension: &Dimension) -> Self {
        Self {
            slicer,
            dimension: dimension.clone(),
            filters: vec![],
            force_include: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// List these raw values first.
    pub fn force_include<V: Into<Expr>>(mut self, values: Vec<V>) -> Self {
        self.force_include.extend(values.into_iter().map(Into::into));
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

    fn source(&self) -> &TableRef {
        self.slicer.hint_table.as_ref().unwrap_or(&self.slicer.table)
    }

    fn rehome(&self, expr: &Expr) -> Expr {
        match &self.slicer.hint_table {
            Some(hint) => expr.replace_table(&self.slicer.table, hint),
            None => expr.clone(),
        }
    }

    /// The dimension with its terms moved onto the scanned table.
    fn rehomed_dimension(&self) -> Dimension {
        let mut dimension = self.dimension.clone();
        dimension.definition = self.rehome(&dimension.definition);
        if let DimensionKind::Unique {
            display_definition: Some(display),
        } = &mut dimension.kind
        {
            *display = self.rehome(display);
        }
        dimension
    }

    fn build(&self) -> SlicerResult<Query> {
        let database = self.slicer.database.as_ref();
        let trunc = |term: Expr, interval: DatetimeInterval| database.trunc_date(term, interval);
        let source = self.source();
        let dimension = self.rehomed_dimension();

        let filters: Vec<Filter> = self
            .filters
            .iter()
            .map(|f| f.with_definition(self.rehome(f.definition())))
            .collect();
        let joins: Vec<Join> = self
            .slicer
            .joins
            .iter()
            .map(|j| Join {
                criterion: self.rehome(&j.criterion),
                ..j.clone()
            })
            .collect();

        let mut terms: Vec<&Expr> = vec![&dimension.definition];
        terms.extend(dimension.display_definition());
        terms.extend(filters.iter().map(|f| f.definition()));
        let joins = resolve_joins(&joins, source, terms)?;

        let mut query = with_joins(Query::new().from(source.clone()), &joins)
            .select_grouped(dimension_select_items(&dimension, &trunc));
        for filter in &filters {
            query = match filter {
                Filter::Dimension(f) => query.filter(f.definition.clone()),
                Filter::Metric(f) => query.having(f.definition.clone()),
            };
        }

        let mut orders = vec![];
        if !self.force_include.is_empty() {
            orders.push(OrderByExpr::desc(
                dimension.definition.clone().in_list(self.force_include.clone()).paren(),
            ));
        }
        let sort_alias = if dimension.has_display() {
            dimension.display_alias()
        } else {
            dimension.alias()
        };
        orders.push(OrderByExpr::new(col(&sort_alias)));
        query = query.order_by(orders);

        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        Ok(query)
    }

    pub fn query(&self) -> SlicerResult<String> {
        let sql = self.build()?.to_sql(self.slicer.database.dialect());
        tracing::debug!(dimension = %self.dimension.key, table = %self.source(), "compiled choices query");
        Ok(sql)
    }

    pub fn queries(&self) -> SlicerResult<Vec<String>> {
        Ok(vec![self.query()?])
    }

    /// Run the query and pair each value with its label.
    pub fn fetch(&self) -> SlicerResult<Vec<(Value, String)>> {
        let frame = fetch_data(self.slicer.database.as_ref(), &self.query()?)?;
        let values = frame.column(&self.dimension.alias())?;
        let displays = if self.dimension.has_display() {
            Some(frame.column(&self.dimension.display_alias())?)
        } else {
            None
        };

        Ok(values
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let display = displays.as_ref().and_then(|d| d.get(row));
                let label = dimension_display(&self.dimension, &value, display);
                (value, label)
            })
            .collect())
    }
}
