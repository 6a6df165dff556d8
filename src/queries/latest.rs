//! The latest-value builder: `MAX` of each dimension over the fact table.

use crate::error::SlicerResult;
use crate::frame::Value;
use crate::schema::{Dimension, Filter, Slicer};
use crate::sql::{max, Expr, ExprExt, Query};

use super::execution::fetch_data;
use super::joins::resolve_joins;
use super::makers::with_joins;

#[derive(Debug, Clone)]
#[must_use = "call query() or fetch() to run the request"]
pub struct LatestQueryBuilder<'a> {
    slicer: &'a Slicer,
    dimensions: Vec<Dimension>,
    filters: Vec<Filter>,
}

impl<'a> LatestQueryBuilder<'a> {
    pub fn new(slicer: &'a Slicer, dimensions: &[Dimension]) -> Self {
        Self {
            slicer,
            dimensions: dimensions.to_vec(),
            filters: vec![],
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    fn build(&self) -> SlicerResult<Query> {
        let mut terms: Vec<&Expr> = self.dimensions.iter().map(|d| &d.definition).collect();
        terms.extend(self.filters.iter().map(|f| f.definition()));
        let joins = resolve_joins(&self.slicer.joins, &self.slicer.table, terms)?;

        let mut query = with_joins(Query::new().from(self.slicer.table.clone()), &joins).select(
            self.dimensions
                .iter()
                .map(|d| max(d.definition.clone()).alias(&d.alias()))
                .collect::<Vec<_>>(),
        );
        for filter in &self.filters {
            query = match filter {
                Filter::Dimension(f) => query.filter(f.definition.clone()),
                Filter::Metric(f) => query.having(f.definition.clone()),
            };
        }
        Ok(query)
    }

    pub fn query(&self) -> SlicerResult<String> {
        Ok(self.build()?.to_sql(self.slicer.database.dialect()))
    }

    pub fn queries(&self) -> SlicerResult<Vec<String>> {
        Ok(vec![self.query()?])
    }

    /// Latest value of each dimension, keyed by dimension key.
    pub fn fetch(&self) -> SlicerResult<Vec<(String, Value)>> {
        let frame = fetch_data(self.slicer.database.as_ref(), &self.query()?)?;
        self.dimensions
            .iter()
            .map(|d| {
                let value = frame
                    .column(&d.alias())?
                    .into_iter()
                    .next()
                    .unwrap_or(Value::Null);
                Ok((d.key.clone(), value))
            })
            .collect()
    }
}
