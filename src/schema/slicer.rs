//! The slicer: a fact table, its joins, and the elements callers select.

use std::collections::HashSet;
use std::sync::Arc;

use crate::database::Database;
use crate::error::{JoinResolutionError, SlicerResult, ValidationError};
use crate::queries::{DataQueryBuilder, DimensionChoicesBuilder, LatestQueryBuilder};
use crate::sql::{Expr, TableRef};

use super::elements::{Dimension, Metric};
use super::joins::Join;

/// Declarative description of one star schema.
///
/// A slicer is immutable once built. Requests borrow it:
///
/// ```ignore
/// let slicer = Slicer::builder(db, politician)
///     .join(Join::new(district.clone(), politician.col("district_id").eq(district.col("id"))))
///     .dimension(Dimension::datetime("timestamp", politician.col("timestamp")))
///     .metric(Metric::new("votes", sum(politician.col("votes"))))
///     .build()?;
///
/// let sql = slicer.data().widget(widget).dimension(ts).query()?;
/// ```
#[derive(Debug, Clone)]
pub struct Slicer {
    pub database: Arc<dyn Database>,
    pub table: TableRef,
    pub joins: Vec<Join>,
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    /// Narrow table listing dimension values, scanned for choices.
    pub hint_table: Option<TableRef>,
}

impl Slicer {
    pub fn builder(database: Arc<dyn Database>, table: TableRef) -> SlicerBuilder {
        SlicerBuilder {
            slicer: Slicer {
                database,
                table,
                joins: vec![],
                dimensions: vec![],
                metrics: vec![],
                hint_table: None,
            },
        }
    }

    pub fn dimension(&self, key: &str) -> SlicerResult<&Dimension> {
        self.dimensions
            .iter()
            .find(|d| d.key == key)
            .ok_or_else(|| unknown("dimension", key))
    }

    pub fn metric(&self, key: &str) -> SlicerResult<&Metric> {
        self.metrics
            .iter()
            .find(|m| m.key == key)
            .ok_or_else(|| unknown("metric", key))
    }

    pub fn join_for(&self, table: &TableRef) -> Option<&Join> {
        self.joins.iter().find(|j| &j.table == table)
    }

    /// Start a widget request.
    pub fn data(&self) -> DataQueryBuilder<'_> {
        DataQueryBuilder::new(self)
    }

    /// Start a request for the values `dimension` takes.
    pub fn choices(&self, dimension: &Dimension) -> DimensionChoicesBuilder<'_> {
        DimensionChoicesBuilder::new(self, dimension)
    }

    /// Start a request for the latest value of each dimension.
    pub fn latest(&self, dimensions: &[Dimension]) -> LatestQueryBuilder<'_> {
        LatestQueryBuilder::new(self, dimensions)
    }
}

fn unknown(kind: &'static str, key: &str) -> crate::error::SlicerError {
    ValidationError::UnknownElement {
        kind,
        key: key.to_string(),
    }
    .into()
}

/// Accumulates a [`Slicer`] and validates it in [`SlicerBuilder::build`].
#[must_use = "call build() to validate the slicer"]
pub struct SlicerBuilder {
    slicer: Slicer,
}

impl SlicerBuilder {
    pub fn join(mut self, join: Join) -> Self {
        self.slicer.joins.push(join);
        self
    }

    pub fn dimension(mut self, dimension: Dimension) -> Self {
        self.slicer.dimensions.push(dimension);
        self
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.slicer.metrics.push(metric);
        self
    }

    pub fn hint_table(mut self, table: TableRef) -> Self {
        self.slicer.hint_table = Some(table);
        self
    }

    /// Check the schema and return the slicer.
    ///
    /// Join tables must be unique, element keys must be unique across
    /// metrics and dimensions, and every definition may only mention the
    /// fact table or a joined table.
    pub fn build(self) -> SlicerResult<Slicer> {
        let slicer = self.slicer;

        let mut join_tables = HashSet::new();
        for join in &slicer.joins {
            if !join_tables.insert(&join.table) {
                return Err(ValidationError::DuplicateJoin {
                    table: join.table.to_string(),
                }
                .into());
            }
        }

        let mut keys = HashSet::new();
        let elements = slicer
            .metrics
            .iter()
            .map(|m| ("metric", &m.key))
            .chain(slicer.dimensions.iter().map(|d| ("dimension", &d.key)));
        for (kind, key) in elements {
            if !keys.insert(key) {
                return Err(ValidationError::DuplicateKey {
                    kind,
                    key: key.clone(),
                }
                .into());
            }
        }

        let mut known = join_tables;
        known.insert(&slicer.table);

        let mut definitions: Vec<&Expr> = vec![];
        definitions.extend(slicer.metrics.iter().map(|m| &m.definition));
        for dimension in &slicer.dimensions {
            definitions.push(&dimension.definition);
            definitions.extend(dimension.display_definition());
        }
        definitions.extend(slicer.joins.iter().map(|j| &j.criterion));

        for definition in definitions {
            if let Some(missing) = definition.tables().iter().find(|t| !known.contains(t)) {
                return Err(JoinResolutionError::MissingTableJoin {
                    table: missing.to_string(),
                }
                .into());
            }
        }

        tracing::debug!(
            table = %slicer.table,
            joins = slicer.joins.len(),
            dimensions = slicer.dimensions.len(),
            metrics = slicer.metrics.len(),
            "built slicer"
        );

        Ok(slicer)
    }
}
