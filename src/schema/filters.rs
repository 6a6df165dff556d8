//! Typed predicates over dimensions and metrics.
//!
//! Dimension filters become WHERE criteria and metric filters become HAVING
//! criteria. Both are built from the element they constrain:
//!
//! ```ignore
//! let f = timestamp.between(date(2018, 1, 1), date(2019, 1, 1));
//! let g = votes.gt(1000).excluding_totals();
//! ```

use crate::error::{SlicerResult, ValidationError};
use crate::sql::{lit_bool, lit_str, lower, Expr, ExprExt};

use super::elements::{Dimension, DimensionKind, Metric};

/// The shape of a filter's criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Comparator,
    Boolean,
    Contains,
    Excludes,
    Range,
    Pattern,
    AntiPattern,
}

/// A WHERE criterion on one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionFilter {
    pub dimension_key: String,
    pub kind: FilterKind,
    pub definition: Expr,
    pub apply_to_totals: bool,
}

/// A HAVING criterion on one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFilter {
    pub metric_key: String,
    pub kind: FilterKind,
    pub definition: Expr,
    pub apply_to_totals: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Dimension(DimensionFilter),
    Metric(MetricFilter),
}

impl Filter {
    pub fn definition(&self) -> &Expr {
        match self {
            Filter::Dimension(f) => &f.definition,
            Filter::Metric(f) => &f.definition,
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::Dimension(f) => f.kind,
            Filter::Metric(f) => f.kind,
        }
    }

    /// Whether the filter also constrains totals rows.
    pub fn apply_to_totals(&self) -> bool {
        match self {
            Filter::Dimension(f) => f.apply_to_totals,
            Filter::Metric(f) => f.apply_to_totals,
        }
    }

    /// Keep this filter out of every totals branch.
    pub fn excluding_totals(mut self) -> Self {
        match &mut self {
            Filter::Dimension(f) => f.apply_to_totals = false,
            Filter::Metric(f) => f.apply_to_totals = false,
        }
        self
    }

    /// A copy with its criterion replaced.
    pub fn with_definition(&self, definition: Expr) -> Self {
        let mut filter = self.clone();
        match &mut filter {
            Filter::Dimension(f) => f.definition = definition,
            Filter::Metric(f) => f.definition = definition,
        }
        filter
    }
}

// =============================================================================
// Dimension filters
// =============================================================================

impl Dimension {
    fn filter(&self, kind: FilterKind, definition: Expr) -> Filter {
        Filter::Dimension(DimensionFilter {
            dimension_key: self.key.clone(),
            kind,
            definition,
            apply_to_totals: true,
        })
    }

    /// Rows where the dimension is true (or false).
    pub fn is_(&self, value: bool) -> Filter {
        self.filter(
            FilterKind::Boolean,
            self.definition.clone().eq(lit_bool(value)),
        )
    }

    pub fn isin<V: Into<Expr>>(&self, values: Vec<V>) -> Filter {
        self.filter(
            FilterKind::Contains,
            self.definition
                .clone()
                .in_list(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn notin<V: Into<Expr>>(&self, values: Vec<V>) -> Filter {
        self.filter(
            FilterKind::Excludes,
            self.definition
                .clone()
                .not_in_list(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Inclusive range, typically on a datetime dimension.
    pub fn between(&self, low: impl Into<Expr>, high: impl Into<Expr>) -> Filter {
        self.filter(
            FilterKind::Range,
            self.definition.clone().between(low, high),
        )
    }

    /// Case-insensitive match against any of the SQL LIKE patterns.
    ///
    /// Unique dimensions match against their display term.
    pub fn like(&self, patterns: &[&str]) -> SlicerResult<Filter> {
        let criterion = self.pattern_criterion(patterns)?;
        Ok(self.filter(FilterKind::Pattern, criterion))
    }

    /// Rows matching none of the SQL LIKE patterns.
    pub fn not_like(&self, patterns: &[&str]) -> SlicerResult<Filter> {
        let criterion = self.pattern_criterion(patterns)?;
        Ok(self.filter(FilterKind::AntiPattern, criterion.not()))
    }

    fn pattern_criterion(&self, patterns: &[&str]) -> SlicerResult<Expr> {
        let target = match &self.kind {
            DimensionKind::Unique { .. } => self.display_definition().ok_or_else(|| {
                ValidationError::PatternFilterRequiresDisplay {
                    dimension: self.key.clone(),
                }
            })?,
            _ => &self.definition,
        };

        let mut criteria = patterns
            .iter()
            .map(|p| lower(target.clone()).like(lit_str(&p.to_lowercase())));
        let first = criteria.next().ok_or_else(|| {
            ValidationError::Unsupported(format!(
                "pattern filter on `{}` needs at least one pattern",
                self.key
            ))
        })?;
        Ok(criteria.fold(first, |acc, c| acc.or(c)))
    }
}

// =============================================================================
// Metric filters
// =============================================================================

impl Metric {
    fn filter(&self, definition: Expr) -> Filter {
        Filter::Metric(MetricFilter {
            metric_key: self.key.clone(),
            kind: FilterKind::Comparator,
            definition,
            apply_to_totals: true,
        })
    }

    pub fn gt(&self, value: impl Into<Expr>) -> Filter {
        self.filter(self.definition.clone().gt(value))
    }

    pub fn gte(&self, value: impl Into<Expr>) -> Filter {
        self.filter(self.definition.clone().gte(value))
    }

    pub fn lt(&self, value: impl Into<Expr>) -> Filter {
        self.filter(self.definition.clone().lt(value))
    }

    pub fn lte(&self, value: impl Into<Expr>) -> Filter {
        self.filter(self.definition.clone().lte(value))
    }

    pub fn equals(&self, value: impl Into<Expr>) -> Filter {
        self.filter(self.definition.clone().eq(value))
    }

    pub fn not_equals(&self, value: impl Into<Expr>) -> Filter {
        self.filter(self.definition.clone().ne(value))
    }
}
