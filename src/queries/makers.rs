//! Query makers: from selected elements to a [`Query`].
//!
//! ```text
//!   dimensions ─┬─ base branch ───────────────┐
//!               ├─ totals branch (party..)    ├─ UNION ALL ─► ORDER BY ─► LIMIT
//!               └─ totals branch (district..) ┘
//!
//!   each branch: grouped SELECT, or a reference container over
//!                $base FULL OUTER JOIN $dod FULL OUTER JOIN $yoy ...
//! ```

use crate::database::Database;
use crate::schema::{
    DatetimeInterval, Dimension, DimensionKind, Field, Filter, Join, Metric, Reference,
};
use crate::sql::{col, floor, lit_int, lit_null, Expr, ExprExt, OrderByExpr, Query, SelectExpr, SortDir, TableRef};

use super::references::{group_references, make_reference_container};

/// Truncates a datetime term to an interval.
pub type TruncDate<'a> = &'a dyn Fn(Expr, DatetimeInterval) -> Expr;

/// A dimension as it appears in one UNION branch.
#[derive(Debug, Clone)]
pub struct Grouping {
    pub dimension: Dimension,
    /// Selected as a NULL placeholder and left out of GROUP BY.
    pub is_totals: bool,
}

/// Everything needed to build the SQL for one data request.
#[derive(Debug, Clone, Copy)]
pub struct QueryPlan<'a> {
    pub database: &'a dyn Database,
    pub table: &'a TableRef,
    pub joins: &'a [Join],
    /// Rollup flags here are the flags as the SQL sees them, share-over
    /// dimensions included.
    pub dimensions: &'a [Dimension],
    pub metrics: &'a [Metric],
    pub filters: &'a [Filter],
    pub references: &'a [Reference],
}

// =============================================================================
// Terms
// =============================================================================

/// The GROUP BY term of a dimension.
pub fn dimension_term(dimension: &Dimension, trunc: TruncDate<'_>) -> Expr {
    match &dimension.kind {
        DimensionKind::Datetime { interval } => trunc(dimension.definition.clone(), *interval),
        DimensionKind::Continuous { interval } if !interval.is_identity() => {
            let shifted = dimension.definition.clone().sub(lit_int(interval.offset));
            floor(shifted.div(lit_int(interval.size)))
                .mul(lit_int(interval.size))
                .add(lit_int(interval.offset))
        }
        _ => dimension.definition.clone(),
    }
}

/// SELECT items of a dimension: the value and, if any, its display term.
pub fn dimension_select_items(dimension: &Dimension, trunc: TruncDate<'_>) -> Vec<SelectExpr> {
    let mut items = vec![dimension_term(dimension, trunc).alias(&dimension.alias())];
    if let Some(display) = dimension.display_definition() {
        items.push(display.clone().alias(&dimension.display_alias()));
    }
    items
}

fn totals_placeholders(dimension: &Dimension) -> Vec<SelectExpr> {
    let mut items = vec![lit_null().alias(&dimension.alias())];
    if dimension.has_display() {
        items.push(lit_null().alias(&dimension.display_alias()));
    }
    items
}

/// Add the joins, in order, to a query reading from the fact table.
pub fn with_joins(mut query: Query, joins: &[Join]) -> Query {
    for join in joins {
        query = query.join(join.join_type, join.table.clone(), join.criterion.clone());
    }
    query
}

// =============================================================================
// Grouped query
// =============================================================================

/// One grouped SELECT over the fact table.
pub fn make_grouped_query(
    plan: &QueryPlan<'_>,
    groupings: &[Grouping],
    filters: &[Filter],
    trunc: TruncDate<'_>,
) -> Query {
    let mut query = with_joins(Query::new().from(plan.table.clone()), plan.joins);

    for grouping in groupings {
        query = if grouping.is_totals {
            query.add_select(totals_placeholders(&grouping.dimension))
        } else {
            query.select_grouped(dimension_select_items(&grouping.dimension, trunc))
        };
    }

    query = query.add_select(
        plan.metrics
            .iter()
            .map(|m| m.definition.clone().alias(&m.alias()))
            .collect::<Vec<_>>(),
    );

    for filter in filters {
        query = match filter {
            Filter::Dimension(f) => query.filter(f.definition.clone()),
            Filter::Metric(f) => query.having(f.definition.clone()),
        };
    }

    query
}

// =============================================================================
// Totals
// =============================================================================

/// Groupings for the base branch followed by one branch per rolled-up
/// dimension, in dimension order.
///
/// Rolling up a dimension also totals every dimension after it, so the
/// branch for position `i` replaces dimensions `i..` with placeholders.
pub fn totals_branches(dimensions: &[Dimension]) -> Vec<Vec<Grouping>> {
    let branch = |from: usize| -> Vec<Grouping> {
        dimensions
            .iter()
            .enumerate()
            .map(|(i, d)| Grouping {
                dimension: d.clone(),
                is_totals: i >= from,
            })
            .collect()
    };

    let mut branches = vec![branch(dimensions.len())];
    branches.extend(
        dimensions
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_rollup)
            .map(|(i, _)| branch(i)),
    );
    branches
}

/// The complete, unordered query for a request: every totals branch,
/// each wrapped in a reference container when references are present.
pub fn make_slicer_query(plan: &QueryPlan<'_>) -> Query {
    let database = plan.database;
    let trunc = |term: Expr, interval: DatetimeInterval| database.trunc_date(term, interval);
    let groups = group_references(plan.references);

    let mut branches = totals_branches(plan.dimensions).into_iter().enumerate().map(|(i, groupings)| {
        // Filters excluded from totals only apply to the base branch.
        let filters: Vec<Filter> = plan
            .filters
            .iter()
            .filter(|f| i == 0 || f.apply_to_totals())
            .cloned()
            .collect();

        if groups.is_empty() {
            make_grouped_query(plan, &groupings, &filters, &trunc)
        } else {
            make_reference_container(plan, &groupings, &filters, &groups)
        }
    });

    let first = branches.next().unwrap_or_default();
    branches.fold(first, |union, branch| union.union_all(branch))
}

// =============================================================================
// Ordering
// =============================================================================

/// ORDER BY for a request.
///
/// Without explicit orders, results sort by each dimension's display
/// column, or its value when it has no display.
pub fn make_orders(dimensions: &[Dimension], orders: &[(Field, SortDir)]) -> Vec<OrderByExpr> {
    if orders.is_empty() {
        return dimensions
            .iter()
            .map(|d| {
                let alias = if d.has_display() {
                    d.display_alias()
                } else {
                    d.alias()
                };
                OrderByExpr::new(col(&alias))
            })
            .collect();
    }

    orders
        .iter()
        .map(|(field, dir)| match dir {
            SortDir::Asc => OrderByExpr::asc(col(&field.alias())),
            SortDir::Desc => OrderByExpr::desc(col(&field.alias())),
        })
        .collect()
}
