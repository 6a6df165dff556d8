//! Reference containers.
//!
//! The base grouped query and one time-shifted copy per reference group
//! are wrapped as subqueries and full-outer-joined on their dimensions:
//!
//! ```text
//! SELECT COALESCE($base.ts, shift($dod.ts)) AS ts, $base.m, $dod.m AS m_dod, ...
//! FROM (base) AS $base
//! FULL OUTER JOIN (base with filters shifted) AS $dod
//!   ON $base.ts = shift($dod.ts) AND $base.party = $dod.party
//! ```
//!
//! References that shift the same dimension by the same amount share one
//! subquery; `delta` variants are computed in the container.

use crate::schema::{metric_alias, DateUnit, DatetimeInterval, Dimension, Filter, Reference};
use crate::sql::{coalesce, field, lit_float, lit_int, lit_null, nullif, Expr, ExprExt, FromItem, Query, SelectExpr};

use super::makers::{make_grouped_query, Grouping, QueryPlan};

const BASE_ALIAS: &str = "$base";

/// References sharing a dimension, unit and interval.
#[derive(Debug, Clone)]
pub struct ReferenceGroup {
    pub dimension: Dimension,
    pub unit: DateUnit,
    pub interval: i64,
    /// Subquery alias, `$` followed by the first reference's kind.
    pub alias: String,
    pub references: Vec<Reference>,
}

/// Group references by what they shift, keeping first-seen order.
pub fn group_references(references: &[Reference]) -> Vec<ReferenceGroup> {
    let mut groups: Vec<ReferenceGroup> = vec![];

    for reference in references {
        let key = reference.group_key();
        if let Some(group) = groups
            .iter_mut()
            .find(|g| (g.dimension.key.clone(), g.unit, g.interval) == key)
        {
            if !group.references.iter().any(|r| r.key() == reference.key()) {
                group.references.push(reference.clone());
            }
            continue;
        }

        let mut alias = format!("${}", reference.kind.key());
        if groups.iter().any(|g| g.alias == alias) {
            alias = format!("{}{}", alias, groups.len());
        }
        groups.push(ReferenceGroup {
            dimension: reference.dimension.clone(),
            unit: reference.unit(),
            interval: reference.interval(),
            alias,
            references: vec![reference.clone()],
        });
    }

    groups
}

/// Shift the reference dimension in every dimension filter, so the
/// subquery reads the previous period.
fn shift_filters(plan: &QueryPlan<'_>, filters: &[Filter], group: &ReferenceGroup) -> Vec<Filter> {
    let target = &group.dimension.definition;
    let shifted = plan
        .database
        .date_add(target.clone(), group.unit, group.interval);

    filters
        .iter()
        .map(|filter| match filter {
            Filter::Dimension(f) => filter.with_definition(f.definition.replace(target, &shifted)),
            Filter::Metric(_) => filter.clone(),
        })
        .collect()
}

/// The reference subquery for `group`.
fn make_reference_subquery(
    plan: &QueryPlan<'_>,
    groupings: &[Grouping],
    filters: &[Filter],
    group: &ReferenceGroup,
) -> Query {
    let database = plan.database;
    let definition = &group.dimension.definition;
    // Weekly buckets a year apart can start on different days; bucket in
    // the shifted year and shift back so the weeks line up with $base.
    let trunc = |term: Expr, interval: DatetimeInterval| {
        if interval == DatetimeInterval::Weekly && group.unit == DateUnit::Year && &term == definition {
            let shifted = database.date_add(term, DateUnit::Year, group.interval);
            database.date_add(
                database.trunc_date(shifted, interval),
                DateUnit::Year,
                -group.interval,
            )
        } else {
            database.trunc_date(term, interval)
        }
    };

    make_grouped_query(plan, groupings, &shift_filters(plan, filters, group), &trunc)
}

/// A reference subquery's column as seen in `$base` time.
fn aligned(plan: &QueryPlan<'_>, group: &ReferenceGroup, grouping: &Grouping, column: &str) -> Expr {
    let term = field(&group.alias, column);
    if grouping.dimension.key == group.dimension.key {
        plan.database.date_add(term, group.unit, group.interval)
    } else {
        term
    }
}

fn join_criterion(plan: &QueryPlan<'_>, groupings: &[Grouping], group: &ReferenceGroup) -> Option<Expr> {
    groupings
        .iter()
        .filter(|g| !g.is_totals)
        .map(|g| {
            let alias = g.dimension.alias();
            field(BASE_ALIAS, &alias).eq(aligned(plan, group, g, &alias))
        })
        .reduce(|acc, criterion| acc.and(criterion))
}

fn metric_terms(plan: &QueryPlan<'_>, groups: &[ReferenceGroup]) -> Vec<SelectExpr> {
    let mut items: Vec<SelectExpr> = plan
        .metrics
        .iter()
        .map(|m| field(BASE_ALIAS, &m.alias()).alias(&m.alias()))
        .collect();

    for group in groups {
        for reference in &group.references {
            for metric in plan.metrics {
                let base = field(BASE_ALIAS, &metric.alias());
                let shifted = field(&group.alias, &metric.alias());
                let term = if reference.delta_percent {
                    base.sub(shifted.clone())
                        .mul(lit_float(100.0))
                        .div(nullif(shifted, lit_int(0)))
                } else if reference.delta {
                    base.sub(shifted)
                } else {
                    shifted
                };
                items.push(term.alias(&metric_alias(&reference.metric_key(&metric.key))));
            }
        }
    }

    items
}

/// One UNION branch with its references: `$base` full-outer-joined with
/// each reference group's subquery.
pub fn make_reference_container(
    plan: &QueryPlan<'_>,
    groupings: &[Grouping],
    filters: &[Filter],
    groups: &[ReferenceGroup],
) -> Query {
    let database = plan.database;
    let trunc = |term: Expr, interval: DatetimeInterval| database.trunc_date(term, interval);

    // Totals placeholders live in the container only.
    let grouped: Vec<Grouping> = groupings.iter().filter(|g| !g.is_totals).cloned().collect();

    let base = make_grouped_query(plan, &grouped, filters, &trunc);
    let mut container = Query::new().from(FromItem::subquery(base, BASE_ALIAS));

    for group in groups {
        let subquery = FromItem::subquery(
            make_reference_subquery(plan, &grouped, filters, group),
            &group.alias,
        );
        container = match join_criterion(plan, groupings, group) {
            Some(on) => container.full_join(subquery, on),
            None => container.from(subquery),
        };
    }

    let mut items: Vec<SelectExpr> = vec![];
    for grouping in groupings {
        let dimension = &grouping.dimension;
        let mut columns = vec![dimension.alias()];
        if dimension.has_display() {
            columns.push(dimension.display_alias());
        }

        for column in columns {
            let term = if grouping.is_totals {
                lit_null()
            } else {
                let mut terms = vec![field(BASE_ALIAS, &column)];
                terms.extend(groups.iter().map(|g| reference_term(plan, g, grouping, &column)));
                coalesce(terms)
            };
            items.push(term.alias(&column));
        }
    }
    items.extend(metric_terms(plan, groups));

    container.select(items)
}

/// A container column read from a reference subquery. Display columns are
/// never shifted.
fn reference_term(plan: &QueryPlan<'_>, group: &ReferenceGroup, grouping: &Grouping, column: &str) -> Expr {
    if column == grouping.dimension.alias() {
        aligned(plan, group, grouping, column)
    } else {
        field(&group.alias, column)
    }
}
