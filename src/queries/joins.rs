//! Join resolution.
//!
//! Given the terms a query uses, find the joins that bring every mentioned
//! table into scope and order them so each ON clause only refers to tables
//! already introduced.
//!
//! ```text
//!   terms ──► required tables ──► joins + their criteria's tables ──► toposort
//!             {state}               state ON district.state_id = state.id
//!                                   district ON politician.district_id = district.id
//!                                                          ──► [district, state]
//! ```

use std::collections::{BTreeSet, HashMap, VecDeque};

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{JoinResolutionError, SlicerResult};
use crate::schema::Join;
use crate::sql::{Expr, TableRef};

/// Tables mentioned by `terms`, other than `base`.
pub fn find_required_tables_to_join<'a, I>(terms: I, base: &TableRef) -> BTreeSet<TableRef>
where
    I: IntoIterator<Item = &'a Expr>,
{
    terms
        .into_iter()
        .flat_map(|term| term.tables())
        .filter(|table| table != base)
        .collect()
}

/// The joins needed to reach `required` from `base`, in an order where
/// every join's criterion only mentions earlier tables.
///
/// Criteria may mention intermediate tables (`state` joined on
/// `district.state_id`), which are pulled in transitively.
pub fn find_joins_for_tables(
    joins: &[Join],
    base: &TableRef,
    required: BTreeSet<TableRef>,
) -> SlicerResult<Vec<Join>> {
    let by_table: HashMap<&TableRef, &Join> = joins.iter().map(|j| (&j.table, j)).collect();

    let mut queue: VecDeque<TableRef> = required.into_iter().collect();
    let mut selected: BTreeSet<TableRef> = BTreeSet::new();
    let mut dependencies: Vec<(TableRef, TableRef)> = vec![];

    while let Some(table) = queue.pop_front() {
        if !selected.insert(table.clone()) {
            continue;
        }
        let join = by_table
            .get(&table)
            .ok_or_else(|| JoinResolutionError::MissingTableJoin {
                table: table.to_string(),
            })?;

        for dependency in join.criterion.tables() {
            if &dependency == base || dependency == table {
                continue;
            }
            tracing::trace!(join = %table, requires = %dependency, "join dependency");
            dependencies.push((dependency.clone(), table.clone()));
            queue.push_back(dependency);
        }
    }

    // Nodes in declaration order keep independent joins in that order.
    let mut graph: DiGraph<&Join, ()> = DiGraph::new();
    let mut nodes: HashMap<&TableRef, NodeIndex> = HashMap::new();
    for join in joins.iter().filter(|j| selected.contains(&j.table)) {
        nodes.insert(&join.table, graph.add_node(join));
    }
    for (from, to) in &dependencies {
        graph.add_edge(nodes[from], nodes[to], ());
    }

    match toposort(&graph, None) {
        Ok(order) => {
            let ordered: Vec<Join> = order.into_iter().map(|idx| graph[idx].clone()).collect();
            tracing::debug!(
                joins = ?ordered.iter().map(|j| j.table.to_string()).collect::<Vec<_>>(),
                "resolved joins"
            );
            Ok(ordered)
        }
        Err(_) => {
            let mut tables: Vec<String> = tarjan_scc(&graph)
                .into_iter()
                .filter(|scc| scc.len() > 1)
                .flatten()
                .map(|idx| graph[idx].table.to_string())
                .collect();
            tables.sort();
            Err(JoinResolutionError::CircularJoins { tables }.into())
        }
    }
}

/// Joins required by `terms` over the fact table `base`.
pub fn resolve_joins<'a, I>(joins: &[Join], base: &TableRef, terms: I) -> SlicerResult<Vec<Join>>
where
    I: IntoIterator<Item = &'a Expr>,
{
    let required = find_required_tables_to_join(terms, base);
    find_joins_for_tables(joins, base, required)
}
