//! Joins from the fact table to dimension tables.

use crate::sql::{Expr, JoinType, TableRef};

/// A join the slicer may add to a query when an element needs its table.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: TableRef,
    pub criterion: Expr,
    pub join_type: JoinType,
}

impl Join {
    /// An inner join.
    pub fn new(table: TableRef, criterion: Expr) -> Self {
        Self {
            table,
            criterion,
            join_type: JoinType::Inner,
        }
    }

    pub fn with_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    pub fn left(table: TableRef, criterion: Expr) -> Self {
        Self::new(table, criterion).with_type(JoinType::Left)
    }

    pub fn outer(table: TableRef, criterion: Expr) -> Self {
        Self::new(table, criterion).with_type(JoinType::Full)
    }
}
