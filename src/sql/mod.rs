//! SQL generation module.
//!
//! This module provides a type-safe SQL builder that generates multi-dialect SQL.
//! It includes:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    avg, coalesce, col, count, count_distinct, count_star, field, floor, func, interval,
    lit_bool, lit_date, lit_float, lit_int, lit_null, lit_str, lit_timestamp, lower, max, min, nullif,
    raw_sql, star, sum, table_col, BinaryOperator, DatePart, Expr, ExprExt, Literal, UnaryOperator,
};
pub use query::{
    FromItem, GroupByExpr, Join, JoinType, LimitOffset, OrderByExpr, Query, SelectExpr,
    SetOperation, SortDir, TableRef,
};
pub use token::{Token, TokenStream};
