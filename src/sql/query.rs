//! Query builder - construct SQL queries with a fluent API.
//!
//! A [`Query`] reads from one or more [`FromItem`]s (tables or aliased
//! subqueries), so the same type models the flat slicer query, the
//! reference container that full-outer-joins shifted copies of it, and the
//! UNION ALL of totals branches.

use super::dialect::{Dialect, SqlDialect};
use super::expr::{Expr, ExprExt};
use super::token::{Token, TokenStream};

// =============================================================================
// Select Expression (column with optional alias)
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    fn to_tokens_for_dialect(&self, expr: &Expr, dialect: Dialect) -> TokenStream {
        let mut ts = expr.to_tokens_for_dialect(dialect);
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

// =============================================================================
// Table Reference
// =============================================================================

/// A table reference with optional schema and alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            schema: None,
            table: table.into(),
            alias: None,
        }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// The name columns of this table are qualified with.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    /// A column of this table.
    pub fn col(&self, column: &str) -> Expr {
        super::expr::table_col(self, column)
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.table.clone(),
        });
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.table),
            None => write!(f, "{}", self.table),
        }
    }
}

// =============================================================================
// FROM items
// =============================================================================

/// Something a query can read rows from.
#[derive(Debug, Clone, PartialEq)]
pub enum FromItem {
    Table(TableRef),
    Subquery { query: Box<Query>, alias: String },
}

impl FromItem {
    /// Wrap a query as an aliased subquery.
    pub fn subquery(query: Query, alias: &str) -> Self {
        FromItem::Subquery {
            query: Box::new(query),
            alias: alias.into(),
        }
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        match self {
            FromItem::Table(table) => table.to_tokens(),
            FromItem::Subquery { query, alias } => {
                let mut ts = TokenStream::new();
                ts.lparen()
                    .newline()
                    .append(&query.to_tokens_for_dialect(dialect))
                    .newline()
                    .rparen()
                    .space()
                    .push(Token::As)
                    .space()
                    .push(Token::Ident(alias.clone()));
                ts
            }
        }
    }
}

impl From<TableRef> for FromItem {
    fn from(table: TableRef) -> Self {
        FromItem::Table(table)
    }
}

// =============================================================================
// Joins
// =============================================================================

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    Inner,
    #[default]
    Left,
    Right,
    Full,
    Cross,
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub item: FromItem,
    pub on: Option<Expr>,
}

impl Join {
    fn to_tokens_for_dialect(&self, on: Option<&Expr>, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self.join_type {
            JoinType::Inner => ts.push(Token::Inner),
            JoinType::Left => ts.push(Token::Left),
            JoinType::Right => ts.push(Token::Right),
            JoinType::Full if dialect.supports_full_outer_join() => {
                ts.push(Token::Full).space().push(Token::Outer)
            }
            JoinType::Full => ts.push(Token::Left),
            JoinType::Cross => ts.push(Token::Cross),
        };

        ts.space().push(Token::Join).space();
        ts.append(&self.item.to_tokens_for_dialect(dialect));

        if let Some(on) = on {
            ts.space().push(Token::On).space();
            ts.append(&on.to_tokens_for_dialect(dialect));
        }

        ts
    }
}

// =============================================================================
// GROUP BY
// =============================================================================

/// A GROUP BY key, remembering the SELECT alias it was projected under.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

// =============================================================================
// ORDER BY
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// An ORDER BY expression.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub expr: Expr,
    pub dir: Option<SortDir>,
}

impl OrderByExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, dir: None }
    }

    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            dir: Some(SortDir::Asc),
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            dir: Some(SortDir::Desc),
        }
    }

    fn to_tokens_for_dialect(&self, expr: &Expr, dialect: Dialect) -> TokenStream {
        let mut ts = expr.to_tokens_for_dialect(dialect);

        if let Some(dir) = &self.dir {
            ts.space().push(match dir {
                SortDir::Asc => Token::Asc,
                SortDir::Desc => Token::Desc,
            });
        }

        ts
    }
}

// =============================================================================
// LIMIT / OFFSET
// =============================================================================

/// LIMIT and OFFSET clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitOffset {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl LimitOffset {
    /// Convert to token stream using dialect-specific pagination.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        dialect.emit_limit_offset(self.limit, self.offset)
    }
}

// =============================================================================
// Set Operations
// =============================================================================

/// `left UNION [ALL] right`.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "SetOperation has no effect until converted to SQL with to_sql()"]
pub struct SetOperation {
    pub left: Box<Query>,
    pub all: bool,
    pub right: Box<Query>,
}

impl SetOperation {
    /// Create a UNION operation.
    pub fn union(left: Query, right: Query) -> Self {
        Self {
            left: Box::new(left),
            all: false,
            right: Box::new(right),
        }
    }

    /// Create a UNION ALL operation.
    pub fn union_all(left: Query, right: Query) -> Self {
        Self {
            left: Box::new(left),
            all: true,
            right: Box::new(right),
        }
    }

    /// Convert to tokens for a specific dialect.
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        if self.left.is_bare_set_operation() {
            // Nested set operation - emit directly
            ts.append(&self.left.to_tokens_for_dialect(dialect));
        } else {
            emit_set_operand(&mut ts, &self.left, dialect);
        }

        ts.newline().push(Token::Union);
        if self.all {
            ts.space().push(Token::All);
        }
        ts.newline();

        emit_set_operand(&mut ts, &self.right, dialect);

        ts
    }

    /// Generate SQL string for a specific dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens_for_dialect(dialect).serialize(dialect)
    }
}

fn emit_set_operand(ts: &mut TokenStream, query: &Query, dialect: Dialect) {
    if dialect.parenthesize_set_operands() {
        ts.lparen();
        ts.append(&query.to_tokens_for_dialect(dialect));
        ts.rparen();
    } else {
        ts.append(&query.to_tokens_for_dialect(dialect));
    }
}

// =============================================================================
// Query Builder
// =============================================================================

/// A SELECT query.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "Query has no effect until converted to SQL with to_sql() or to_tokens()"]
pub struct Query {
    pub select: Vec<SelectExpr>,
    pub distinct: bool,
    pub from: Vec<FromItem>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<GroupByExpr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit_offset: Option<LimitOffset>,
    /// When set, this query is the set operation; only ORDER BY and
    /// LIMIT/OFFSET of this query apply on top of it.
    pub set_op: Option<Box<SetOperation>>,
}

impl Query {
    /// Create a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SELECT list.
    pub fn select(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.select = exprs.into_iter().map(|e| e.into()).collect();
        self
    }

    /// Append to the SELECT list.
    pub fn add_select(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.select.extend(exprs.into_iter().map(|e| e.into()));
        self
    }

    /// Append SELECT items that are also grouping keys.
    pub fn select_grouped(mut self, exprs: Vec<SelectExpr>) -> Self {
        for item in exprs {
            self.group_by.push(GroupByExpr {
                expr: item.expr.clone(),
                alias: item.alias.clone(),
            });
            self.select.push(item);
        }
        self
    }

    /// Add DISTINCT.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a FROM item. Multiple items are comma-joined.
    pub fn from(mut self, item: impl Into<FromItem>) -> Self {
        self.from.push(item.into());
        self
    }

    /// Add a JOIN.
    pub fn join(mut self, join_type: JoinType, item: impl Into<FromItem>, on: Expr) -> Self {
        self.joins.push(Join {
            join_type,
            item: item.into(),
            on: Some(on),
        });
        self
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, item: impl Into<FromItem>, on: Expr) -> Self {
        self.join(JoinType::Left, item, on)
    }

    /// Add a FULL OUTER JOIN.
    pub fn full_join(self, item: impl Into<FromItem>, on: Expr) -> Self {
        self.join(JoinType::Full, item, on)
    }

    /// Add a WHERE condition (ANDed with existing conditions).
    pub fn filter(mut self, condition: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Set the GROUP BY clause.
    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.group_by = exprs
            .into_iter()
            .map(|expr| GroupByExpr { expr, alias: None })
            .collect();
        self
    }

    /// Add a HAVING condition (ANDed with existing conditions).
    pub fn having(mut self, condition: Expr) -> Self {
        self.having = Some(match self.having {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Set the ORDER BY clause.
    pub fn order_by(mut self, exprs: Vec<OrderByExpr>) -> Self {
        self.order_by = exprs;
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_offset.get_or_insert_with(Default::default).limit = Some(limit);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, offset: u64) -> Self {
        self.limit_offset.get_or_insert_with(Default::default).offset = Some(offset);
        self
    }

    // =========================================================================
    // Set Operations
    // =========================================================================

    /// Combine with another query using UNION ALL.
    ///
    /// The result is itself a query, so ORDER BY and LIMIT may be set on it.
    pub fn union_all(self, other: Query) -> Query {
        Query {
            set_op: Some(Box::new(SetOperation::union_all(self, other))),
            ..Default::default()
        }
    }

    /// Combine with another query using UNION.
    pub fn union(self, other: Query) -> Query {
        Query {
            set_op: Some(Box::new(SetOperation::union(self, other))),
            ..Default::default()
        }
    }

    fn is_bare_set_operation(&self) -> bool {
        self.set_op.is_some() && self.order_by.is_empty() && self.limit_offset.is_none()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Whether column references must carry their table qualifier.
    ///
    /// With a single source every column is unambiguous.
    fn is_multi_source(&self) -> bool {
        self.from.len() + self.joins.len() > 1
    }

    fn scoped(&self, expr: &Expr) -> Expr {
        if self.is_multi_source() {
            expr.clone()
        } else {
            expr.unqualified()
        }
    }

    /// Convert to token stream (default dialect).
    pub fn to_tokens(&self) -> TokenStream {
        self.to_tokens_for_dialect(Dialect::default())
    }

    /// Convert to token stream for a specific dialect.
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        if let Some(ref set_op) = self.set_op {
            ts.append(&set_op.to_tokens_for_dialect(dialect));
            self.emit_order_and_limit(&mut ts, dialect);
            return ts;
        }

        // SELECT
        ts.push(Token::Select);
        if self.distinct {
            ts.space().push(Token::Distinct);
        }

        // Columns
        for (i, select_expr) in self.select.iter().enumerate() {
            if i == 0 {
                ts.newline().indent(1);
            } else {
                ts.comma().newline().indent(1);
            }
            let expr = self.scoped(&select_expr.expr);
            ts.append(&select_expr.to_tokens_for_dialect(&expr, dialect));
        }

        // FROM
        for (i, item) in self.from.iter().enumerate() {
            if i == 0 {
                ts.newline().push(Token::From).space();
            } else {
                ts.comma();
            }
            ts.append(&item.to_tokens_for_dialect(dialect));
        }

        // JOINs
        for join in &self.joins {
            ts.newline();
            let on = join.on.as_ref().map(|on| self.scoped(on));
            ts.append(&join.to_tokens_for_dialect(on.as_ref(), dialect));
        }

        // WHERE
        if let Some(where_clause) = &self.where_clause {
            ts.newline().push(Token::Where).space();
            ts.append(&self.scoped(where_clause).to_tokens_for_dialect(dialect));
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            ts.newline().push(Token::GroupBy).space();
            for (i, item) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                match &item.alias {
                    Some(alias) if dialect.supports_group_by_alias() => {
                        ts.push(Token::Ident(alias.clone()));
                    }
                    _ => {
                        ts.append(&self.scoped(&item.expr).to_tokens_for_dialect(dialect));
                    }
                }
            }
        }

        // HAVING
        if let Some(having) = &self.having {
            ts.newline().push(Token::Having).space();
            ts.append(&self.scoped(having).to_tokens_for_dialect(dialect));
        }

        self.emit_order_and_limit(&mut ts, dialect);

        ts
    }

    fn emit_order_and_limit(&self, ts: &mut TokenStream, dialect: Dialect) {
        if !self.order_by.is_empty() {
            ts.newline().push(Token::OrderBy).space();
            for (i, order_expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                let expr = self.scoped(&order_expr.expr);
                ts.append(&order_expr.to_tokens_for_dialect(&expr, dialect));
            }
        }

        if let Some(lo) = &self.limit_offset {
            let pagination = lo.to_tokens(dialect);
            if !pagination.is_empty() {
                ts.newline();
                ts.append(&pagination);
            }
        }
    }

    /// Generate SQL string for a specific dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens_for_dialect(dialect).serialize(dialect)
    }
}

impl std::fmt::Display for Query {
    /// Formats the query using the default dialect (Vertica).
    ///
    /// For dialect-specific SQL, use [`Query::to_sql`] instead.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql(Dialect::default()))
    }
}

// =============================================================================
// Tests
// =============================================================================
