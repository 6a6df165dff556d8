//! Expression AST - the core of SQL expression building.
//!
//! This module provides a strongly-typed AST for SQL expressions
//! with exhaustive pattern matching enforced by the compiler.
//!
//! Besides rendering, expressions answer two structural questions the
//! query makers depend on: which tables a term mentions ([`Expr::tables`])
//! and how to rewrite matching sub-terms ([`Expr::transform`]).

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};

use super::dialect::Dialect;
use super::query::{Query, SelectExpr, TableRef};
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<TableRef>,
        column: String,
    },

    /// Literal values
    Literal(Literal),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation: op expr
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },

    /// Function call: name(args...)
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// CASE WHEN... THEN... ELSE... END
    Case {
        operand: Option<Box<Expr>>,
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Box<Expr>>,
    },

    /// Subquery: (SELECT ...)
    Subquery(Box<Query>),

    /// IN: expr IN (values...)
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },

    /// BETWEEN: expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// Wildcard: * or table.*
    Star { table: Option<TableRef> },

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// Interval literal: INTERVAL value UNIT
    Interval { value: Box<Expr>, unit: DatePart },

    /// Raw SQL fragment passed directly to output without escaping.
    ///
    /// Database adapters use this for fixed date-part keywords such as
    /// `INTERVAL 1 DAY`; never build one from caller input.
    Raw(String),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    // String
    Like,
}

impl BinaryOperator {
    fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Gt
            | BinaryOperator::Lte
            | BinaryOperator::Gte
            | BinaryOperator::Like => 3,
            BinaryOperator::Plus | BinaryOperator::Minus => 4,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => 5,
        }
    }

    fn is_associative(self) -> bool {
        matches!(
            self,
            BinaryOperator::And | BinaryOperator::Or | BinaryOperator::Plus | BinaryOperator::Mul
        )
    }
}

/// Units an INTERVAL can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl DatePart {
    pub fn keyword(self) -> &'static str {
        match self {
            DatePart::Hour => "HOUR",
            DatePart::Day => "DAY",
            DatePart::Week => "WEEK",
            DatePart::Month => "MONTH",
            DatePart::Quarter => "QUARTER",
            DatePart::Year => "YEAR",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
}

/// Binding strength of an expression when it appears as an operand.
fn binding(expr: &Expr) -> u8 {
    match expr {
        Expr::BinaryOp { op, .. } => op.precedence(),
        Expr::In { .. } | Expr::Between { .. } | Expr::IsNull { .. } => 3,
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            ..
        } => 2,
        _ => 6,
    }
}

// =============================================================================
// Expression to Tokens
// =============================================================================

impl Expr {
    /// Convert this expression to a token stream (default dialect).
    pub fn to_tokens(&self) -> TokenStream {
        self.to_tokens_for_dialect(Dialect::default())
    }

    /// Convert this expression to a token stream for a specific dialect.
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.qualifier().to_string()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::Float(f) => Token::LitFloat(*f),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Bool(b) => Token::LitBool(*b),
                    Literal::Date(d) => Token::LitString(d.format("%Y-%m-%d").to_string()),
                    Literal::Timestamp(t) => {
                        Token::LitString(t.format("%Y-%m-%d %H:%M:%S").to_string())
                    }
                    Literal::Null => Token::LitNull,
                });
            }

            Expr::BinaryOp { left, op, right } => {
                let prec = op.precedence();
                let right_min = if op.is_associative() { prec } else { prec + 1 };
                emit_operand(&mut ts, left, prec, dialect);
                ts.space();
                ts.push(binary_op_to_token(*op));
                ts.space();
                emit_operand(&mut ts, right, right_min, dialect);
            }

            Expr::UnaryOp { op, expr } => match op {
                UnaryOperator::Not => {
                    ts.push(Token::Not).space();
                    emit_operand(&mut ts, expr, 3, dialect);
                }
                UnaryOperator::Minus => {
                    ts.push(Token::Minus);
                    emit_operand(&mut ts, expr, 6, dialect);
                }
            },

            Expr::Function {
                name,
                args,
                distinct,
            } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma();
                    }
                    ts.append(&arg.to_tokens_for_dialect(dialect));
                }
                ts.rparen();
            }

            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                ts.push(Token::Case);
                if let Some(op) = operand {
                    ts.space().append(&op.to_tokens_for_dialect(dialect));
                }
                for (when, then) in when_clauses {
                    ts.space().push(Token::When).space();
                    ts.append(&when.to_tokens_for_dialect(dialect));
                    ts.space().push(Token::Then).space();
                    ts.append(&then.to_tokens_for_dialect(dialect));
                }
                if let Some(else_expr) = else_clause {
                    ts.space().push(Token::Else).space();
                    ts.append(&else_expr.to_tokens_for_dialect(dialect));
                }
                ts.space().push(Token::End);
            }

            Expr::Subquery(query) => {
                ts.lparen();
                ts.append(&query.to_tokens_for_dialect(dialect));
                ts.rparen();
            }

            Expr::In {
                expr,
                values,
                negated,
            } => {
                // Empty IN list: "x IN ()" is invalid SQL
                // "x IN ()" should be FALSE, "x NOT IN ()" should be TRUE
                if values.is_empty() {
                    ts.push(if *negated { Token::True } else { Token::False });
                } else {
                    emit_operand(&mut ts, expr, 4, dialect);
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::In).space().lparen();
                    for (i, val) in values.iter().enumerate() {
                        if i > 0 {
                            ts.comma();
                        }
                        ts.append(&val.to_tokens_for_dialect(dialect));
                    }
                    ts.rparen();
                }
            }

            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                emit_operand(&mut ts, expr, 4, dialect);
                if *negated {
                    ts.space().push(Token::Not);
                }
                ts.space().push(Token::Between).space();
                emit_operand(&mut ts, low, 4, dialect);
                ts.space().push(Token::And).space();
                emit_operand(&mut ts, high, 4, dialect);
            }

            Expr::IsNull { expr, negated } => {
                emit_operand(&mut ts, expr, 4, dialect);
                ts.space();
                ts.push(if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                });
            }

            Expr::Star { table } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.qualifier().to_string()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Star);
            }

            Expr::Paren(inner) => {
                ts.lparen();
                ts.append(&inner.to_tokens_for_dialect(dialect));
                ts.rparen();
            }

            Expr::Interval { value, unit } => {
                ts.push(Token::Interval).space();
                emit_operand(&mut ts, value, 6, dialect);
                ts.space().push(Token::Raw(unit.keyword().to_string()));
            }

            Expr::Raw(sql) => {
                ts.push(Token::Raw(sql.clone()));
            }
        }

        ts
    }

    /// Render this expression to SQL text for a dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens_for_dialect(dialect).serialize(dialect)
    }
}

fn emit_operand(ts: &mut TokenStream, operand: &Expr, min_binding: u8, dialect: Dialect) {
    if binding(operand) < min_binding {
        ts.lparen();
        ts.append(&operand.to_tokens_for_dialect(dialect));
        ts.rparen();
    } else {
        ts.append(&operand.to_tokens_for_dialect(dialect));
    }
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::Plus => Token::Plus,
        BinaryOperator::Minus => Token::Minus,
        BinaryOperator::Mul => Token::Mul,
        BinaryOperator::Div => Token::Div,
        BinaryOperator::Mod => Token::Mod,
        BinaryOperator::Like => Token::Like,
    }
}

// =============================================================================
// Structural Visitors
// =============================================================================

impl Expr {
    /// The set of tables this expression references.
    ///
    /// Subqueries are opaque: their tables belong to their own scope.
    pub fn tables(&self) -> BTreeSet<TableRef> {
        let mut tables = BTreeSet::new();
        self.collect_tables(&mut tables);
        tables
    }

    fn collect_tables(&self, out: &mut BTreeSet<TableRef>) {
        match self {
            Expr::Column { table, .. } | Expr::Star { table } => {
                if let Some(t) = table {
                    out.insert(t.clone());
                }
            }
            Expr::BinaryOp { left, right, .. } => {
                left.collect_tables(out);
                right.collect_tables(out);
            }
            Expr::UnaryOp { expr, .. }
            | Expr::Paren(expr)
            | Expr::IsNull { expr, .. }
            | Expr::Interval { value: expr, .. } => expr.collect_tables(out),
            Expr::Function { args, .. } => {
                for arg in args {
                    arg.collect_tables(out);
                }
            }
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                if let Some(op) = operand {
                    op.collect_tables(out);
                }
                for (when, then) in when_clauses {
                    when.collect_tables(out);
                    then.collect_tables(out);
                }
                if let Some(e) = else_clause {
                    e.collect_tables(out);
                }
            }
            Expr::In { expr, values, .. } => {
                expr.collect_tables(out);
                for v in values {
                    v.collect_tables(out);
                }
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                expr.collect_tables(out);
                low.collect_tables(out);
                high.collect_tables(out);
            }
            Expr::Literal(_) | Expr::Subquery(_) | Expr::Raw(_) => {}
        }
    }

    /// Rewrite this expression top-down.
    ///
    /// `f` is offered every node before its children. When it returns a
    /// replacement, that replacement is used as-is and the original node's
    /// children are not visited.
    pub fn transform<F>(&self, f: &F) -> Expr
    where
        F: Fn(&Expr) -> Option<Expr>,
    {
        if let Some(replacement) = f(self) {
            return replacement;
        }

        match self {
            Expr::BinaryOp { left, op, right } => Expr::BinaryOp {
                left: Box::new(left.transform(f)),
                op: *op,
                right: Box::new(right.transform(f)),
            },
            Expr::UnaryOp { op, expr } => Expr::UnaryOp {
                op: *op,
                expr: Box::new(expr.transform(f)),
            },
            Expr::Function {
                name,
                args,
                distinct,
            } => Expr::Function {
                name: name.clone(),
                args: args.iter().map(|a| a.transform(f)).collect(),
                distinct: *distinct,
            },
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => Expr::Case {
                operand: operand.as_ref().map(|o| Box::new(o.transform(f))),
                when_clauses: when_clauses
                    .iter()
                    .map(|(w, t)| (w.transform(f), t.transform(f)))
                    .collect(),
                else_clause: else_clause.as_ref().map(|e| Box::new(e.transform(f))),
            },
            Expr::In {
                expr,
                values,
                negated,
            } => Expr::In {
                expr: Box::new(expr.transform(f)),
                values: values.iter().map(|v| v.transform(f)).collect(),
                negated: *negated,
            },
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => Expr::Between {
                expr: Box::new(expr.transform(f)),
                low: Box::new(low.transform(f)),
                high: Box::new(high.transform(f)),
                negated: *negated,
            },
            Expr::IsNull { expr, negated } => Expr::IsNull {
                expr: Box::new(expr.transform(f)),
                negated: *negated,
            },
            Expr::Paren(inner) => Expr::Paren(Box::new(inner.transform(f))),
            Expr::Interval { value, unit } => Expr::Interval {
                value: Box::new(value.transform(f)),
                unit: *unit,
            },
            Expr::Column { .. }
            | Expr::Literal(_)
            | Expr::Subquery(_)
            | Expr::Star { .. }
            | Expr::Raw(_) => self.clone(),
        }
    }

    /// Substitute every sub-term equal to `target` with `replacement`.
    pub fn replace(&self, target: &Expr, replacement: &Expr) -> Expr {
        self.transform(&|e| (e == target).then(|| replacement.clone()))
    }

    /// Re-home every column reference on `from` onto `to`.
    pub fn replace_table(&self, from: &TableRef, to: &TableRef) -> Expr {
        self.transform(&|e| match e {
            Expr::Column {
                table: Some(t),
                column,
            } if t == from => Some(Expr::Column {
                table: Some(to.clone()),
                column: column.clone(),
            }),
            Expr::Star { table: Some(t) } if t == from => Some(Expr::Star {
                table: Some(to.clone()),
            }),
            _ => None,
        })
    }

    /// Drop table qualifiers from every column reference.
    pub fn unqualified(&self) -> Expr {
        self.transform(&|e| match e {
            Expr::Column {
                table: Some(_),
                column,
            } => Some(Expr::Column {
                table: None,
                column: column.clone(),
            }),
            Expr::Star { table: Some(_) } => Some(Expr::Star { table: None }),
            _ => None,
        })
    }
}

// =============================================================================
// Expression Constructors
// =============================================================================

/// Create a column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// Create a qualified column reference (table.column).
pub fn table_col(table: &TableRef, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.clone()),
        column: column.into(),
    }
}

/// Reference an output column of an aliased subquery.
pub fn field(alias: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(TableRef::new(alias)),
        column: column.into(),
    }
}

/// Create an integer literal.
pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

/// Create a float literal.
pub fn lit_float(f: f64) -> Expr {
    Expr::Literal(Literal::Float(f))
}

/// Create a string literal.
pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

/// Create a boolean literal.
pub fn lit_bool(b: bool) -> Expr {
    Expr::Literal(Literal::Bool(b))
}

/// Create a date literal.
pub fn lit_date(d: NaiveDate) -> Expr {
    Expr::Literal(Literal::Date(d))
}

/// Create a timestamp literal.
pub fn lit_timestamp(t: NaiveDateTime) -> Expr {
    Expr::Literal(Literal::Timestamp(t))
}

/// Create a NULL literal.
pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// Create a star (*) expression.
pub fn star() -> Expr {
    Expr::Star { table: None }
}

/// INTERVAL value UNIT
pub fn interval(value: impl Into<Expr>, unit: DatePart) -> Expr {
    Expr::Interval {
        value: Box::new(value.into()),
        unit,
    }
}

/// Raw SQL expression (pass-through, no parsing).
///
/// Use this sparingly for dialect-specific syntax that isn't covered by the builder.
pub fn raw_sql(sql: &str) -> Expr {
    Expr::Raw(sql.into())
}

// =============================================================================
// Functions
// =============================================================================

/// COUNT(expr)
pub fn count(expr: Expr) -> Expr {
    func("COUNT", vec![expr])
}

/// COUNT(*)
pub fn count_star() -> Expr {
    func("COUNT", vec![star()])
}

/// COUNT(DISTINCT expr)
pub fn count_distinct(expr: Expr) -> Expr {
    Expr::Function {
        name: "COUNT".into(),
        args: vec![expr],
        distinct: true,
    }
}

/// SUM(expr)
pub fn sum(expr: Expr) -> Expr {
    func("SUM", vec![expr])
}

/// AVG(expr)
pub fn avg(expr: Expr) -> Expr {
    func("AVG", vec![expr])
}

/// MIN(expr)
pub fn min(expr: Expr) -> Expr {
    func("MIN", vec![expr])
}

/// MAX(expr)
pub fn max(expr: Expr) -> Expr {
    func("MAX", vec![expr])
}

/// COALESCE(args...)
pub fn coalesce(args: Vec<Expr>) -> Expr {
    func("COALESCE", args)
}

/// NULLIF(expr, value)
pub fn nullif(expr: Expr, value: impl Into<Expr>) -> Expr {
    func("NULLIF", vec![expr, value.into()])
}

/// LOWER(expr)
pub fn lower(expr: Expr) -> Expr {
    func("LOWER", vec![expr])
}

/// FLOOR(expr)
pub fn floor(expr: Expr) -> Expr {
    func("FLOOR", vec![expr])
}

/// Generic function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
        distinct: false,
    }
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    // Comparison operators
    fn eq(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Eq, other.into())
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Ne, other.into())
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gt, other.into())
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gte, other.into())
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lt, other.into())
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lte, other.into())
    }

    // Logical operators
    fn and(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::And, other.into())
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Or, other.into())
    }

    fn not(self) -> Expr {
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(self.into_expr()),
        }
    }

    // Arithmetic operators
    fn add(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Plus, other.into())
    }

    fn sub(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Minus, other.into())
    }

    fn mul(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Mul, other.into())
    }

    fn div(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Div, other.into())
    }

    // String operators
    fn like(self, pattern: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Like, pattern.into())
    }

    // NULL checks
    #[allow(clippy::wrong_self_convention)]
    fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: false,
        }
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: true,
        }
    }

    // IN operator
    fn in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
            negated: false,
        }
    }

    fn not_in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
            negated: true,
        }
    }

    // BETWEEN operator
    fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::Between {
            expr: Box::new(self.into_expr()),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
            negated: false,
        }
    }

    fn paren(self) -> Expr {
        Expr::Paren(Box::new(self.into_expr()))
    }

    /// Alias this expression (for SELECT list).
    fn alias(self, name: &str) -> SelectExpr {
        SelectExpr {
            expr: self.into_expr(),
            alias: Some(name.into()),
        }
    }
}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        lit_int(n as i64)
    }
}

impl From<f64> for Expr {
    fn from(f: f64) -> Self {
        lit_float(f)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::Literal(Literal::String(s))
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        lit_bool(b)
    }
}

impl From<NaiveDate> for Expr {
    fn from(d: NaiveDate) -> Self {
        lit_date(d)
    }
}

impl From<NaiveDateTime> for Expr {
    fn from(t: NaiveDateTime) -> Self {
        lit_timestamp(t)
    }
}

impl From<Query> for Expr {
    /// Convert a Query into a Subquery expression.
    fn from(query: Query) -> Self {
        Expr::Subquery(Box::new(query))
    }
}

// =============================================================================
// Tests
// =============================================================================
