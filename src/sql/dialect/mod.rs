//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting: `"` (Vertica/PG/SQLite), `` ` `` (MySQL)
//! - Boolean literals: true/false vs 1/0
//! - Pagination: whether OFFSET may appear without LIMIT
//! - Set operations: whether UNION operands may be parenthesised
//!
//! Date truncation and date arithmetic are not dialect concerns here; they
//! belong to the database adapters in [`crate::database`], which may need
//! more than syntax to express them.
//!
//! # Usage
//!
//! ```ignore
//! use slicer::sql::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("$d$timestamp");  // "$d$timestamp"
//! ```

pub mod helpers;
mod mysql;
mod postgres;
mod sqlite;
mod vertica;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::SQLite;
pub use vertica::Vertica;

use serde::{Deserialize, Serialize};

use super::token::TokenStream;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or equivalent pagination clause.
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    // =========================================================================
    // Grouping and Set Operations
    // =========================================================================

    /// Whether GROUP BY may reference a SELECT-list alias.
    ///
    /// When false the grouped expression itself is repeated.
    fn supports_group_by_alias(&self) -> bool {
        true
    }

    /// Whether the operands of UNION may be wrapped in parentheses.
    ///
    /// SQLite rejects `(SELECT ...) UNION ALL (SELECT ...)`.
    fn parenthesize_set_operands(&self) -> bool {
        true
    }

    // =========================================================================
    // JOIN Syntax
    // =========================================================================

    /// Whether this dialect supports FULL OUTER JOIN.
    ///
    /// Dialects without it receive a LEFT JOIN, which keeps every base row.
    fn supports_full_outer_join(&self) -> bool {
        true
    }

    // =========================================================================
    // Function Remapping
    // =========================================================================

    /// Remap a function name for this dialect.
    ///
    /// Returns `Some(new_name)` if the function should be remapped, `None` to keep original.
    /// The input is matched case-insensitively.
    fn remap_function(&self, name: &str) -> Option<&'static str> {
        let _ = name;
        None
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Vertica,
    Postgres,
    MySql,
    SQLite,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Vertica => &Vertica,
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
            Dialect::SQLite => &SQLite,
        }
    }

    /// Parse a dialect from its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "vertica" => Some(Dialect::Vertica),
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" => Some(Dialect::MySql),
            "sqlite" | "sqlite3" => Some(Dialect::SQLite),
            _ => None,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn supports_group_by_alias(&self) -> bool {
        self.dialect().supports_group_by_alias()
    }

    fn parenthesize_set_operands(&self) -> bool {
        self.dialect().parenthesize_set_operands()
    }

    fn supports_full_outer_join(&self) -> bool {
        self.dialect().supports_full_outer_join()
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
