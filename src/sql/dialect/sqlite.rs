//! SQLite SQL dialect.
//!
//! SQLite differences from ANSI:
//! - Booleans are stored as integers 1/0
//! - UNION operands cannot be parenthesised
//! - OFFSET requires a LIMIT (`LIMIT -1` means unbounded)
//! - FULL OUTER JOIN since 3.39 (the bundled library is newer)

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct SQLite;

impl SqlDialect for SQLite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_required_limit(limit, offset, -1)
    }

    fn parenthesize_set_operands(&self) -> bool {
        false
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_sqlite(name)
    }
}
