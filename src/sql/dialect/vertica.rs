//! Vertica SQL dialect.
//!
//! Vertica features:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - FULL OUTER JOIN
//! - GROUP BY may reference output aliases

use super::helpers;
use super::SqlDialect;

/// Vertica SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Vertica;

impl SqlDialect for Vertica {
    fn name(&self) -> &'static str {
        "vertica"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_vertica(name)
    }
}
