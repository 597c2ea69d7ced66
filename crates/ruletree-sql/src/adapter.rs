//! The database portability surface
//!
//! Three primitives are all an engine needs to provide: identifier
//! quoting, value quoting, and a find-in-set expression for CSV-stored
//! multi-value columns. Everything else the compiler emits is plain ANSI
//! SQL. Every literal reaching a compiled fragment passes through
//! `quote_value`; raw user-controlled text never lands in the output.

use crate::error::{Result, SqlError};
use ruletree_core::Value;

/// Capabilities a target database exposes to the compiler
pub trait SqlAdapter {
    /// Quote a column identifier
    fn quote_identifier(&self, name: &str) -> String;

    /// Quote a scalar literal. List values are expanded by the compiler
    /// and never reach this primitive.
    fn quote_value(&self, value: &Value) -> Result<String>;

    /// A boolean expression testing whether `needle` (an already-quoted
    /// value) is one element of `haystack` (an already-quoted column
    /// expression holding a CSV-stored set).
    fn find_in_set_expr(&self, needle: &str, haystack: &str) -> String;

    /// The pattern-match operator keyword. Case-insensitive by default;
    /// engines whose LIKE is case-sensitive override this.
    fn like_operator(&self) -> &'static str {
        "LIKE"
    }
}

/// Escape a string literal by doubling single quotes
fn quote_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn quote_scalar(value: &Value, true_lit: &str, false_lit: &str) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(b) => Ok(if *b { true_lit } else { false_lit }.to_string()),
        Value::Number(_) => Ok(value.to_text()),
        Value::String(s) => Ok(quote_str(s)),
        Value::Array(_) => Err(SqlError::UnsupportedValue(
            "list values are expanded by the compiler".to_string(),
        )),
    }
}

/// MySQL / MariaDB
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlAdapter;

impl SqlAdapter for MysqlAdapter {
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn quote_value(&self, value: &Value) -> Result<String> {
        quote_scalar(value, "1", "0")
    }

    fn find_in_set_expr(&self, needle: &str, haystack: &str) -> String {
        format!("FIND_IN_SET({}, {})", needle, haystack)
    }
}

/// PostgreSQL
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresAdapter;

impl SqlAdapter for PostgresAdapter {
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn quote_value(&self, value: &Value) -> Result<String> {
        quote_scalar(value, "TRUE", "FALSE")
    }

    fn find_in_set_expr(&self, needle: &str, haystack: &str) -> String {
        format!("{} = ANY(string_to_array({}, ','))", needle, haystack)
    }

    // Postgres LIKE is case-sensitive; ILIKE matches the evaluator
    fn like_operator(&self) -> &'static str {
        "ILIKE"
    }
}

/// SQLite (also a reasonable ANSI fallback: no vendor functions)
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteAdapter;

impl SqlAdapter for SqliteAdapter {
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn quote_value(&self, value: &Value) -> Result<String> {
        quote_scalar(value, "1", "0")
    }

    fn find_in_set_expr(&self, needle: &str, haystack: &str) -> String {
        format!(
            "(',' || {} || ',') LIKE ('%,' || {} || ',%')",
            haystack, needle
        )
    }
}
