//! Statement Splitting
//!
//! Turns a SQL script into individual statements by splitting on `;`.
//!
//! The split is purely textual: a `;` inside a string literal, comment or
//! procedural body (`CREATE FUNCTION ... $$ ... ; ... $$`) also ends a
//! statement. Scripts used for benchmarking must avoid those constructs.

/// Statement delimiter.
pub const DELIMITER: char = ';';

/// Splits `sql` on `;`, trims each piece and drops the blank ones.
///
/// # Example
///
/// ```rust
/// use sqlbench::database::split_statements;
///
/// let statements = split_statements("SELECT 1; \nSELECT 2;");
/// assert_eq!(statements, vec!["SELECT 1", "SELECT 2"]);
/// ```
pub fn split_statements(sql: &str) -> Vec<&str> {
    sql.split(DELIMITER)
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .collect()
}
