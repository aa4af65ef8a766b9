//! Error Types
//!
//! Typed failures for configuration loading and script execution.
//! Monitoring never fails outward; its conditions are only logged.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the benchmark configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// One statement that the database rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementFailure {
    /// Zero-based position among the non-empty statements
    pub index: usize,
    /// The statement text
    pub statement: String,
    /// Error reported by the database
    pub message: String,
}

impl fmt::Display for StatementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "statement #{} ({}): {}",
            self.index + 1,
            preview(&self.statement),
            self.message
        )
    }
}

/// Errors raised while running a SQL script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to start database runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Error connecting to {engine}: {source}")]
    Connection {
        engine: String,
        source: sqlx::Error,
    },

    #[error("Failed to read SQL file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Transaction error: {0}")]
    Transaction(#[source] sqlx::Error),

    #[error("Aborted at {0}")]
    Statement(StatementFailure),

    #[error("{} of {total} statements failed; first: {}", .failures.len(), first_failure(.failures))]
    StatementsFailed {
        failures: Vec<StatementFailure>,
        total: usize,
    },
}

fn first_failure(failures: &[StatementFailure]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Shortens a statement to its first line, capped at 60 characters.
fn preview(statement: &str) -> String {
    let line = statement.lines().next().unwrap_or_default();
    let mut short: String = line.chars().take(60).collect();
    if short.len() < statement.len() {
        short.push_str("...");
    }
    short
}
