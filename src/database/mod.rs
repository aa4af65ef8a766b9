//! Database Module
//!
//! Executes benchmark SQL scripts against MySQL or PostgreSQL.
//!
//! # Structure
//!
//! - [`script`]: Naive `;` statement splitting
//! - [`executor`]: Connection, transaction and statement error policy

pub mod executor;
pub mod script;

pub use executor::{drive_statements, OnStatementError, ScriptExecutor, ScriptSummary, StatementRun};
pub use script::split_statements;
