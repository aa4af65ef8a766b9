//! sqlbench - SQL Script Benchmarking
//!
//! Executes a SQL script against MySQL or PostgreSQL while a background
//! thread samples the database server's CPU and memory usage, then
//! reports the wall-clock execution time.
//!
//! # Architecture
//!
//! - [`monitoring`]: Process lookup, resource sampling and cancellation
//! - [`execution`]: Timed task runner coordinating task and sampler
//! - [`database`]: Statement splitting and script execution
//! - [`config`]: YAML configuration of targets and timings
//! - [`bench`]: Runs every configured target in sequence
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlbench::{load_config, Bench};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("sqlbench.yaml")?;
//!     let bench = Bench::new(config);
//!
//!     for outcome in bench.run(None).unwrap_or_default() {
//!         if let Ok(report) = &outcome.result {
//!             println!("{}: {:.3}s", outcome.name, report.elapsed_secs());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod bench;
pub mod config;
pub mod database;
pub mod error;
pub mod execution;
pub mod monitoring;

// Re-export commonly used types
pub use bench::{Bench, TargetOutcome};
pub use config::load_config;
pub use error::{ConfigError, ScriptError};
pub use execution::{ExecutionReport, TimedRunner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "sqlbench";
