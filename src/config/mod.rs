//! Configuration Module
//!
//! Benchmark targets, connection settings and monitor timings.
//!
//! # Structure
//!
//! - [`model`]: Configuration data structures
//! - [`loader`]: YAML loading and validation

pub mod loader;
pub mod model;

pub use loader::{load_config, parse_config, validate_config};
pub use model::{BenchConfig, ConnectionSettings, Engine, MonitorSettings, TargetConfig};
