//! Resource Monitoring Module
//!
//! Locates the database server process and samples its CPU and memory
//! usage while a benchmark script runs.
//!
//! # Components
//!
//! - [`CancellationSignal`]: one-shot stop request shared across threads
//! - [`ProcessLocator`]: finds the server process by name
//! - [`ResourceSampler`]: per-interval CPU and memory measurements
//! - [`MonitorSummary`]: aggregate of a sampling session

pub mod cancel;
pub mod locator;
pub mod process_table;
pub mod resource;
pub mod sampler;

#[cfg(test)]
pub(crate) mod testing;

pub use cancel::CancellationSignal;
pub use locator::ProcessLocator;
pub use process_table::{ProcessHandle, ProcessTable, SysinfoTable};
pub use resource::{MonitorSummary, Sample, StopReason};
pub use sampler::{run_monitor, MonitorConfig, ResourceSampler};
