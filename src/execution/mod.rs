//! Timed Execution Module
//!
//! Runs a task under resource monitoring and measures how long it took.
//!
//! # Architecture
//!
//! - [`runner`]: Spawns the sampler, drives the task, cancels and joins
//! - [`timer`]: Scoped wall-clock timer

pub mod runner;
pub mod timer;

pub use runner::{ExecutionReport, TimedRunner};
pub use timer::ScopedTimer;
