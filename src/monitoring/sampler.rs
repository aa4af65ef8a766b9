//! Resource Sampler
//!
//! Watches one server process for the lifetime of a benchmark run:
//! locate it, then measure CPU and memory once per interval until the
//! run is cancelled or the process goes away.

use std::time::Duration;

use log::{error, info, warn};

use super::cancel::CancellationSignal;
use super::locator::{ProcessLocator, DEFAULT_LOOKUP_ATTEMPTS, DEFAULT_LOOKUP_RETRY_DELAY};
use super::process_table::{ProcessHandle, ProcessTable};
use super::resource::{MonitorSummary, Sample, StopReason};

/// Default sampling interval.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Timing knobs for process discovery and sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Number of process table scans before giving up
    pub lookup_attempts: u32,
    /// Wait between two scans
    pub lookup_retry_delay: Duration,
    /// Measurement window, which is also the loop period
    pub sample_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            lookup_attempts: DEFAULT_LOOKUP_ATTEMPTS,
            lookup_retry_delay: DEFAULT_LOOKUP_RETRY_DELAY,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Searching,
    Sampling(ProcessHandle),
    Stopped(StopReason),
}

/// Lazy sequence of [`Sample`]s for one monitored process.
///
/// The first call to `next` locates the process; later calls each take
/// one measurement, which blocks for the sampling interval. The sequence
/// ends when the cancellation signal is observed between measurements,
/// when the process cannot be found, or when it exits. A measurement
/// already in progress is never interrupted.
pub struct ResourceSampler<T: ProcessTable> {
    table: T,
    target: String,
    locator: ProcessLocator,
    interval: Duration,
    cancel: CancellationSignal,
    state: State,
}

impl<T: ProcessTable> ResourceSampler<T> {
    pub fn new(
        table: T,
        target: impl Into<String>,
        config: &MonitorConfig,
        cancel: CancellationSignal,
    ) -> Self {
        Self {
            table,
            target: target.into(),
            locator: ProcessLocator::new(config.lookup_attempts, config.lookup_retry_delay),
            interval: config.sample_interval,
            cancel,
            state: State::Searching,
        }
    }

    /// Returns why the sequence ended, or `None` while it is still live.
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.state {
            State::Stopped(reason) => Some(reason),
            _ => None,
        }
    }

    fn search(&mut self) -> State {
        match self.locator.locate(&mut self.table, &self.target, &self.cancel) {
            Some(handle) => {
                info!(
                    "{} process found! ({}, pid {})",
                    self.target, handle.name, handle.pid
                );
                State::Sampling(handle)
            }
            None if self.cancel.is_cancelled() => State::Stopped(StopReason::Cancelled),
            None => {
                warn!("{} process not found.", self.target);
                State::Stopped(StopReason::NotFound)
            }
        }
    }
}

impl<T: ProcessTable> Iterator for ResourceSampler<T> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        loop {
            match &self.state {
                State::Searching => {
                    self.state = self.search();
                }
                State::Sampling(handle) => {
                    if self.cancel.is_cancelled() {
                        self.state = State::Stopped(StopReason::Cancelled);
                        return None;
                    }

                    let handle = handle.clone();
                    match self.table.measure(&handle, self.interval) {
                        Some(sample) => return Some(sample),
                        None => {
                            error!("{} process terminated.", self.target);
                            self.state = State::Stopped(StopReason::Terminated);
                            return None;
                        }
                    }
                }
                State::Stopped(_) => return None,
            }
        }
    }
}

/// Drains a sampler, logging every sample and folding it into a summary.
///
/// This is the body of the monitoring thread.
pub fn run_monitor<T: ProcessTable>(mut sampler: ResourceSampler<T>) -> MonitorSummary {
    let mut summary = MonitorSummary::default();
    let target = sampler.target.clone();

    for sample in sampler.by_ref() {
        info!("{} CPU usage: {}%", target, sample.cpu_percent);
        info!("{} Memory usage: {:.2} MB", target, sample.memory_mb);
        summary.record(&sample);
    }

    summary.stop_reason = sampler.stop_reason().unwrap_or_default();
    summary
}
