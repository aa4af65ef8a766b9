//! Process Locator
//!
//! Finds the database server process by name in the OS process table,
//! retrying a bounded number of times while the server may still be
//! starting up.

use std::time::Duration;

use log::debug;

use super::cancel::CancellationSignal;
use super::process_table::{ProcessHandle, ProcessTable};

/// Default number of process table scans.
pub const DEFAULT_LOOKUP_ATTEMPTS: u32 = 5;

/// Default wait between two scans.
pub const DEFAULT_LOOKUP_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Locates a running process by name substring.
#[derive(Debug, Clone)]
pub struct ProcessLocator {
    attempts: u32,
    retry_delay: Duration,
}

impl ProcessLocator {
    pub fn new(attempts: u32, retry_delay: Duration) -> Self {
        Self {
            attempts,
            retry_delay,
        }
    }

    /// Scans `table` for a process whose name contains `name_substring`.
    ///
    /// Matching is a case-sensitive substring test and the first match
    /// wins. Which process is "first" follows the OS enumeration order,
    /// which is unspecified, so with several matching processes
    /// (e.g. a `postgres` postmaster and its backends) any of them may be
    /// returned.
    ///
    /// Between attempts the locator waits `retry_delay`, giving up early
    /// if `cancel` is set. Returns `None` when no attempt matched.
    pub fn locate<T: ProcessTable + ?Sized>(
        &self,
        table: &mut T,
        name_substring: &str,
        cancel: &CancellationSignal,
    ) -> Option<ProcessHandle> {
        for attempt in 1..=self.attempts {
            let found = table
                .processes()
                .into_iter()
                .find(|process| process.name.contains(name_substring));

            if let Some(handle) = found {
                debug!(
                    "Matched '{}' to {} (pid {}) on attempt {}",
                    name_substring, handle.name, handle.pid, attempt
                );
                return Some(handle);
            }

            debug!(
                "No process matching '{}' (attempt {}/{})",
                name_substring, attempt, self.attempts
            );

            if attempt < self.attempts && cancel.wait_timeout(self.retry_delay) {
                debug!("Lookup of '{}' cancelled", name_substring);
                return None;
            }
        }

        None
    }
}

impl Default for ProcessLocator {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_ATTEMPTS, DEFAULT_LOOKUP_RETRY_DELAY)
    }
}
