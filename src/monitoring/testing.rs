//! Scripted process table for tests.

use std::thread;
use std::time::Duration;

use super::process_table::{ProcessHandle, ProcessTable};
use super::resource::Sample;

/// A process table whose contents and lifetime are fixed up front.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTable {
    processes: Vec<ProcessHandle>,
    /// Enumerations that come back empty before `processes` show up
    hidden_for: usize,
    /// Successful measurements before the process disappears
    lives_for: Option<usize>,
    pub enumerations: usize,
    pub measurements: usize,
}

impl ScriptedTable {
    /// A table containing the given `(pid, name)` pairs.
    pub fn with(processes: &[(u32, &str)]) -> Self {
        Self {
            processes: processes
                .iter()
                .map(|(pid, name)| ProcessHandle::new(*pid, *name))
                .collect(),
            ..Self::default()
        }
    }

    /// A table with no processes at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn hidden_for(mut self, enumerations: usize) -> Self {
        self.hidden_for = enumerations;
        self
    }

    pub fn lives_for(mut self, measurements: usize) -> Self {
        self.lives_for = Some(measurements);
        self
    }
}

impl ProcessTable for ScriptedTable {
    fn processes(&mut self) -> Vec<ProcessHandle> {
        self.enumerations += 1;
        if self.enumerations <= self.hidden_for {
            return Vec::new();
        }
        self.processes.clone()
    }

    fn measure(&mut self, handle: &ProcessHandle, window: Duration) -> Option<Sample> {
        if let Some(limit) = self.lives_for {
            if self.measurements >= limit {
                return None;
            }
        }
        thread::sleep(window);
        self.measurements += 1;
        Some(Sample::new(1.5, u64::from(handle.pid) * 1024 * 1024))
    }
}
