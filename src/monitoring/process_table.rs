//! Process Table Access
//!
//! Read-only view of the operating system's process table used by the
//! locator and the sampler. The production implementation is backed by
//! `sysinfo`; tests substitute scripted tables.

use std::thread;
use std::time::Duration;

use sysinfo::{Pid, ProcessRefreshKind, System};

use super::resource::Sample;

/// Identifies a located operating-system process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    /// Process identifier
    pub pid: u32,
    /// Process name as reported by the OS
    pub name: String,
}

impl ProcessHandle {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

/// Source of process information.
pub trait ProcessTable {
    /// Enumerates every running process.
    ///
    /// The order is whatever the OS enumeration yields and is not stable
    /// between calls.
    fn processes(&mut self) -> Vec<ProcessHandle>;

    /// Measures CPU and resident memory of `handle` over `window`.
    ///
    /// Blocks for the whole window. Returns `None` if the process no
    /// longer exists.
    fn measure(&mut self, handle: &ProcessHandle, window: Duration) -> Option<Sample>;
}

/// [`ProcessTable`] backed by `sysinfo`.
pub struct SysinfoTable {
    system: System,
}

impl SysinfoTable {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    fn refresh(&mut self, pid: Pid) -> bool {
        let refresh_kind = ProcessRefreshKind::new().with_cpu().with_memory();
        self.system.refresh_process_specifics(pid, refresh_kind) && self.system.process(pid).is_some()
    }
}

impl Default for SysinfoTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SysinfoTable {
    fn processes(&mut self) -> Vec<ProcessHandle> {
        self.system.refresh_processes();
        self.system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessHandle::new(pid.as_u32(), process.name()))
            .collect()
    }

    fn measure(&mut self, handle: &ProcessHandle, window: Duration) -> Option<Sample> {
        let pid = Pid::from_u32(handle.pid);

        // CPU usage is the delta between two refreshes
        if !self.refresh(pid) {
            return None;
        }
        thread::sleep(window);
        if !self.refresh(pid) {
            return None;
        }

        let process = self.system.process(pid)?;
        Some(Sample::new(process.cpu_usage(), process.memory()))
    }
}
