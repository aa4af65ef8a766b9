//! Timed Task Runner
//!
//! Runs a blocking task (typically a SQL script) while a second thread
//! samples the database server process, then reports how long the task
//! took:
//! - Monitoring starts before the task and runs on its own thread
//! - The task result is returned unchanged to the caller
//! - Monitoring is cancelled and joined on every exit path

use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{debug, error};

use crate::monitoring::{
    run_monitor, CancellationSignal, MonitorConfig, MonitorSummary, ProcessTable,
    ResourceSampler, SysinfoTable,
};

use super::timer::ScopedTimer;

/// Outcome of one timed run.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// Process name substring that was monitored
    pub target: String,
    /// When the task started
    pub started_at: DateTime<Local>,
    /// Wall-clock duration of the task
    pub elapsed: Duration,
    /// What the sampler observed
    pub monitor: MonitorSummary,
}

impl ExecutionReport {
    /// Returns the elapsed time in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Handle to a running monitoring thread.
///
/// Dropping the session cancels and joins the thread, so a panicking
/// task cannot leave the sampler running.
struct MonitorSession {
    cancel: CancellationSignal,
    handle: Option<JoinHandle<MonitorSummary>>,
}

impl MonitorSession {
    fn spawn<T>(table: T, target: &str, config: &MonitorConfig, cancel: CancellationSignal) -> Self
    where
        T: ProcessTable + Send + 'static,
    {
        let sampler = ResourceSampler::new(table, target, config, cancel.clone());

        let handle = thread::Builder::new()
            .name("resource-monitor".to_string())
            .spawn(move || run_monitor(sampler))
            .map_err(|e| error!("Failed to start monitoring thread for {}: {}", target, e))
            .ok();

        Self { cancel, handle }
    }

    /// Cancels the sampler and waits for it to stop.
    fn finish(mut self) -> MonitorSummary {
        self.stop()
    }

    fn stop(&mut self) -> MonitorSummary {
        self.cancel.cancel();

        let Some(handle) = self.handle.take() else {
            return MonitorSummary::default();
        };

        handle.join().unwrap_or_else(|_| {
            error!("Monitoring thread panicked");
            MonitorSummary::default()
        })
    }
}

impl Drop for MonitorSession {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}

/// Runs tasks under resource monitoring.
///
/// # Example
///
/// ```rust,no_run
/// use sqlbench::execution::TimedRunner;
/// use sqlbench::monitoring::MonitorConfig;
///
/// let runner = TimedRunner::new(MonitorConfig::default());
/// let report = runner.run_and_measure("mysqld", || {
///     // execute the script here
///     Ok::<(), std::io::Error>(())
/// })?;
///
/// println!("took {:.3}s", report.elapsed_secs());
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimedRunner {
    config: MonitorConfig,
}

impl TimedRunner {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Runs `task` while sampling the process whose name contains
    /// `monitor_target`, using the live OS process table.
    pub fn run_and_measure<F, E>(&self, monitor_target: &str, task: F) -> Result<ExecutionReport, E>
    where
        F: FnOnce() -> Result<(), E>,
    {
        self.run_and_measure_on(SysinfoTable::new(), monitor_target, task)
    }

    /// Same as [`run_and_measure`](Self::run_and_measure) with an explicit
    /// process table.
    ///
    /// Monitoring failures (process not found or terminated) are logged by
    /// the sampler and never affect the task. If the task fails, its error
    /// is returned after the sampler has been cancelled and joined.
    pub fn run_and_measure_on<T, F, E>(
        &self,
        table: T,
        monitor_target: &str,
        task: F,
    ) -> Result<ExecutionReport, E>
    where
        T: ProcessTable + Send + 'static,
        F: FnOnce() -> Result<(), E>,
    {
        self.run_with_signal(table, monitor_target, CancellationSignal::new(), task)
    }

    fn run_with_signal<T, F, E>(
        &self,
        table: T,
        monitor_target: &str,
        cancel: CancellationSignal,
        task: F,
    ) -> Result<ExecutionReport, E>
    where
        T: ProcessTable + Send + 'static,
        F: FnOnce() -> Result<(), E>,
    {
        let session = MonitorSession::spawn(table, monitor_target, &self.config, cancel);

        let started_at = Local::now();
        let timer = ScopedTimer::start(monitor_target);
        let result = task();
        let elapsed = timer.stop();

        let monitor = session.finish();
        debug!("Monitoring of {} finished: {}", monitor_target, monitor.stop_reason);

        result?;

        Ok(ExecutionReport {
            target: monitor_target.to_string(),
            started_at,
            elapsed,
            monitor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::testing::ScriptedTable;
    use crate::monitoring::StopReason;
    use std::time::Instant;

    fn fast_runner() -> TimedRunner {
        TimedRunner::new(MonitorConfig {
            lookup_attempts: 3,
            lookup_retry_delay: Duration::from_millis(5),
            sample_interval: Duration::from_millis(10),
        })
    }

    fn sleeping_task(ms: u64) -> impl FnOnce() -> Result<(), String> {
        move || {
            thread::sleep(Duration::from_millis(ms));
            Ok(())
        }
    }

    #[test]
    fn test_runner_default_config() {
        let runner = TimedRunner::default();
        assert_eq!(runner.config, MonitorConfig::default());
    }

    #[test]
    fn test_end_to_end_sample_bound() {
        let runner = fast_runner();
        let table = ScriptedTable::with(&[(11, "mysqld")]);

        let report = runner
            .run_and_measure_on(table, "mysqld", sleeping_task(50))
            .unwrap();

        assert!(report.elapsed >= Duration::from_millis(50));
        assert!(report.elapsed < Duration::from_millis(500));
        assert_eq!(report.target, "mysqld");
        assert_eq!(report.monitor.stop_reason, StopReason::Cancelled);

        // Each sample takes a full 10ms interval
        let bound = report.elapsed.as_millis() as usize / 10 + 2;
        assert!(report.monitor.samples() <= bound);
    }

    #[test]
    fn test_short_task_stops_sampler_promptly() {
        for task_ms in [5, 500] {
            let runner = fast_runner();
            let table = ScriptedTable::with(&[(1, "postgres")]);
            let start = Instant::now();

            let report = runner
                .run_and_measure_on(table, "postgres", sleeping_task(task_ms))
                .unwrap();

            // Join overhead beyond the task is at most one interval plus slack
            let overhead = start.elapsed().saturating_sub(report.elapsed);
            assert!(
                overhead < Duration::from_millis(150),
                "task {}ms: overhead {:?}",
                task_ms,
                overhead
            );
        }
    }

    #[test]
    fn test_not_found_still_reports() {
        let runner = fast_runner();

        let report = runner
            .run_and_measure_on(ScriptedTable::empty(), "mysqld", sleeping_task(50))
            .unwrap();

        assert_eq!(report.monitor.samples(), 0);
        assert_eq!(report.monitor.stop_reason, StopReason::NotFound);
        assert!(report.elapsed >= Duration::from_millis(50));
    }

    #[test]
    fn test_long_lookup_is_cut_short_by_task_completion() {
        let runner = TimedRunner::new(MonitorConfig {
            lookup_attempts: 5,
            lookup_retry_delay: Duration::from_secs(2),
            sample_interval: Duration::from_millis(10),
        });
        let start = Instant::now();

        let report = runner
            .run_and_measure_on(ScriptedTable::empty(), "mysqld", sleeping_task(5))
            .unwrap();

        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(report.monitor.stop_reason, StopReason::Cancelled);
    }

    #[test]
    fn test_process_vanishes_does_not_affect_task() {
        let runner = fast_runner();
        let table = ScriptedTable::with(&[(4, "mysqld")]).lives_for(1);

        let report = runner
            .run_and_measure_on(table, "mysqld", sleeping_task(60))
            .unwrap();

        assert_eq!(report.monitor.samples(), 1);
        assert_eq!(report.monitor.stop_reason, StopReason::Terminated);
    }

    #[test]
    fn test_task_error_still_cancels_and_joins() {
        let runner = fast_runner();
        let cancel = CancellationSignal::new();
        let table = ScriptedTable::with(&[(2, "mysqld")]);
        let mut finished = None;

        let result = runner.run_with_signal(table, "mysqld", cancel.clone(), || {
            thread::sleep(Duration::from_millis(15));
            finished = Some(Instant::now());
            Err::<(), _>("simulated failure".to_string())
        });
        let join_time = finished.map(|at| at.elapsed());

        assert_eq!(result.unwrap_err(), "simulated failure");
        assert!(cancel.is_cancelled());

        // One in-flight 10ms measurement at most, plus scheduling slack
        let join_time = join_time.unwrap();
        assert!(join_time < Duration::from_millis(60), "join took {:?}", join_time);
    }

    #[test]
    fn test_target_with_nul_is_still_monitored() {
        let runner = fast_runner();

        let report = runner
            .run_and_measure_on(ScriptedTable::empty(), "my\0sqld", sleeping_task(60))
            .unwrap();

        // NotFound only comes from a sampler thread that actually started
        assert_eq!(report.target, "my\0sqld");
        assert_eq!(report.monitor.stop_reason, StopReason::NotFound);
    }

    #[test]
    fn test_task_panic_still_cancels() {
        let runner = fast_runner();
        let cancel = CancellationSignal::new();
        let observer = cancel.clone();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            runner.run_with_signal(
                ScriptedTable::with(&[(2, "mysqld")]),
                "mysqld",
                cancel,
                || -> Result<(), String> { panic!("task blew up") },
            )
        }));

        assert!(outcome.is_err());
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_report_elapsed_secs() {
        let report = ExecutionReport {
            target: "mysqld".to_string(),
            started_at: Local::now(),
            elapsed: Duration::from_millis(1500),
            monitor: MonitorSummary::default(),
        };
        assert!((report.elapsed_secs() - 1.5).abs() < 1e-9);
    }
}
