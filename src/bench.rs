//! Benchmark Orchestration
//!
//! Runs each configured target's script under monitoring, one target
//! after another. A failing target is logged and does not stop the rest.

use log::{error, info};

use crate::config::{BenchConfig, TargetConfig};
use crate::database::{OnStatementError, ScriptExecutor};
use crate::error::ScriptError;
use crate::execution::{ExecutionReport, TimedRunner};

/// Result of benchmarking one target.
#[derive(Debug)]
pub struct TargetOutcome {
    /// Target name from the configuration
    pub name: String,
    pub result: Result<ExecutionReport, ScriptError>,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs configured targets in order.
pub struct Bench {
    config: BenchConfig,
    runner: TimedRunner,
    policy: OnStatementError,
}

impl Bench {
    /// Creates a bench for a validated configuration.
    pub fn new(config: BenchConfig) -> Self {
        let runner = TimedRunner::new(config.monitor.to_monitor_config());
        let policy = config.on_statement_error;
        Self {
            config,
            runner,
            policy,
        }
    }

    /// Overrides the configured statement error policy.
    pub fn set_policy(&mut self, policy: OnStatementError) {
        self.policy = policy;
    }

    /// Runs every target, or only the one named `only`.
    ///
    /// Returns `None` if `only` names no configured target.
    pub fn run(&self, only: Option<&str>) -> Option<Vec<TargetOutcome>> {
        let targets: Vec<&TargetConfig> = match only {
            Some(name) => vec![self.config.get_target(name)?],
            None => self.config.targets.iter().collect(),
        };

        Some(targets.into_iter().map(|t| self.run_target(t)).collect())
    }

    /// Runs one target's script while monitoring its server process.
    pub fn run_target(&self, target: &TargetConfig) -> TargetOutcome {
        let engine = target.connection.engine;
        let executor = ScriptExecutor::new(target.connection.clone(), self.policy);

        info!("Running {} SQL script.", engine);

        let result = self
            .runner
            .run_and_measure(target.process_name(), || {
                executor.run(&target.script).map(|_| ())
            });

        match &result {
            Ok(report) => info!(
                "{} SQL script execution completed in {:.6} seconds.",
                engine,
                report.elapsed_secs()
            ),
            Err(e) => error!("{} SQL script execution failed: {}", engine, e),
        }

        TargetOutcome {
            name: target.name.clone(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    const UNREACHABLE: &str = r#"
monitor:
  lookup_attempts: 1
  lookup_retry_delay_ms: 1
  sample_interval_ms: 10
targets:
  - name: pg
    engine: postgres
    host: 127.0.0.1
    port: 1
    user: nobody
    database: none
    script: missing.sql
    process: no-such-process-name
"#;

    #[test]
    fn test_policy_from_config() {
        let config = parse_config(&format!("on_statement_error: abort\n{}", UNREACHABLE)).unwrap();
        let mut bench = Bench::new(config);
        assert_eq!(bench.policy, OnStatementError::Abort);

        bench.set_policy(OnStatementError::Continue);
        assert_eq!(bench.policy, OnStatementError::Continue);
    }

    #[test]
    fn test_unknown_target() {
        let bench = Bench::new(parse_config(UNREACHABLE).unwrap());
        assert!(bench.run(Some("mysql")).is_none());
    }

    #[test]
    fn test_connection_failure_is_reported_per_target() {
        let bench = Bench::new(parse_config(UNREACHABLE).unwrap());
        let outcomes = bench.run(None).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].name, "pg");
        assert!(!outcomes[0].is_success());
        assert!(matches!(
            outcomes[0].result,
            Err(ScriptError::Connection { .. })
        ));
    }
}
