//! Configuration Data Structures
//!
//! Defines the benchmark configuration read from YAML:
//!
//! ```yaml
//! monitor:
//!   lookup_attempts: 5
//!   lookup_retry_delay_ms: 2000
//!   sample_interval_ms: 1000
//! on_statement_error: continue
//! targets:
//!   - name: mysql
//!     engine: mysql
//!     user: root
//!     password: secret
//!     database: bench
//!     script: mysql.sql
//!   - name: postgresql
//!     engine: postgres
//!     port: 5432
//!     user: postgres
//!     database: bench
//!     script: postgresql.sql
//!     process: postgres
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::database::OnStatementError;
use crate::monitoring::sampler::MonitorConfig;

/// Supported database servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Engine {
    #[serde(rename = "mysql", alias = "mariadb")]
    MySql,
    #[serde(rename = "postgres", alias = "postgresql")]
    Postgres,
}

impl Engine {
    /// Port the server listens on unless configured otherwise.
    pub fn default_port(self) -> u16 {
        match self {
            Engine::MySql => 3306,
            Engine::Postgres => 5432,
        }
    }

    /// Executable name substring used to find the server process.
    pub fn default_process_name(self) -> &'static str {
        match self {
            Engine::MySql => "mysqld",
            Engine::Postgres => "postgres",
        }
    }

    /// Whether each statement needs its own savepoint to survive a failure.
    ///
    /// A failed statement aborts a PostgreSQL transaction until it is rolled
    /// back. MySQL keeps the transaction usable, and its DDL commits
    /// implicitly and drops every savepoint, so statements run directly.
    pub fn isolates_statements(self) -> bool {
        match self {
            Engine::MySql => false,
            Engine::Postgres => true,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::MySql => f.write_str("MySQL"),
            Engine::Postgres => f.write_str("PostgreSQL"),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

/// Where and how to connect to a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub engine: Engine,

    #[serde(default = "default_host")]
    pub host: String,

    /// Defaults to the engine's standard port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    pub user: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    pub database: String,
}

impl ConnectionSettings {
    /// Returns the configured port or the engine default.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }
}

/// One database to benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Unique name used on the command line and in reports
    pub name: String,

    #[serde(flatten)]
    pub connection: ConnectionSettings,

    /// SQL script to execute
    pub script: PathBuf,

    /// Process name substring to monitor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
}

impl TargetConfig {
    /// Returns the process name to monitor, falling back to the engine default.
    pub fn process_name(&self) -> &str {
        self.process
            .as_deref()
            .unwrap_or_else(|| self.connection.engine.default_process_name())
    }
}

fn default_lookup_attempts() -> u32 {
    5
}

fn default_lookup_retry_delay_ms() -> u64 {
    2000
}

fn default_sample_interval_ms() -> u64 {
    1000
}

/// Process discovery and sampling timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_lookup_attempts")]
    pub lookup_attempts: u32,

    #[serde(default = "default_lookup_retry_delay_ms")]
    pub lookup_retry_delay_ms: u64,

    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            lookup_attempts: default_lookup_attempts(),
            lookup_retry_delay_ms: default_lookup_retry_delay_ms(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

impl MonitorSettings {
    pub fn to_monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            lookup_attempts: self.lookup_attempts,
            lookup_retry_delay: Duration::from_millis(self.lookup_retry_delay_ms),
            sample_interval: Duration::from_millis(self.sample_interval_ms),
        }
    }
}

/// Complete benchmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,

    #[serde(default)]
    pub on_statement_error: OnStatementError,

    pub targets: Vec<TargetConfig>,
}

impl BenchConfig {
    /// Gets a target by name.
    pub fn get_target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        assert_eq!(Engine::MySql.default_port(), 3306);
        assert_eq!(Engine::Postgres.default_port(), 5432);
        assert_eq!(Engine::MySql.default_process_name(), "mysqld");
        assert_eq!(Engine::Postgres.default_process_name(), "postgres");
    }

    #[test]
    fn test_statement_isolation_per_engine() {
        assert!(!Engine::MySql.isolates_statements());
        assert!(Engine::Postgres.isolates_statements());
    }

    #[test]
    fn test_engine_display() {
        assert_eq!(Engine::MySql.to_string(), "MySQL");
        assert_eq!(Engine::Postgres.to_string(), "PostgreSQL");
    }

    #[test]
    fn test_engine_aliases() {
        let engine: Engine = serde_yaml::from_str("postgresql").unwrap();
        assert_eq!(engine, Engine::Postgres);
        let engine: Engine = serde_yaml::from_str("mariadb").unwrap();
        assert_eq!(engine, Engine::MySql);
    }

    #[test]
    fn test_target_defaults() {
        let yaml = r#"
name: pg
engine: postgres
user: postgres
database: bench
script: bench.sql
"#;
        let target: TargetConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(target.connection.host, "localhost");
        assert_eq!(target.connection.port(), 5432);
        assert!(target.connection.password.is_none());
        assert_eq!(target.process_name(), "postgres");
    }

    #[test]
    fn test_target_overrides() {
        let yaml = r#"
name: mysql
engine: mysql
host: db.internal
port: 3307
user: root
password: secret
database: bench
script: mysql.sql
process: mariadbd
"#;
        let target: TargetConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(target.connection.host, "db.internal");
        assert_eq!(target.connection.port(), 3307);
        assert_eq!(target.connection.password.as_deref(), Some("secret"));
        assert_eq!(target.process_name(), "mariadbd");
    }

    #[test]
    fn test_monitor_settings_conversion() {
        let config = MonitorSettings::default().to_monitor_config();
        assert_eq!(config, MonitorConfig::default());

        let custom = MonitorSettings {
            lookup_attempts: 2,
            lookup_retry_delay_ms: 10,
            sample_interval_ms: 250,
        }
        .to_monitor_config();
        assert_eq!(custom.lookup_retry_delay, Duration::from_millis(10));
        assert_eq!(custom.sample_interval, Duration::from_millis(250));
    }
}
