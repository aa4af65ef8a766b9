//! SQL Script Execution
//!
//! Runs a script file against MySQL or PostgreSQL over a single
//! connection:
//! - Connect, then read and split the script
//! - Execute every statement inside one transaction
//! - Apply the statement error policy
//! - Commit once at the end
//!
//! PostgreSQL statements each get a savepoint so a failure does not abort
//! the surrounding transaction. MySQL statements run directly: a failed
//! statement is already undone on its own there, and DDL commits the open
//! transaction implicitly, so an abort cannot undo work done before it.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection, Postgres};
use sqlx::{Connection, Database, Executor};
use tokio::runtime::{Builder, Runtime};

use crate::config::{ConnectionSettings, Engine};
use crate::error::{ScriptError, StatementFailure};

use super::script::split_statements;

/// What to do when a statement fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnStatementError {
    /// Roll back the failing statement and keep going
    #[default]
    Continue,
    /// Roll back the whole script and stop (MySQL DDL stays committed)
    Abort,
}

/// Result of pushing a list of statements through an executor.
#[derive(Debug, Default, PartialEq)]
pub struct StatementRun {
    /// Statements that executed without error
    pub succeeded: usize,
    /// Failures that were skipped over
    pub failures: Vec<StatementFailure>,
    /// The failure that stopped the run under [`OnStatementError::Abort`]
    pub aborted_by: Option<StatementFailure>,
}

/// Executes `statements` in order through `execute`, applying `policy`
/// to failures.
pub fn drive_statements<F, E>(
    statements: &[&str],
    policy: OnStatementError,
    mut execute: F,
) -> StatementRun
where
    F: FnMut(&str) -> Result<(), E>,
    E: ToString,
{
    let mut run = StatementRun::default();

    for (index, &statement) in statements.iter().enumerate() {
        debug!("Executing statement #{}", index + 1);

        match execute(statement) {
            Ok(()) => run.succeeded += 1,
            Err(e) => {
                let failure = StatementFailure {
                    index,
                    statement: statement.to_string(),
                    message: e.to_string(),
                };
                error!("Error during SQL file execution: {}", failure);

                if policy == OnStatementError::Abort {
                    run.aborted_by = Some(failure);
                    break;
                }
                run.failures.push(failure);
            }
        }
    }

    run
}

/// Summary of a successful script run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSummary {
    pub path: PathBuf,
    /// Number of non-empty statements in the script
    pub statements: usize,
}

/// Runs SQL script files against one configured database.
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    connection: ConnectionSettings,
    policy: OnStatementError,
}

impl ScriptExecutor {
    pub fn new(connection: ConnectionSettings, policy: OnStatementError) -> Self {
        Self { connection, policy }
    }

    /// Reads the file at `path` and executes its statements.
    ///
    /// A connection failure is returned before the file is read, so no
    /// statement runs.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<ScriptSummary, ScriptError> {
        let path = path.as_ref();
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ScriptError::Runtime)?;

        match self.connection.engine {
            Engine::MySql => {
                let options = self.mysql_options();
                let conn = runtime.block_on(MySqlConnection::connect_with(&options));
                self.run_on::<MySql>(&runtime, conn, path)
            }
            Engine::Postgres => {
                let options = self.postgres_options();
                let conn = runtime.block_on(PgConnection::connect_with(&options));
                self.run_on::<Postgres>(&runtime, conn, path)
            }
        }
    }

    fn mysql_options(&self) -> MySqlConnectOptions {
        let settings = &self.connection;
        let options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port())
            .username(&settings.user)
            .database(&settings.database);

        match &settings.password {
            Some(password) => options.password(password),
            None => options,
        }
    }

    fn postgres_options(&self) -> PgConnectOptions {
        let settings = &self.connection;
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port())
            .username(&settings.user)
            .database(&settings.database);

        match &settings.password {
            Some(password) => options.password(password),
            None => options,
        }
    }

    fn run_on<DB>(
        &self,
        runtime: &Runtime,
        conn: Result<DB::Connection, sqlx::Error>,
        path: &Path,
    ) -> Result<ScriptSummary, ScriptError>
    where
        DB: Database,
        for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    {
        let engine = self.connection.engine;
        let mut conn = conn.map_err(|source| {
            error!("Error connecting to {}: {}", engine, source);
            ScriptError::Connection {
                engine: engine.to_string(),
                source,
            }
        })?;
        info!("{} connection established successfully.", engine);

        let result = self.execute_file::<DB>(runtime, &mut conn, path);

        if let Err(e) = runtime.block_on(conn.close()) {
            warn!("Failed to close {} connection: {}", engine, e);
        }

        result
    }

    fn execute_file<DB>(
        &self,
        runtime: &Runtime,
        conn: &mut DB::Connection,
        path: &Path,
    ) -> Result<ScriptSummary, ScriptError>
    where
        DB: Database,
        for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    {
        let sql = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let statements = split_statements(&sql);
        debug!(
            "SQL file {} contains {} statements",
            path.display(),
            statements.len()
        );

        let mut tx = runtime
            .block_on(conn.begin())
            .map_err(ScriptError::Transaction)?;

        let isolate = self.connection.engine.isolates_statements();
        let run = drive_statements(&statements, self.policy, |statement| {
            if isolate {
                runtime.block_on(execute_in_savepoint::<DB>(&mut *tx, statement))
            } else {
                runtime.block_on(execute_direct::<DB>(&mut *tx, statement))
            }
        });

        if let Some(failure) = run.aborted_by {
            runtime
                .block_on(tx.rollback())
                .map_err(ScriptError::Transaction)?;
            return Err(ScriptError::Statement(failure));
        }

        runtime
            .block_on(tx.commit())
            .map_err(ScriptError::Transaction)?;

        if !run.failures.is_empty() {
            return Err(ScriptError::StatementsFailed {
                failures: run.failures,
                total: statements.len(),
            });
        }

        info!("SQL file {} executed successfully.", path.display());

        Ok(ScriptSummary {
            path: path.to_path_buf(),
            statements: statements.len(),
        })
    }
}

/// Runs one statement on the open transaction.
async fn execute_direct<DB>(conn: &mut DB::Connection, statement: &str) -> Result<(), sqlx::Error>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
{
    sqlx::raw_sql(statement).execute(conn).await.map(|_| ())
}

/// Runs one statement inside a savepoint so a failure only undoes itself.
async fn execute_in_savepoint<DB>(
    conn: &mut DB::Connection,
    statement: &str,
) -> Result<(), sqlx::Error>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
{
    let mut savepoint = conn.begin().await?;

    match sqlx::raw_sql(statement).execute(&mut *savepoint).await {
        Ok(_) => savepoint.commit().await,
        Err(e) => {
            savepoint.rollback().await?;
            Err(e)
        }
    }
}
