//! sqlbench CLI Entry Point
//!
//! Provides command-line interface for running benchmarks.
//!
//! # Usage
//!
//! ```bash
//! # Run every target in sqlbench.yaml
//! sqlbench
//!
//! # Use another configuration file
//! sqlbench bench.yaml
//!
//! # Run a single target
//! sqlbench bench.yaml --target postgresql
//!
//! # Stop a script at its first failing statement
//! sqlbench --abort-on-error
//! ```

use std::env;
use std::process::ExitCode;

use chrono::Local;
use colored::Colorize;
use log::{error, info};

use sqlbench::database::OnStatementError;
use sqlbench::{load_config, Bench, TargetOutcome, APP_NAME, VERSION};

/// Default configuration file used when none is specified.
const DEFAULT_CONFIG: &str = "sqlbench.yaml";

/// Command-line configuration parsed from arguments.
#[derive(Debug, PartialEq)]
struct CliArgs {
    config_path: String,
    target: Option<String>,
    abort_on_error: bool,
    verbose: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config_path: DEFAULT_CONFIG.to_string(),
            target: None,
            abort_on_error: false,
            verbose: false,
        }
    }
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME.bold(), VERSION);
    println!("SQL script benchmark with server resource monitoring");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: sqlbench [OPTIONS] [CONFIG_FILE]");
    println!();
    println!("Arguments:");
    println!("  [CONFIG_FILE]       Path to configuration YAML (default: {})", DEFAULT_CONFIG);
    println!();
    println!("Options:");
    println!("  --target NAME       Run only the named target");
    println!("  --abort-on-error    Stop a script at its first failing statement");
    println!("  --verbose           Enable debug logging");
    println!("  --help              Show this help message");
    println!("  --version           Show version information");
    println!();
    println!("Examples:");
    println!("  sqlbench");
    println!("  sqlbench bench.yaml --target postgresql");
}

/// Parses command-line arguments into a CliArgs struct.
fn parse_arguments(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut positional_index = 0;
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--abort-on-error" => {
                cli.abort_on_error = true;
            }
            "--verbose" | "-v" => {
                cli.verbose = true;
            }
            "--target" | "-t" => {
                i += 1;
                if i >= args.len() {
                    return Err("--target requires a name argument".to_string());
                }
                cli.target = Some(args[i].clone());
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                match positional_index {
                    0 => cli.config_path = arg.clone(),
                    _ => return Err(format!("Unexpected argument: {}", arg)),
                }
                positional_index += 1;
            }
        }
        i += 1;
    }

    Ok(cli)
}

/// Prints the per-target results.
fn print_summary(outcomes: &[TargetOutcome]) {
    println!();
    println!("{}", "Benchmark summary".bold());

    for outcome in outcomes {
        println!();
        match &outcome.result {
            Ok(report) => {
                println!(
                    "{} {} ({}): {:.6} seconds",
                    "OK".green().bold(),
                    outcome.name,
                    report.started_at.format("%H:%M:%S"),
                    report.elapsed_secs()
                );
                println!("{}", report.monitor);
            }
            Err(e) => {
                println!("{} {}: {}", "FAILED".red().bold(), outcome.name, e);
            }
        }
    }
    println!();
}

/// Main application entry point.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let cli = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    setup_logging(cli.verbose);
    print_banner();

    let config = load_config(&cli.config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded: {} targets", config.targets.len());

    let mut bench = Bench::new(config);
    if cli.abort_on_error {
        bench.set_policy(OnStatementError::Abort);
    }

    let outcomes = bench.run(cli.target.as_deref()).ok_or_else(|| {
        format!(
            "Unknown target '{}'",
            cli.target.as_deref().unwrap_or_default()
        )
    })?;

    print_summary(&outcomes);

    Ok(outcomes.iter().all(TargetOutcome::is_success))
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
