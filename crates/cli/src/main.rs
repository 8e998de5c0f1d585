//! tapi - declarative HTTP API test runner
//!
//! Loads one or more suite documents, runs every test against `--url`,
//! prints a summary and optionally writes the results to a JSON file and/or
//! posts them to a collection endpoint. Exits 0 only when every suite passed.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use tapi_core::{
    load_suites, select_tests, ExecutionMode, HttpReporter, JsonFileWriter, RunnerConfig,
    SuiteRunner, TestSuite,
};

mod output;

/// tapi - Declarative HTTP API test runner
#[derive(Parser, Debug)]
#[command(name = "tapi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Service base URL to test; every test's Uri is appended to it
    #[arg(long, env = "TAPI_URL")]
    url: String,

    /// Write the suite and its results to this JSON file
    #[arg(long, env = "TAPI_JSON")]
    json: Option<PathBuf>,

    /// POST the results as JSON to this URL
    #[arg(long, env = "TAPI_POST")]
    post: Option<String>,

    /// Suite documents or directories containing *.tapi.* files
    #[arg(default_value = "test.tapi.js")]
    suites: Vec<PathBuf>,

    /// Run the tests of each suite concurrently
    #[arg(long)]
    concurrent: bool,

    /// Client-wide request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// Run only the named test (repeatable)
    #[arg(long = "test", value_name = "NAME")]
    tests: Vec<String>,

    /// Console summary format
    #[arg(long, value_enum, default_value = "table")]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn runner_config(&self) -> anyhow::Result<RunnerConfig> {
        let mode = if self.concurrent {
            ExecutionMode::Concurrent
        } else {
            ExecutionMode::Sequential
        };
        let mut config = RunnerConfig::new(self.url.clone()).with_mode(mode);
        if let Some(seconds) = self.timeout {
            let timeout = Duration::try_from_secs_f64(seconds)
                .with_context(|| format!("invalid --timeout value {}", seconds))?;
            config = config.with_timeout(timeout);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let outcome = run(cli).await;
    if let Err(e) = &outcome {
        eprintln!("❌ {:#}", e);
    }
    std::process::exit(exit_code(&outcome));
}

/// 0 when every suite passed, 1 when a test failed, 2 on configuration errors
fn exit_code(outcome: &anyhow::Result<bool>) -> i32 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

/// Returns whether every suite passed. Only configuration problems are errors.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let runner = SuiteRunner::new(cli.runner_config()?)?;

    let mut suites = load_suites(&cli.suites)?;
    select_tests(&mut suites, &cli.tests)?;

    let summaries = runner.run_all(&mut suites).await;
    output::print_report(&suites, &summaries, cli.format);

    publish(&runner, &cli, &suites).await;

    Ok(summaries.iter().all(|s| s.passed_all))
}

/// Write and post results; failures are logged and otherwise ignored
async fn publish(runner: &SuiteRunner, cli: &Cli, suites: &[TestSuite]) {
    if let Some(path) = &cli.json {
        let writer = JsonFileWriter::new(path);
        let written = match suites {
            [single] => writer.write(single),
            _ => writer.write_all(suites),
        };
        if let Err(e) = written {
            warn!("{}", e);
        }
    }

    if let Some(url) = &cli.post {
        let reporter = HttpReporter::new(runner.executor().client().clone(), url);
        for suite in suites {
            if let Err(e) = reporter.post_suite(suite).await {
                warn!("{}", e);
            }
        }
    }
}
