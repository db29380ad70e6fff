use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use browser_smoke::check;
use browser_smoke::config::Config;
use browser_smoke::report::{DiagnosticsReporter, RunReport};
use browser_smoke::scenario::runner::run_scenarios;
use browser_smoke::scenario::{catalog, Scenario};

/// browser-smoke: smoke checks for a remote headless Chrome pool
#[derive(Parser)]
#[command(name = "browser-smoke", version, about)]
struct Cli {
    /// WebSocket endpoint of the pool (overrides the environment)
    #[arg(long)]
    endpoint: Option<String>,

    /// Directory for screenshots and other run artifacts
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to the pool and run the connectivity check
    Check,
    /// Run smoke scenarios by name (all of them by default)
    Run {
        /// Scenario names, see `list`
        names: Vec<String>,
        /// Emit the run reports as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// List the built-in scenarios
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Log to stderr only — stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(dir) = cli.artifacts_dir {
        config.artifacts_dir = dir;
    }

    match cli.command {
        Command::List => {
            for scenario in catalog::all() {
                println!("{:<20} {}", scenario.name, scenario.description);
            }
            ExitCode::SUCCESS
        }
        Command::Check => match check::run_check(&config).await {
            Ok(reports) => conclude(&reports),
            Err(err) => {
                DiagnosticsReporter::print_fatal(&err);
                ExitCode::FAILURE
            }
        },
        Command::Run { names, json } => {
            let scenarios = match resolve_scenarios(&names) {
                Ok(scenarios) => scenarios,
                Err(unknown) => {
                    eprintln!("unknown scenario: {unknown} (see `browser-smoke list`)");
                    return ExitCode::FAILURE;
                }
            };
            match run_scenarios(&config, &scenarios).await {
                Ok(reports) => {
                    if json {
                        match serde_json::to_string_pretty(&reports) {
                            Ok(out) => println!("{out}"),
                            Err(err) => tracing::error!("failed to serialize reports: {}", err),
                        }
                    }
                    conclude(&reports)
                }
                Err(err) => {
                    DiagnosticsReporter::print_fatal(&err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn resolve_scenarios(names: &[String]) -> Result<Vec<Scenario>, String> {
    if names.is_empty() {
        return Ok(catalog::all());
    }
    names
        .iter()
        .map(|name| catalog::by_name(name).ok_or_else(|| name.clone()))
        .collect()
}

/// Success covers passed and environmentally-skipped runs; any fatal
/// record fails the process.
fn conclude(reports: &[RunReport]) -> ExitCode {
    let mut failed = false;
    for report in reports {
        if report.status.is_failure() {
            DiagnosticsReporter::print_failure(report);
            failed = true;
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        println!("\nall scenarios passed or were skipped");
        ExitCode::SUCCESS
    }
}
