use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use scriptsweep::{Analyzer, Config, Reporter, UsagePolicy};

/// ScriptSweep - Find unused MonoBehaviour scripts and dump scene hierarchies
#[derive(Parser, Debug)]
#[command(name = "scriptsweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the Unity project to analyze
    project: PathBuf,

    /// Directory receiving hierarchy dumps and the unused-script CSV
    output: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Usage policy: strict (field names must match) or preserve (script existence is enough)
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Also write a JSON report to this file
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    Preserve,
    Strict,
}

impl From<PolicyArg> for UsagePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Preserve => UsagePolicy::Preserve,
            PolicyArg::Strict => UsagePolicy::Strict,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("ScriptSweep v{}", env!("CARGO_PKG_VERSION"));

    if !cli.project.exists() {
        return Err(miette::miette!(
            "Project path not found: {}",
            cli.project.display()
        ));
    }

    let config = load_config(&cli)?;
    run_analysis(&config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(&cli.project)?
    };

    // Override with CLI arguments
    if let Some(policy) = cli.policy {
        config.usage.policy = policy.into();
    }

    Ok(config)
}

fn run_analysis(config: &Config, cli: &Cli) -> Result<()> {
    let start_time = Instant::now();

    info!("Usage policy: {}", config.usage.policy);

    let report = Analyzer::new(config)
        .with_progress(!cli.quiet)
        .run(&cli.project, &cli.output)
        .into_diagnostic()?;

    let reporter = Reporter::new(&cli.output, &config.report.csv_name)
        .with_json(cli.json.clone())
        .with_terminal(!cli.quiet);
    reporter.report(&report, &cli.project)?;

    if !cli.quiet {
        println!(
            "{}",
            format!(
                "Wrote {} hierarchy dumps and {} in {:.2}s",
                report.scenes_processed(),
                reporter.csv_path().display(),
                start_time.elapsed().as_secs_f64()
            )
            .dimmed()
        );
    }

    Ok(())
}
