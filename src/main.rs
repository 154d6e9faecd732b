use clap::{Parser, Subcommand};
use puzzle_gen::{config, generate, output};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "puzzle-gen")]
#[command(about = "Publish a daily-puzzle content table as versioned JSON files")]
#[command(long_about = "\
Publish a daily-puzzle content table as versioned JSON files

Each row of the content table (CSV or TSV, one puzzle per day) becomes
puzzles/{dateKey}.v{version}.json, and manifest.json is updated to point at
the latest version of every day.

Versions are bumped automatically: the table stores a content hash per row,
and when a row's content no longer matches its stored hash the version is
incremented and a new file is written. Old versions are never deleted.

Paths and column names come from puzzle-gen.toml in the working directory
(or --config), and flags override both.

Run 'puzzle-gen gen-config' to generate a documented puzzle-gen.toml.
Set RUST_LOG=debug to see per-row decisions on stderr.")]
#[command(version)]
struct Cli {
    /// Content table (CSV or TSV)
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Output directory for puzzle files
    #[arg(long, global = true)]
    puzzles: Option<PathBuf>,

    /// Manifest file (must already exist)
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Config file (defaults to ./puzzle-gen.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write puzzle files, update the manifest and table (default)
    Generate,
    /// Validate the content table without writing anything
    Check,
    /// Print a stock puzzle-gen.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command.as_ref().unwrap_or(&Command::Generate) {
        Command::Generate => {
            let run_config = resolve_run_config(&cli)?;
            let report = generate::generate(&run_config)?;
            output::print_generate_report(&report);
        }
        Command::Check => {
            let run_config = resolve_run_config(&cli)?;
            let report = generate::check(&run_config)?;
            output::print_check_report(&report, &run_config.csv_path);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Layer stock defaults, the config file, and CLI flags.
fn resolve_run_config(cli: &Cli) -> Result<config::GenerateConfig, config::ConfigError> {
    let working_dir = std::env::current_dir()?;
    let tool_config = config::load_config(cli.config.as_deref(), &working_dir)?;
    Ok(config::GenerateConfig::resolve(
        tool_config,
        cli.csv.clone(),
        cli.puzzles.clone(),
        cli.manifest.clone(),
        cli.dry_run,
    ))
}
