#![forbid(unsafe_code)]

mod cmd;
mod input;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "dagplan: issue dependency scheduler",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Scheduler config file (overrides .dagplan/config.toml and the user config).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Analyze an issue file",
        long_about = "Build the dependency graph, report cycles, and compute execution order, parallel groups, critical path and the prioritized queue.",
        after_help = "EXAMPLES:\n    # Full report\n    dagplan analyze issues.yaml\n\n    # Emit machine-readable output\n    dagplan analyze issues.json --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Show parallel execution groups",
        long_about = "Partition schedulable issues into ordered groups of mutually independent issues.",
        after_help = "EXAMPLES:\n    # Groups as text\n    dagplan groups issues.yaml\n\n    # Emit machine-readable output\n    dagplan groups issues.yaml --json"
    )]
    Groups(cmd::groups::GroupsArgs),

    #[command(
        about = "Show the next issues to start",
        long_about = "List the highest-priority issues whose dependencies are all resolved.",
        after_help = "EXAMPLES:\n    # Top five ready issues\n    dagplan next issues.yaml\n\n    # Top two, as JSON\n    dagplan next issues.yaml -n 2 --json"
    )]
    Next(cmd::next::NextArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DAGPLAN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "dagplan=debug,info"
        } else {
            "dagplan=info,warn"
        })
    });

    let format = env::var("DAGPLAN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = env::current_dir()?;
    let output = OutputMode::from_json_flag(cli.json);
    let config = cli.config.as_deref();
    debug!(?output, root = %project_root.display(), "dagplan starting");

    match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, config, output, &project_root),
        Commands::Groups(args) => cmd::groups::run_groups(args, config, output, &project_root),
        Commands::Next(args) => cmd::next::run_next(args, config, output, &project_root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["dagplan", "next", "plan.yaml", "-n", "3", "--json"]);
        assert!(cli.json);
        match cli.command {
            Commands::Next(args) => {
                assert_eq!(args.count, 3);
                assert_eq!(args.input.file, PathBuf::from("plan.yaml"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
