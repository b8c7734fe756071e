//! Monitors: coding-practice scoring CLI

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use monitors::config::{load_config, AuthorFormat, UntrackedPolicy};
use monitors::monitor::{self, MonitorKind};
use monitors::reporter::JsonReporter;
use monitors::logging;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Score each developer's coding practices from a repository and its Git history
#[derive(Parser, Debug)]
#[command(name = "monitors")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Monitor to run
    #[arg(value_enum)]
    monitor: MonitorKind,

    /// Repository working tree to analyze
    repo_path: PathBuf,

    /// Restrict the analysis to these files (default: walk the repository)
    files: Vec<PathBuf>,

    /// Path to config file (default: search .monitorsrc.json in the repository and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug); logs go to stderr
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// What to do with files that have no commit history
    #[arg(long, value_enum, value_name = "POLICY")]
    on_untracked: Option<UntrackedPolicy>,

    /// How to render git_author
    #[arg(long, value_enum, value_name = "FORMAT")]
    author_format: Option<AuthorFormat>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = load_config(&args.repo_path, args.config.as_deref())?
        .merge_with_cli(args.on_untracked, args.author_format);
    debug!(?config, "effective config");

    let report = monitor::run(args.monitor, &args.repo_path, &args.files, &config)?;
    println!("{}", JsonReporter::new().pretty().report(&report)?);
    Ok(ExitCode::SUCCESS)
}
