//! Pronote cache - inspect and manage the local school portal cache
//!
//! A command-line front end over the file-backed TTL cache used by the school
//! portal client to avoid refetching schedule, grades, homework and messages.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pronote_cache::cli::{execute, Cli, Outcome};

/// Installs the global tracing subscriber, logging to stderr.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        "pronote_cache=debug,info"
    } else {
        "pronote_cache=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut stdout = io::stdout().lock();
    match execute(&cli, &mut stdout)? {
        Outcome::Done => Ok(ExitCode::SUCCESS),
        Outcome::Miss => Ok(ExitCode::FAILURE),
    }
}
