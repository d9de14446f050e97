//! nestkv command interpreter.
//!
//! Reads commands from stdin (or a script file) and writes results to stdout.
//! Logs go to stderr, filtered by `RUST_LOG` or `--log-level`.

use clap::Parser;
use nestkv::{Repl, ReplConfig, Session, SessionConfig, StoreConfig};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// In-memory key-value store with nested transactions.
#[derive(Parser)]
#[command(name = "nestkv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Read commands from this file instead of stdin
    script: Option<PathBuf>,

    /// Prompt written before each command
    #[arg(long, default_value = "> ")]
    prompt: String,

    /// Never write a prompt
    #[arg(long)]
    no_prompt: bool,

    /// Accept command names in any case
    #[arg(short, long)]
    ignore_case: bool,

    /// Log filter, e.g. "debug" or "nestkv=trace" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.log_level {
        Some(ref level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let session = Session::with_config(SessionConfig {
        store: StoreConfig::default(),
        ignore_case: cli.ignore_case,
    });

    let interactive = cli.script.is_none() && io::stdin().is_terminal();
    let repl = Repl::new(
        session,
        ReplConfig {
            prompt: cli.prompt,
            show_prompt: interactive && !cli.no_prompt,
        },
    );

    let stdout = io::stdout();
    let result = match cli.script {
        Some(ref path) => match File::open(path) {
            Ok(file) => repl.run(BufReader::new(file), stdout.lock()),
            Err(e) => {
                eprintln!("Error opening {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => repl.run(io::stdin().lock(), stdout.lock()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
