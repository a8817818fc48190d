//! Patio Tiling Planner CLI
//!
//! Reads a `Solve` request as JSON (from a file or stdin), runs the core,
//! and writes the resulting `Solve` message as JSON (to a file or stdout).
//! Progress ticks are logged via `tracing` rather than mixed into the JSON
//! output stream.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;

use patio_tiler::problem::{ProgressEvent, ProgressSink};
use patio_tiler::{driver, SolveRequest};

/// Solves a patio tiling `Solve` request.
#[derive(Parser)]
#[command(name = "patio-tiler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON `Solve` request. Reads stdin if omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path to write the JSON `Solve` message to. Writes stdout if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

/// Forwards every progress tick to a `tracing` event at debug level.
struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&mut self, event: ProgressEvent) {
        tracing::debug!(nodes = event.nodes, found = event.found, "search progress");
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let request: SolveRequest = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, "failed to parse solve request");
            let message = patio_tiler::SolveMessage::Error {
                message: format!("failed to parse solve request: {e}"),
            };
            write_output(&cli, &message)?;
            std::process::exit(1);
        }
    };

    let mut sink = TracingSink;
    let message = driver::solve(&request, &mut sink);
    write_output(&cli, &message)
}

fn write_output(cli: &Cli, message: &patio_tiler::SolveMessage) -> io::Result<()> {
    let text = if cli.pretty {
        serde_json::to_string_pretty(message).expect("SolveMessage always serializes")
    } else {
        serde_json::to_string(message).expect("SolveMessage always serializes")
    };

    match &cli.output {
        Some(path) => fs::write(path, text),
        None => {
            let mut stdout = io::stdout();
            writeln!(stdout, "{text}")
        }
    }
}
