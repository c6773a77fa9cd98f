//! Intcode command-line driver.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage, input or parse error
//! - 3: Runtime error

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "intcode", version, about = "Run Intcode programs")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a program to completion and print its outputs
    Run {
        /// Comma-separated program file
        program: PathBuf,
        /// Input value, may be repeated
        #[arg(short, long = "input", allow_negative_numbers = true)]
        inputs: Vec<i64>,
        /// Overwrite a memory cell before running (ADDR=VALUE)
        #[arg(long = "set", value_parser = commands::parse_patch)]
        patches: Vec<(usize, i64)>,
        /// Print a memory cell after the program halts
        #[arg(long = "dump")]
        dumps: Vec<usize>,
    },
    /// Exchange lines of text with an ASCII program
    Ascii {
        program: PathBuf,
        /// Read input lines from this file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,
        /// Overwrite a memory cell before running (ADDR=VALUE)
        #[arg(long = "set", value_parser = commands::parse_patch)]
        patches: Vec<(usize, i64)>,
    },
    /// Run an amplifier pipeline, one stage per phase
    Chain {
        program: PathBuf,
        /// Phase settings, comma separated
        #[arg(long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
        phases: Vec<i64>,
        /// Loop the last stage back into the first until it halts
        #[arg(long)]
        feedback: bool,
        /// Try every ordering of the phases and report the best
        #[arg(long)]
        search: bool,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    let result = match &cli.command {
        Command::Run {
            program,
            inputs,
            patches,
            dumps,
        } => commands::run(program, inputs, patches, dumps),
        Command::Ascii {
            program,
            script,
            patches,
        } => commands::ascii(program, script.as_ref(), patches),
        Command::Chain {
            program,
            phases,
            feedback,
            search,
        } => commands::chain(program, phases, *feedback, *search),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Log to stderr. `-v` flags win over `RUST_LOG`; the default is `warn`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
