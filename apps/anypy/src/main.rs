#![warn(clippy::pedantic)]

//! # anypy
//!
//! Creates a Python virtual environment with a standalone build of any
//! supported Python version.
//!
//! The interpreter is downloaded once into `~/.cache/anypy`, extracted into
//! `{location}/.py-{version}`, and then used to create `{location}/.venv`
//! with access to its site packages.
//!
//! ## Examples
//!
//! Create `.py-3.12.7/` and `.venv/` in the current directory:
//! ```bash
//! anypy 3.12.7
//! ```
//!
//! Only download the interpreter:
//! ```bash
//! anypy 3.11.9 --python-only
//! ```

mod commands;
mod errors;
mod toolchain;

use std::ffi::OsString;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser};
use commands::provision;
use tracing_subscriber::EnvFilter;

/// Version string shown by `--version`: git commit and build target.
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("ANYPY_GIT_COMMIT"),
    " ",
    env!("ANYPY_BUILD_TARGET"),
    ")"
);

/// Create a Python virtual environment with a standalone version of Python.
#[derive(Parser, Debug)]
#[command(
    name = "anypy",
    version,
    long_version = LONG_VERSION,
    about = "Create a Python Virtual Environment with a standalone version of Python"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub provision: provision::ProvisionArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

/// Prints an error with its cause chain and returns the exit code.
fn handle_error(e: &anyhow::Error) -> i32 {
    eprintln!("Error: {e:?}");
    1
}

async fn run() -> Result<()> {
    let cli = parse_cli(std::env::args_os());
    init_logging(cli.verbose);

    provision::execute(&cli.provision).await
}

/// Parses the command line, with the supported versions listed after the help.
fn parse_cli<I>(args: I) -> Cli
where
    I: IntoIterator<Item = OsString>,
{
    let matches = Cli::command()
        .after_help(after_help())
        .get_matches_from(normalize_args(args));
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Options whose next argument is a value, never a flag.
const VALUE_OPTIONS: [&str; 4] = ["-l", "--location", "-a", "--arch"];

/// Rewrites the two-letter short flag `-py` to `--python-only`.
///
/// Single-dash flags are one character for clap, so `-py` would otherwise be
/// read as `-p -y`. Values of `VALUE_OPTIONS` and everything after `--` are
/// passed through untouched.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut normalized = Vec::new();
    let mut expects_value = false;
    let mut positional_only = false;

    for arg in args {
        let rewrite = !positional_only && !expects_value && arg == "-py";
        expects_value = !positional_only && VALUE_OPTIONS.iter().any(|opt| arg == *opt);
        positional_only = positional_only || arg == "--";

        normalized.push(if rewrite {
            OsString::from("--python-only")
        } else {
            arg
        });
    }

    normalized
}

fn after_help() -> String {
    let versions: Vec<&str> = toolchain::registry::versions().collect();
    format!(
        "\
Supported Python versions: {}

ENVIRONMENT VARIABLES:
    ANYPY_CACHE_DIR         Download cache (default: ~/.cache/anypy)
    ANYPY_DIST_SERVER       Release download base URL (default: {})
    RUST_LOG                Log filter, overrides -v",
        versions.join(", "),
        toolchain::resolver::DEFAULT_DIST_SERVER,
    )
}

/// Initializes stderr logging: 0 = warn, 1 = info, 2+ = debug.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("anypy=warn"),
        1 => EnvFilter::new("anypy=info"),
        _ => EnvFilter::new("anypy=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
