//! adif-edit CLI
//!
//! Add or update one field in every record of an ADIF file.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use adif_edit::{Config, Mode, Outcome, Request, Session};
use adif_edit::prompt::Prompter;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adif-edit")]
#[command(author = "Christian Claborne <n1clc@hamninja.net>")]
#[command(version)]
#[command(about = "Add or update one field in every record of an ADIF file")]
#[command(after_help = "Anything left out is prompted for; answer q at any prompt to quit.")]
struct Cli {
    /// ADIF file to read
    input: Option<PathBuf>,

    /// File to write (must differ from the input)
    output: Option<PathBuf>,

    /// Field value, normally an activity such as SOTA or POTA
    value: Option<String>,

    /// Field to add or update (default: OTHER)
    field_name: Option<String>,

    /// Use the default output file, value and field name without confirming
    #[arg(short = 'f', long, short_alias = 'F')]
    force: bool,

    /// Like --force, then also set the grid-square field in a second file
    #[arg(short = 'c', long, short_alias = 'C', conflicts_with = "force")]
    chase: bool,

    /// Read settings from this file instead of the standard locations
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log more detail to stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::load_with_overrides().context("Failed to load config")?,
    };

    let mode = if cli.chase {
        Mode::Chase
    } else if cli.force {
        Mode::Force
    } else {
        Mode::Interactive
    };

    let request = Request {
        input: cli.input,
        output: cli.output,
        value: cli.value,
        field_name: cli.field_name,
        mode,
    };

    let program = std::env::args().next().unwrap_or_else(|| String::from("adif-edit"));
    let stdin = io::stdin();
    let prompter = Prompter::new(stdin.lock(), io::stdout());
    let mut session = Session::new(&config, prompter).with_program(program);

    match session.run(request).context("Error processing file")? {
        Outcome::Completed(report) => {
            tracing::debug!(?report, "done");
        }
        Outcome::Cancelled | Outcome::Quit => {}
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
