//! c6 CLI - ask questions about the c6 database in plain language.

use c6_ai::{C6Config, Context};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use tracing::debug;

mod commands;

/// c6 - turn questions into SQLite queries with a local LLM
#[derive(Parser)]
#[command(name = "c6")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question about the database
    Ask {
        /// The question, in plain language
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        question: Vec<String>,
    },

    /// Check that the local database can be opened
    Ping,

    /// Open a read-only SQL shell on the database
    Sql,

    /// Download the latest database and model
    Update,

    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

/// The command to run, or `None` when only the usage should be printed.
fn command_to_run(cli: Cli) -> Option<Commands> {
    match cli.command {
        None => None,
        Some(Commands::Unknown(args)) => {
            debug!("Unknown command: {:?}", args);
            None
        }
        Some(Commands::Ask { question }) if question.is_empty() => None,
        Some(command) => Some(command),
    }
}

/// Parse the command line. Anything unrecognized means usage; only
/// `--help` and `--version` come back as errors for clap to print.
fn parse_command<I, T>(args: I) -> Result<Option<Commands>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(command_to_run(cli)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => Err(e),
        Err(e) => {
            debug!("Unrecognized arguments: {:?}", e.kind());
            Ok(None)
        }
    }
}

fn usage() -> String {
    Cli::command().render_help().to_string()
}

fn main() -> miette::Result<()> {
    // Set up logging
    let filter = tracing_subscriber::EnvFilter::try_from_env("C6_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let command = match parse_command(std::env::args_os()) {
        Ok(command) => command,
        Err(e) => e.exit(),
    };
    let Some(command) = command else {
        eprintln!("{}", usage());
        return Ok(());
    };

    let config = C6Config::from_env().map_err(|e| miette::miette!("{}", e))?;
    let (mut out, mut log) = (std::io::stdout(), std::io::stderr());
    let mut ctx = Context::new(&config, &mut out, &mut log);

    match command {
        Commands::Ask { question } => commands::ask::run(&mut ctx, &question.join(" ")),
        Commands::Ping => commands::ping::run(&mut ctx),
        Commands::Sql => commands::sql::run(&ctx),
        Commands::Update => commands::update::run(&mut ctx),
        Commands::Unknown(_) => Ok(()),
    }
}
