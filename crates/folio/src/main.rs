//! Folio CLI - block-based page engine.
//!
//! Provides commands for:
//! - `serve`: Start the site and editor API server
//! - `blocks`: List the block palette
//! - `page`: Create, list, publish and delete pages
//! - `block`: Add, move, remove and edit blocks on a page
//! - `render`: Render a page as HTML or a text outline

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BlockCommand, BlocksArgs, PageCommand, RenderArgs, ServeArgs};
use error::CliError;
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Folio - block-based page engine.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server.
    Serve(ServeArgs),
    /// List available block types.
    Blocks(BlocksArgs),
    /// Page commands.
    #[command(subcommand)]
    Page(PageCommand),
    /// Block editing commands.
    #[command(subcommand)]
    Block(BlockCommand),
    /// Render a page.
    Render(RenderArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Serve(args) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(args.execute(VERSION))
        }
        Commands::Blocks(args) => args.execute(),
        Commands::Page(cmd) => cmd.execute(),
        Commands::Block(cmd) => cmd.execute(),
        Commands::Render(args) => args.execute(),
    }
}
