mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, blocks, init, inspect, render, ApplyArgs, BlocksArgs, InitArgs, InspectArgs, RenderArgs,
};
use tracing_subscriber::EnvFilter;

/// Blockpage CLI - Inspect, render and script block pages
#[derive(Parser, Debug)]
#[command(name = "blockpage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor internals (same as RUST_LOG=debug)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and a starter page
    Init(InitArgs),

    /// Print the block outline of a page
    Inspect(InspectArgs),

    /// Resolve a page for a viewport into a render tree
    Render(RenderArgs),

    /// Replay a mutation script against a page
    Apply(ApplyArgs),

    /// List registered block types
    Blocks(BlocksArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Inspect(args) => inspect(args, &cwd),
        Command::Render(args) => render(args, &cwd),
        Command::Apply(args) => apply(args, &cwd),
        Command::Blocks(args) => blocks(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
