mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{import, init, show, ImportArgs, InitArgs, ShowArgs};
use tracing_subscriber::EnvFilter;

/// Ara CLI - Import images into audit notes
#[derive(Parser, Debug)]
#[command(name = "ara")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a media config file in the current directory
    Init(InitArgs),

    /// Import images (files or URLs) into a document
    Import(ImportArgs),

    /// Print the blocks of a document with their positions
    Show(ShowArgs),
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Import(args) => import(args, &cwd).await,
        Command::Show(args) => show(args, &cwd),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
