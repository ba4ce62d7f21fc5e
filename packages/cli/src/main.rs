mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    export, get, import, init, render, serve, set, ExportArgs, GetArgs, ImportArgs, InitArgs,
    RenderArgs, ServeArgs, SetArgs,
};
use tracing_subscriber::EnvFilter;

/// Folio - edit your portfolio's content in place
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create folio.config.json and the storage directory
    Init(InitArgs),

    /// Print the published value at a path
    Get(GetArgs),

    /// Set a value and save it
    Set(SetArgs),

    /// Write all content to a JSON file
    Export(ExportArgs),

    /// Replace all content from a JSON file
    Import(ImportArgs),

    /// Render the published page to HTML
    Render(RenderArgs),

    /// Serve the site with the editing overlay
    Serve(ServeArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Get(args) => get(args, &cwd),
        Command::Set(args) => set(args, &cwd),
        Command::Export(args) => export(args, &cwd),
        Command::Import(args) => import(args, &cwd),
        Command::Render(args) => render(args, &cwd),
        Command::Serve(args) => serve(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
