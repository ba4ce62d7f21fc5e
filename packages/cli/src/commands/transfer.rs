use crate::commands::{open_overlay, start_editing};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file (defaults to `site-content-<date>.json` in the current directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// A file produced by `folio export`
    pub file: PathBuf,

    /// Administrator password
    #[arg(short, long, env = "FOLIO_PASSWORD")]
    pub password: String,
}

pub fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let overlay = open_overlay(&config, cwd)?;

    let file = overlay.store().export_content()?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(cwd).join(&file.file_name));
    fs::write(&out, &file.contents).with_context(|| format!("Cannot write {}", out.display()))?;

    println!("  {} Exported to {}", "✓".green(), out.display());
    Ok(())
}

/// Replace all content with the file's, as the admin
pub fn import(args: ImportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut overlay = open_overlay(&config, cwd)?;
    start_editing(&mut overlay, &config, &args.password)?;

    let json = fs::read_to_string(&args.file)
        .with_context(|| format!("Cannot read {}", args.file.display()))?;
    let (store, gate) = overlay.parts_mut();
    store.import_content(gate, &json)?;

    println!(
        "  {} Imported {} sections from {}",
        "✓".green(),
        store.document().section_ids().count(),
        args.file.display()
    );
    Ok(())
}
