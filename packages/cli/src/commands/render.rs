use crate::commands::open_overlay;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_render::{portfolio_page, render_published, RenderOptions};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Write HTML to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Page title
    #[arg(short, long, default_value = "Portfolio")]
    pub title: String,

    /// Emit compact HTML without indentation
    #[arg(long)]
    pub compact: bool,
}

/// Render the published page as a visitor sees it
pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let overlay = open_overlay(&config, cwd)?;

    let options = RenderOptions {
        pretty: !args.compact,
        title: args.title,
        ..Default::default()
    };
    let html = render_published(&portfolio_page(), &overlay, options)?;

    match args.out {
        Some(out) => {
            fs::write(&out, html)?;
            println!("  {} Rendered {}", "✓".green(), out.display());
        }
        None => println!("{}", html),
    }

    Ok(())
}
