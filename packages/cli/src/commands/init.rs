use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_content::{AdminCredentials, DirectoryStorage};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Administrator email
    #[arg(short, long)]
    pub email: String,

    /// Administrator password (only its SHA-256 digest is stored)
    #[arg(short, long, env = "FOLIO_PASSWORD")]
    pub password: String,

    /// Storage directory
    #[arg(short, long, default_value = ".folio")]
    pub storage_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing folio site...".bright_blue().bold());

    let config = Config {
        storage_dir: args.storage_dir.clone(),
        admin: AdminCredentials::new(args.email.trim(), &args.password),
        ..Config::default()
    };

    // Create storage directory if it doesn't exist
    let storage_dir = config.get_storage_dir(cwd);
    if !storage_dir.exists() {
        DirectoryStorage::open(&storage_dir)?;
        println!("  {} Created {}/", "✓".green(), args.storage_dir);
    }

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Site initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: folio set about.title '\"Hello\"'");
    println!("  2. Run: folio serve");
    println!("  3. Sign in as {} to edit in place", config.admin.email);

    Ok(())
}
