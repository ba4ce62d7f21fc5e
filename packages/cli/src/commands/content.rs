use crate::commands::{open_overlay, start_editing};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use folio_content::{split_full_path, ContentMutation};
use serde_json::Value;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Dot path including the section, e.g. `about.title`
    pub path: String,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Dot path including the section, e.g. `about.title`
    pub path: String,

    /// JSON value; anything that is not valid JSON is stored as a string
    pub value: String,

    /// Administrator password
    #[arg(short, long, env = "FOLIO_PASSWORD")]
    pub password: String,
}

pub fn get(args: GetArgs, cwd: &str) -> Result<()> {
    let value = read_value(&args.path, cwd)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Published value at a full path
fn read_value(path: &str, cwd: &str) -> Result<Value> {
    let config = Config::load(cwd)?;
    let overlay = open_overlay(&config, cwd)?;

    overlay
        .store()
        .published()
        .get(path)
        .cloned()
        .ok_or_else(|| anyhow!("No content at {}", path))
}

/// Write one value and save it straight away
pub fn set(args: SetArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut overlay = open_overlay(&config, cwd)?;
    start_editing(&mut overlay, &config, &args.password)?;

    let (section, field_path) = split_full_path(&args.path)?;
    let value = serde_json::from_str(&args.value).unwrap_or_else(|_| Value::String(args.value.clone()));
    let mutation = ContentMutation::SetField {
        section: section.to_string(),
        path: field_path.to_string(),
        value,
    };

    // Bound fields are decoded and validated like an in-page edit
    overlay.apply_mutation(&mutation)?;
    let (store, gate) = overlay.parts_mut();
    store.save_changes(gate)?;

    println!("  {} Saved {}", "✓".green(), args.path.bright_white());
    Ok(())
}
