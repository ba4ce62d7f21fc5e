use crate::commands::open_overlay;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_render::portfolio_page;
use folio_server::{serve as serve_http, spawn_storage_sync, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

pub fn serve(args: ServeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let overlay = open_overlay(&config, cwd)?;

    let port = args.port.unwrap_or(config.http_port);
    let addr: SocketAddr = format!("{}:{}", args.host, port).parse()?;
    let storage_dir = config.get_storage_dir(cwd);
    let poll = Duration::from_secs(config.poll_interval_secs.max(1));

    println!("{}", "🌐 Starting folio server...".bright_blue().bold());
    println!("   Storage: {}", storage_dir.display());
    println!("   Listening on http://{}", addr.to_string().cyan());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let state = Arc::new(AppState::new(overlay, portfolio_page()));
        let _sync = spawn_storage_sync(state.clone(), &storage_dir, poll)?;
        serve_http(state, addr).await?;
        Ok::<(), anyhow::Error>(())
    })
}
