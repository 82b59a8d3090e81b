//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::load_config;

pub async fn cmd_serve(
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    let config = load_config()?;

    println!("🚀 Starting Penny web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!("   AI backend: {}", config.ai.backend);
    println!("   Search backend: {}", config.search.backend);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !allowed_origins.is_empty() {
        println!("   CORS origins: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   Sessions are kept in memory and expire after 30 minutes of inactivity.");
    println!("   Press Ctrl+C to stop");

    let static_dir_str = static_dir
        .map(|p| {
            p.to_str()
                .context("static_dir path must be valid UTF-8")
        })
        .transpose()?;

    let server = penny_server::ServerConfig { allowed_origins };
    penny_server::serve_with_config(config, host, port, static_dir_str, server).await?;

    Ok(())
}
