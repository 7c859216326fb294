//! Schema bootstrap command

use std::path::Path;

use anyhow::{Context, Result};

use replidemo_server::db::bootstrap_schema;

use super::load_config;

pub async fn run_init_schema(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    bootstrap_schema(&config)
        .await
        .context("Failed to create chat table on primary")?;

    println!(
        "chat table ready on {}:{}",
        config.master.host, config.master.port
    );
    Ok(())
}
