//! Connectivity check

use std::path::Path;

use anyhow::{bail, Context, Result};

use replidemo_server::DbHandles;

use super::load_config;

pub async fn run_ping(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let handles = DbHandles::connect(&config)
        .await
        .context("Failed to connect to databases")?;

    let reports = handles.ping_all().await;
    handles.close().await;

    let mut failed = 0;
    for report in &reports {
        match &report.error {
            None => println!("{:<8} {:<24} ok", report.target, report.endpoint),
            Some(error) => {
                failed += 1;
                println!("{:<8} {:<24} FAILED: {}", report.target, report.endpoint, error);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} databases did not answer", failed, reports.len());
    }
    Ok(())
}
