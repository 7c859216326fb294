//! One-shot replication comparison

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use replidemo_server::http::routes::compare::CompareResponse;
use replidemo_server::{compare, DbHandles, FailurePolicy};

use super::load_config;

/// Arguments for the compare command
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Print the same JSON the /api/compare endpoint returns
    #[arg(long)]
    pub json: bool,

    /// Fail instead of reporting 0 when a database cannot be counted
    #[arg(long)]
    pub strict: bool,
}

pub async fn run_compare(args: CompareArgs, config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let policy = if args.strict {
        FailurePolicy::Strict
    } else {
        config.failure_policy
    };

    let handles = DbHandles::connect(&config)
        .await
        .context("Failed to connect to databases")?;
    let result = compare(&handles, policy).await;
    handles.close().await;
    let comparison = result.context("Comparison failed")?;

    if args.json {
        let body = serde_json::to_string_pretty(&CompareResponse::from(&comparison))?;
        println!("{}", body);
        return Ok(());
    }

    for count in comparison.counts() {
        match &count.error {
            Some(error) => println!("{:<8} {:>8}  ({})", count.target, count.count, error),
            None => println!("{:<8} {:>8}", count.target, count.count),
        }
    }
    if comparison.is_match() {
        println!("All databases are in sync");
    } else {
        println!("Databases are NOT in sync");
    }

    Ok(())
}
