//! HTTP server command
//!
//! Loads the config, opens the three database handles and serves the demo
//! until Ctrl+C/SIGTERM.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use replidemo_server::db::{bootstrap_schema, DbHandles};
use replidemo_server::http::{run_server, ServerConfig};
use replidemo_server::FailurePolicy;

use super::load_config;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides [server].bind; default 0.0.0.0:8080)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Override the configured failure policy (best-effort or strict)
    #[arg(long)]
    pub failure_policy: Option<FailurePolicy>,

    /// Create the chat table on the primary before serving
    #[arg(long, conflicts_with = "memory")]
    pub init_schema: bool,

    /// Serve from an in-memory store instead of PostgreSQL (config file not read)
    #[arg(long)]
    pub memory: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: &Path) -> Result<()> {
    let (handles, policy, bind) = if args.memory {
        tracing::warn!("Serving from in-memory store; no PostgreSQL involved");
        (
            DbHandles::in_memory(),
            args.failure_policy.unwrap_or_default(),
            args.bind,
        )
    } else {
        let config = load_config(config_path)?;

        if args.init_schema {
            bootstrap_schema(&config)
                .await
                .context("Failed to create chat table on primary")?;
        }

        let handles = DbHandles::connect(&config)
            .await
            .context("Failed to connect to databases")?;

        (
            handles,
            args.failure_policy.unwrap_or(config.failure_policy),
            args.bind.or(config.server.bind),
        )
    };

    let server_config = ServerConfig {
        bind_addr: bind.unwrap_or_else(|| ServerConfig::default().bind_addr),
        cors_permissive: args.cors_permissive,
    };

    run_server(handles, policy, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
