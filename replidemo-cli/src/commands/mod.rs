//! Subcommand implementations

pub mod compare;
pub mod ping;
pub mod schema;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use replidemo_server::ReplicationConfig;

/// Load the config file, naming the path in the error.
pub fn load_config(path: &Path) -> Result<ReplicationConfig> {
    ReplicationConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
