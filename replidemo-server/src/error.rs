//! Error types for replidemo-server startup

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::StoreError;
use crate::target::Target;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop the process before it serves anything
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect to {target} at {endpoint}: {source}")]
    Connect {
        target: Target,
        endpoint: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("{target} at {endpoint} did not answer ping: {source}")]
    Ping {
        target: Target,
        endpoint: String,
        #[source]
        source: StoreError,
    },

    #[error("schema bootstrap failed: {0}")]
    Schema(#[source] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_error_names_target_and_endpoint() {
        let err = Error::Connect {
            target: Target::Replica,
            endpoint: "db-replica:5433".into(),
            source: sqlx::Error::PoolTimedOut,
        };
        let rendered = err.to_string();
        assert!(rendered.starts_with("failed to connect to replica at db-replica:5433"));
    }

    #[test]
    fn config_error_is_transparent() {
        let err = Error::from(ConfigError::MissingReplica);
        assert_eq!(err.to_string(), "no replica database configured");
    }
}
