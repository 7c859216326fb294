//! Configuration file loading
//!
//! Reads the demo's `config.toml`:
//!
//! ```toml
//! failure_policy = "best-effort"
//!
//! [master]
//! host = "localhost"
//! port = 5432
//! user = "postgres"
//! password = "postgres"
//! database = "demo"
//!
//! [[replica]]
//! host = "localhost"
//! port = 5433
//!
//! [pgcat]
//! host = "localhost"
//! port = 6432
//! ```
//!
//! Replica and proxy sections inherit credentials, database name and
//! sslmode from the master when they leave them out.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::policy::FailurePolicy;
use crate::target::Target;

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_SSLMODE: &str = "disable";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no replica database configured")]
    MissingReplica,

    #[error("[{section}] is missing required field '{field}'")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },

    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicationConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(alias = "primary")]
    pub master: EndpointConfig,

    /// Only the first entry is used
    #[serde(default)]
    pub replica: Vec<EndpointConfig>,

    #[serde(alias = "proxy")]
    pub pgcat: EndpointConfig,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub pool: PoolConfig,
}

/// One `[section]` describing a database endpoint
#[derive(Clone, Deserialize)]
pub struct EndpointConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub sslmode: Option<String>,
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("sslmode", &self.sslmode)
            .finish()
    }
}

/// `[server]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    pub bind: Option<SocketAddr>,
}

/// `[pool]` section
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_acquire_timeout_secs() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_SECS
}

/// Fully resolved connection settings for one target
#[derive(Clone)]
pub struct ConnectionSettings {
    pub target: Target,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: PgSslMode,
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("target", &self.target)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl ConnectionSettings {
    /// `host:port`, safe to log
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(self.ssl_mode)
    }
}

impl ReplicationConfig {
    /// Load and validate the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.replica.is_empty() {
            return Err(ConfigError::MissingReplica);
        }
        if self.replica.len() > 1 {
            tracing::warn!(
                configured = self.replica.len(),
                "multiple replicas configured, only the first is used"
            );
        }
        if self.pool.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pool.max_connections",
                value: "0".to_string(),
            });
        }
        // Resolving every target surfaces missing master fields and bad sslmodes up front
        for target in Target::ALL {
            self.settings(target)?;
        }
        Ok(())
    }

    fn endpoint(&self, target: Target) -> Result<&EndpointConfig, ConfigError> {
        match target {
            Target::Primary => Ok(&self.master),
            Target::Replica => self.replica.first().ok_or(ConfigError::MissingReplica),
            Target::Proxy => Ok(&self.pgcat),
        }
    }

    /// Resolve connection settings for `target`, inheriting from the master.
    pub fn settings(&self, target: Target) -> Result<ConnectionSettings, ConfigError> {
        let master = &self.master;
        let endpoint = self.endpoint(target)?;

        let user = endpoint
            .user
            .as_ref()
            .or(master.user.as_ref())
            .cloned()
            .ok_or(ConfigError::MissingField {
                section: "master",
                field: "user",
            })?;
        let database = endpoint
            .database
            .as_ref()
            .or(master.database.as_ref())
            .cloned()
            .ok_or(ConfigError::MissingField {
                section: "master",
                field: "database",
            })?;
        let password = endpoint
            .password
            .as_ref()
            .or(master.password.as_ref())
            .cloned()
            .unwrap_or_default();
        let sslmode = endpoint
            .sslmode
            .as_deref()
            .or(master.sslmode.as_deref())
            .unwrap_or(DEFAULT_SSLMODE);
        let ssl_mode = PgSslMode::from_str(sslmode).map_err(|_| ConfigError::InvalidValue {
            field: "sslmode",
            value: sslmode.to_string(),
        })?;

        Ok(ConnectionSettings {
            target,
            host: endpoint.host.clone(),
            port: endpoint.port,
            user,
            password,
            database,
            ssl_mode,
        })
    }
}
