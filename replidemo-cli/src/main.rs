//! replidemo CLI - PostgreSQL replication demo
//!
//! Entry point for the `replidemo` binary:
//! - `serve`: web page and JSON API routing chats to primary/replica/PgCat
//! - `compare`: one-shot row-count comparison across all targets
//! - `ping`: connectivity check for every configured database
//! - `init-schema`: create the chat table on the primary

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "replidemo",
    author,
    version,
    about = "PostgreSQL primary/replica replication demo with PgCat routing",
    long_about = "Serve a small web page that writes chat messages through the primary, the \
                  replica or a PgCat proxy, and compare row counts to watch replication catch up."
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "REPLIDEMO_CONFIG",
        default_value = "config.toml"
    )]
    config: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces via OpenTelemetry OTLP
    #[cfg(feature = "telemetry")]
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web UI and JSON API
    Serve(commands::serve::ServeArgs),
    /// Compare chat row counts across primary, replica and PgCat
    Compare(commands::compare::CompareArgs),
    /// Check connectivity to every configured database
    Ping,
    /// Create the chat table on the primary
    InitSchema,
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl From<Shell> for clap_complete::Shell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let tracing_config = tracing_setup::TracingConfig {
        debug: cli.debug,
        #[cfg(feature = "telemetry")]
        otel: cli.otel,
        #[cfg(not(feature = "telemetry"))]
        otel: false,
        quiet: !matches!(cli.command, Commands::Serve(_)),
    };
    tracing_setup::init(&tracing_config)?;

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run_serve(args, &cli.config).await,
        Commands::Compare(args) => commands::compare::run_compare(args, &cli.config).await,
        Commands::Ping => commands::ping::run_ping(&cli.config).await,
        Commands::InitSchema => commands::schema::run_init_schema(&cli.config).await,
        Commands::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(
                clap_complete::Shell::from(args.shell),
                &mut cmd,
                "replidemo",
                &mut io::stdout(),
            );
            Ok(())
        }
    };

    tracing_setup::shutdown_otel();
    result
}
