//! huemorse client entry point.
//!
//! Loads the configuration contract once, then runs one command against it.
//!
//! # Usage
//!
//! ```text
//! huemorse-client [OPTIONS] <COMMAND>
//!
//! Commands:
//!   check           Validate and print the effective configuration
//!   get <KEY>       Print one configuration value
//!   send [TEXT]...  Truncate and forward a message (stdin when no TEXT)
//!   init            Write a template config file
//! ```
//!
//! # Environment variable overrides
//!
//! Every configuration key can be overridden on the command line or through
//! the environment.  Overrides win over the config file.
//!
//! | Variable                  | Flag               |
//! |---------------------------|--------------------|
//! | `HUEMORSE_CONFIG`         | `--config`         |
//! | `HUEMORSE_SERVER_ADDRESS` | `--server-address` |
//! | `HUEMORSE_SERVER_PORT`    | `--server-port`    |
//! | `HUEMORSE_LOG_DB`         | `--log-db`         |
//! | `HUEMORSE_MAX_MSG_LENGTH` | `--max-msg-length` |
//! | `HUEMORSE_TIMEOUT`        | `--timeout`        |
//!
//! An invalid or incomplete configuration stops the process with a non-zero
//! exit code before anything is sent.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use huemorse_client::application::forward_message::ForwardMessageUseCase;
use huemorse_client::infrastructure::network::MorseServerConnection;
use huemorse_client::infrastructure::storage::config::{
    config_file_path, load_config, render_config, save_config, template_source,
};
use huemorse_core::{
    ConfigKey, ConfigSource, MorseConfig, MORSE_EXPANSION_FACTOR, REMOTE_BUFFER_SIZE,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// huemorse client.
///
/// Forwards messages to a huemorse morse server.
#[derive(Debug, Parser)]
#[command(
    name = "huemorse-client",
    about = "Forward messages to a huemorse morse server",
    version
)]
struct Cli {
    /// Path to the config file.  Defaults to the platform config directory.
    #[arg(short, long, env = "HUEMORSE_CONFIG")]
    config: Option<PathBuf>,

    /// Host name or IP address of the morse server.
    #[arg(long, env = "HUEMORSE_SERVER_ADDRESS")]
    server_address: Option<String>,

    /// TCP port of the morse server (1-65535).
    ///
    /// Taken as text so that range and format errors are reported by the
    /// configuration store against the `server_port` key.
    #[arg(long, env = "HUEMORSE_SERVER_PORT")]
    server_port: Option<String>,

    /// Path of the local log database file.
    #[arg(long, env = "HUEMORSE_LOG_DB")]
    log_db: Option<String>,

    /// Maximum message length in characters.
    #[arg(long, env = "HUEMORSE_MAX_MSG_LENGTH")]
    max_msg_length: Option<String>,

    /// Connect and send timeout in seconds.
    #[arg(long, default_value_t = 5, env = "HUEMORSE_TIMEOUT")]
    timeout: u64,

    /// Enable debug output.
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the configuration and print it as TOML.
    Check,
    /// Print one configuration value.
    Get {
        /// One of server_address, server_port, log_db, max_msg_length.
        key: String,
    },
    /// Truncate a message to max_msg_length and forward it.
    Send {
        /// Message text; words are joined with spaces.  Read from stdin when empty.
        ///
        /// Words may start with `-`, so `send -.-. ---` is a message, not flags.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Write a template config file.
    Init {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Collects the command-line and environment overrides.
    fn overrides(&self) -> ConfigSource {
        let mut source = ConfigSource::new();
        let flags = [
            (ConfigKey::ServerAddress, &self.server_address),
            (ConfigKey::ServerPort, &self.server_port),
            (ConfigKey::LogDb, &self.log_db),
            (ConfigKey::MaxMsgLength, &self.max_msg_length),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                source.set(key, value.as_str());
            }
        }
        source
    }

    /// Loads the configuration, refusing to continue when it is invalid.
    fn load(&self) -> anyhow::Result<MorseConfig> {
        let config = load_config(self.config.as_deref(), self.overrides())
            .context("refusing to start with an invalid configuration")?;

        if !config.within_remote_headroom() {
            warn!(
                "max_msg_length={} needs {} characters of server buffer \
                 ({}x expansion) but the morse server holds {}",
                config.max_msg_length(),
                config.remote_buffer_demand(),
                MORSE_EXPANSION_FACTOR,
                REMOTE_BUFFER_SIZE
            );
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `RUST_LOG` wins; otherwise `--debug` picks the default level.
    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Check => {
            let config = cli.load()?;
            print!("{}", render_config(&config)?);
        }

        Command::Get { key } => {
            let config = cli.load()?;
            let value = config.get(key)?;
            println!("{value}");
        }

        Command::Send { text } => {
            let config = Arc::new(cli.load()?);
            let message = if text.is_empty() {
                let mut buf = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut buf)
                    .await
                    .context("failed to read message from stdin")?;
                buf.trim_end_matches(['\r', '\n']).to_string()
            } else {
                text.join(" ")
            };

            let connection =
                MorseServerConnection::from_config(&config, Duration::from_secs(cli.timeout));
            let use_case = ForwardMessageUseCase::new(Arc::clone(&config), Arc::new(connection));
            use_case
                .forward(&message)
                .await
                .context("failed to forward message")?;
        }

        Command::Init { force } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => config_file_path()?,
            };
            let mut source = template_source();
            source.merge(cli.overrides());
            let config = MorseConfig::load(&source)
                .context("refusing to write an invalid configuration")?;
            save_config(&path, &config, *force)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
