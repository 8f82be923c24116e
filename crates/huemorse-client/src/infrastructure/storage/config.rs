//! TOML-based configuration file for the huemorse client.
//!
//! Reads the four settings from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\HueMorse\config.toml`
//! - Linux:    `~/.config/huemorse/config.toml`
//! - macOS:    `~/Library/Application Support/HueMorse/config.toml`
//!
//! The file is flat:
//!
//! ```toml
//! server_address = "192.168.1.200"
//! server_port = 22042
//! log_db = "huemorse.db"
//! max_msg_length = 10000
//! ```
//!
//! Absent keys are *not* filled with defaults here.  They stay absent in the
//! [`ConfigSource`] so that [`MorseConfig::load`] reports them as missing.
//! Unknown keys (e.g. a misspelt `server_prot`) are rejected by the parser.

use std::path::{Path, PathBuf};

use huemorse_core::{ConfigError, ConfigKey, ConfigSource, MorseConfig, RawValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The values were read but do not form a valid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `save_config` refused to replace an existing file.
    #[error("config file already exists at {path}")]
    AlreadyExists { path: PathBuf },
}

// ── Config file schema ────────────────────────────────────────────────────────

/// On-disk layout of the config file.
///
/// Values stay as raw [`toml::Value`]s so that a port written as a string or
/// a length written as a float reaches the store's validation and is reported
/// against its key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_address: Option<toml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_port: Option<toml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_db: Option<toml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_msg_length: Option<toml::Value>,
}

impl ConfigFile {
    /// Converts the file contents into raw values for the store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] (wrapped) for a value that is neither
    /// a string nor an integer.
    pub fn into_source(self) -> Result<ConfigSource, StorageError> {
        let mut source = ConfigSource::new();
        let entries = [
            (ConfigKey::ServerAddress, self.server_address),
            (ConfigKey::ServerPort, self.server_port),
            (ConfigKey::LogDb, self.log_db),
            (ConfigKey::MaxMsgLength, self.max_msg_length),
        ];

        for (key, value) in entries {
            let raw = match value {
                None => continue,
                Some(toml::Value::String(s)) => RawValue::Text(s),
                Some(toml::Value::Integer(n)) => RawValue::Integer(n),
                Some(other) => {
                    return Err(ConfigError::Invalid {
                        key: key.as_str().to_string(),
                        reason: format!("expected a string or integer, found {}", other.type_str()),
                    }
                    .into())
                }
            };
            source.set(key, raw);
        }
        Ok(source)
    }
}

impl From<&MorseConfig> for ConfigFile {
    fn from(config: &MorseConfig) -> Self {
        let mut file = ConfigFile::default();
        for (key, raw) in config.to_source().iter() {
            let value = match raw {
                RawValue::Text(s) => toml::Value::String(s.clone()),
                RawValue::Integer(n) => toml::Value::Integer(*n),
            };
            match key {
                ConfigKey::ServerAddress => file.server_address = Some(value),
                ConfigKey::ServerPort => file.server_port = Some(value),
                ConfigKey::LogDb => file.log_db = Some(value),
                ConfigKey::MaxMsgLength => file.max_msg_length = Some(value),
            }
        }
        file
    }
}

/// The values `init` writes into a fresh config file.
///
/// These are the stock huemorse settings: a morse server on the LAN at the
/// standard port, a local `huemorse.db`, and a 10000-character bound.
pub fn template_source() -> ConfigSource {
    ConfigSource::new()
        .with(ConfigKey::ServerAddress, "192.168.1.200")
        .with(ConfigKey::ServerPort, 22042)
        .with(ConfigKey::LogDb, "huemorse.db")
        .with(ConfigKey::MaxMsgLength, 10000)
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, StorageError> {
    platform_config_dir().ok_or(StorageError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, StorageError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Parses config file text into raw values.
///
/// # Errors
///
/// Returns [`StorageError::Parse`] for malformed TOML or unknown keys.
pub fn parse_config(content: &str) -> Result<ConfigSource, StorageError> {
    let file: ConfigFile = toml::from_str(content)?;
    file.into_source()
}

/// Reads raw values from `path`.
///
/// When `required` is `false`, a missing file yields an empty source.
///
/// # Errors
///
/// Returns [`StorageError::Io`] for file-system errors (including "not found"
/// when `required`), and [`StorageError::Parse`] if the TOML is malformed.
pub fn read_config_file(path: &Path, required: bool) -> Result<ConfigSource, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!("read config file {}", path.display());
            parse_config(&content)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            debug!("no config file at {}", path.display());
            Ok(ConfigSource::new())
        }
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads and validates the configuration.
///
/// `path` is the explicit `--config` location, if any; otherwise the platform
/// default is used and may be absent.  `overrides` are layered on top of the
/// file key by key.
///
/// # Errors
///
/// Returns [`StorageError::Config`] when a key is missing or invalid after
/// layering, and the file errors described on [`read_config_file`].
pub fn load_config(
    path: Option<&Path>,
    overrides: ConfigSource,
) -> Result<MorseConfig, StorageError> {
    let mut source = match path {
        Some(explicit) => read_config_file(explicit, true)?,
        None => match config_file_path() {
            Ok(default) => read_config_file(&default, false)?,
            // Without a platform directory, overrides alone must carry the config.
            Err(StorageError::NoPlatformConfigDir) => ConfigSource::new(),
            Err(e) => return Err(e),
        },
    };
    source.merge(overrides);

    let config = MorseConfig::load(&source)?;
    info!(
        "configuration loaded: server={}:{}, log_db={}, max_msg_length={}",
        config.server_address(),
        config.server_port(),
        config.log_db().display(),
        config.max_msg_length()
    );
    Ok(config)
}

/// Renders `config` as config file text.
///
/// # Errors
///
/// Returns [`StorageError::Serialize`] if serialization fails.
pub fn render_config(config: &MorseConfig) -> Result<String, StorageError> {
    Ok(toml::to_string_pretty(&ConfigFile::from(config))?)
}

/// Persists `config` to `path`.
///
/// Creates the parent directory if needed.  An existing file is only replaced
/// when `overwrite` is set.
///
/// # Errors
///
/// Returns [`StorageError::AlreadyExists`], [`StorageError::Io`] for
/// file-system failures, or [`StorageError::Serialize`].
pub fn save_config(path: &Path, config: &MorseConfig, overwrite: bool) -> Result<(), StorageError> {
    if path.exists() && !overwrite {
        return Err(StorageError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = render_config(config)?;
    std::fs::write(path, content).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote config file {}", path.display());
    Ok(())
}

/// Resolves the platform config base directory including the `huemorse` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("HueMorse"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("huemorse"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("HueMorse")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
