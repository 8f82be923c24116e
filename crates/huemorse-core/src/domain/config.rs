//! The huemorse configuration store.
//!
//! Four named settings drive the client:
//!
//! | Key              | Type      | Constraint                          |
//! |------------------|-----------|-------------------------------------|
//! | `server_address` | text      | non-empty, no whitespace            |
//! | `server_port`    | integer   | 1..=65535                           |
//! | `log_db`         | path      | non-empty                           |
//! | `max_msg_length` | integer   | greater than zero                   |
//!
//! Outer layers collect raw values into a [`ConfigSource`] (from a TOML file,
//! environment variables, command-line flags) and call [`MorseConfig::load`]
//! exactly once.  The resulting [`MorseConfig`] is immutable: there is no
//! setter, and a restart is the only way to change a value.  Share it as
//! `Arc<MorseConfig>`; readers on any thread need no lock.
//!
//! # Failure semantics
//!
//! Loading fails fast on the first bad key, in the order listed above.  No
//! default is ever substituted for a missing key.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// Number of characters the morse server can hold in its light-driver buffer.
pub const REMOTE_BUFFER_SIZE: usize = 524_288;

/// Worst-case growth of a text message once spelled out in dots and dashes.
///
/// The server's own limit should stay this many times above
/// `max_msg_length`.
pub const MORSE_EXPANSION_FACTOR: usize = 7;

/// Error type for the configuration store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required key was not supplied, or an unknown key was requested.
    #[error("missing configuration key `{key}`")]
    Missing { key: String },

    /// A supplied value failed a structural check.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    /// The key this error refers to.
    pub fn key(&self) -> &str {
        match self {
            ConfigError::Missing { key } | ConfigError::Invalid { key, .. } => key,
        }
    }

    fn missing(key: ConfigKey) -> Self {
        ConfigError::Missing {
            key: key.as_str().to_string(),
        }
    }

    fn invalid(key: ConfigKey, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.as_str().to_string(),
            reason: reason.into(),
        }
    }
}

// ── Keys and raw values ───────────────────────────────────────────────────────

/// The four configuration keys, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    /// Host name or IP address of the morse server.
    ServerAddress,
    /// TCP port of the morse server.
    ServerPort,
    /// Path of the local log database file.
    LogDb,
    /// Character bound applied to incoming messages before forwarding.
    MaxMsgLength,
}

impl ConfigKey {
    /// Every key, in the order [`MorseConfig::load`] checks them.
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::ServerAddress,
        ConfigKey::ServerPort,
        ConfigKey::LogDb,
        ConfigKey::MaxMsgLength,
    ];

    /// The key's name as it appears in config files and in [`MorseConfig::get`].
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::ServerAddress => "server_address",
            ConfigKey::ServerPort => "server_port",
            ConfigKey::LogDb => "log_db",
            ConfigKey::MaxMsgLength => "max_msg_length",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    /// Parses a key name.  Unknown names are reported as
    /// [`ConfigError::Missing`]: there is no such value to hand out.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::Missing { key: s.to_string() })
    }
}

/// An unvalidated value as it arrives from a file, the environment, or a flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Integer(i64),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Integer(n)
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        RawValue::Integer(i64::from(n))
    }
}

/// Raw key/value pairs gathered before validation.
///
/// Sources are layered with [`ConfigSource::merge`]: the file first, then
/// overrides on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
    values: BTreeMap<ConfigKey, RawValue>,
}

impl ConfigSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any earlier value.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<RawValue>) -> &mut Self {
        self.values.insert(key, value.into());
        self
    }

    /// Builder-style variant of [`ConfigSource::set`].
    pub fn with(mut self, key: ConfigKey, value: impl Into<RawValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Returns the raw value for `key`, if one was supplied.
    pub fn get(&self, key: ConfigKey) -> Option<&RawValue> {
        self.values.get(&key)
    }

    /// Layers `other` on top of `self`.  Keys present in `other` win.
    pub fn merge(&mut self, other: ConfigSource) {
        self.values.extend(other.values);
    }

    /// Number of keys supplied.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no key was supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the supplied keys in validation order.
    pub fn iter(&self) -> impl Iterator<Item = (ConfigKey, &RawValue)> {
        self.values.iter().map(|(key, value)| (*key, value))
    }
}

// ── Typed values ──────────────────────────────────────────────────────────────

/// A validated value returned by [`MorseConfig::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigValue<'a> {
    Text(&'a str),
    Integer(u64),
    Path(&'a Path),
}

impl<'a> ConfigValue<'a> {
    pub fn as_integer(&self) -> Option<u64> {
        match *self {
            ConfigValue::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&'a Path> {
        match *self {
            ConfigValue::Path(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Text(s) => f.write_str(s),
            ConfigValue::Integer(n) => write!(f, "{n}"),
            ConfigValue::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

// ── The store ─────────────────────────────────────────────────────────────────

/// The validated, immutable huemorse configuration.
///
/// # Example
///
/// ```rust
/// use huemorse_core::{ConfigKey, ConfigSource, ConfigValue, MorseConfig};
///
/// let source = ConfigSource::new()
///     .with(ConfigKey::ServerAddress, "192.168.1.200")
///     .with(ConfigKey::ServerPort, 22042)
///     .with(ConfigKey::LogDb, "huemorse.db")
///     .with(ConfigKey::MaxMsgLength, 10000);
///
/// let cfg = MorseConfig::load(&source).unwrap();
/// assert_eq!(cfg.get("server_port").unwrap(), ConfigValue::Integer(22042));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorseConfig {
    server_address: String,
    server_port: u16,
    log_db: PathBuf,
    max_msg_length: usize,
}

impl MorseConfig {
    /// Validates `source` and builds the store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for the first absent key and
    /// [`ConfigError::Invalid`] for the first value that fails its check.
    pub fn load(source: &ConfigSource) -> Result<Self, ConfigError> {
        let server_address = validate_address(require(source, ConfigKey::ServerAddress)?)?;
        let server_port = validate_port(require(source, ConfigKey::ServerPort)?)?;
        let log_db = validate_log_db(require(source, ConfigKey::LogDb)?)?;
        let max_msg_length = validate_max_length(require(source, ConfigKey::MaxMsgLength)?)?;

        Ok(Self {
            server_address,
            server_port,
            log_db,
            max_msg_length,
        })
    }

    /// Looks up a value by key name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `name` is not one of the four keys.
    pub fn get(&self, name: &str) -> Result<ConfigValue<'_>, ConfigError> {
        let key: ConfigKey = name.parse()?;
        Ok(self.value(key))
    }

    /// Typed lookup by key.
    pub fn value(&self, key: ConfigKey) -> ConfigValue<'_> {
        match key {
            ConfigKey::ServerAddress => ConfigValue::Text(&self.server_address),
            ConfigKey::ServerPort => ConfigValue::Integer(u64::from(self.server_port)),
            ConfigKey::LogDb => ConfigValue::Path(&self.log_db),
            ConfigKey::MaxMsgLength => ConfigValue::Integer(self.max_msg_length as u64),
        }
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn log_db(&self) -> &Path {
        &self.log_db
    }

    pub fn max_msg_length(&self) -> usize {
        self.max_msg_length
    }

    /// Host and port of the morse server, ready for a `connect` call.
    pub fn server_endpoint(&self) -> (&str, u16) {
        (&self.server_address, self.server_port)
    }

    /// Characters the server must be able to buffer for one maximal message.
    pub fn remote_buffer_demand(&self) -> usize {
        self.max_msg_length.saturating_mul(MORSE_EXPANSION_FACTOR)
    }

    /// Whether a maximal message still fits the server's buffer once encoded.
    ///
    /// A `false` here is not a load error; callers decide whether to warn.
    pub fn within_remote_headroom(&self) -> bool {
        self.remote_buffer_demand() <= REMOTE_BUFFER_SIZE
    }

    /// Converts back into raw values, e.g. for writing a config file.
    ///
    /// Loading the returned source yields an equal `MorseConfig`.
    pub fn to_source(&self) -> ConfigSource {
        ConfigSource::new()
            .with(ConfigKey::ServerAddress, self.server_address.as_str())
            .with(ConfigKey::ServerPort, i64::from(self.server_port))
            .with(ConfigKey::LogDb, self.log_db.to_string_lossy().into_owned())
            .with(
                ConfigKey::MaxMsgLength,
                i64::try_from(self.max_msg_length).unwrap_or(i64::MAX),
            )
    }
}

// ── Validation helpers ────────────────────────────────────────────────────────

fn require(source: &ConfigSource, key: ConfigKey) -> Result<(ConfigKey, &RawValue), ConfigError> {
    source
        .get(key)
        .map(|value| (key, value))
        .ok_or_else(|| ConfigError::missing(key))
}

/// Extracts non-blank text exactly as supplied.
fn non_empty_text((key, value): (ConfigKey, &RawValue)) -> Result<&str, ConfigError> {
    match value {
        RawValue::Text(s) if s.trim().is_empty() => {
            Err(ConfigError::invalid(key, "must not be empty"))
        }
        RawValue::Text(s) => Ok(s),
        RawValue::Integer(n) => Err(ConfigError::invalid(
            key,
            format!("expected text, found integer {n}"),
        )),
    }
}

/// Extracts an integer; text is accepted when it parses after trimming.
fn integer((key, value): (ConfigKey, &RawValue)) -> Result<i64, ConfigError> {
    match value {
        RawValue::Integer(n) => Ok(*n),
        RawValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::invalid(key, format!("`{s}` is not an integer"))),
    }
}

fn validate_address(raw: (ConfigKey, &RawValue)) -> Result<String, ConfigError> {
    let key = raw.0;
    let address = non_empty_text(raw)?;
    if address.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid(
            key,
            format!("`{address}` must not contain whitespace"),
        ));
    }
    Ok(address.to_string())
}

fn validate_port(raw: (ConfigKey, &RawValue)) -> Result<u16, ConfigError> {
    let key = raw.0;
    let n = integer(raw)?;
    match u16::try_from(n) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::invalid(
            key,
            format!("port {n} is outside 1..=65535"),
        )),
    }
}

fn validate_log_db(raw: (ConfigKey, &RawValue)) -> Result<PathBuf, ConfigError> {
    non_empty_text(raw).map(PathBuf::from)
}

fn validate_max_length(raw: (ConfigKey, &RawValue)) -> Result<usize, ConfigError> {
    let key = raw.0;
    let n = integer(raw)?;
    if n <= 0 {
        return Err(ConfigError::invalid(
            key,
            format!("must be a positive integer, got {n}"),
        ));
    }
    usize::try_from(n).map_err(|_| ConfigError::invalid(key, format!("{n} is too large")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_source() -> ConfigSource {
        ConfigSource::new()
            .with(ConfigKey::ServerAddress, "192.168.1.200")
            .with(ConfigKey::ServerPort, 22042)
            .with(ConfigKey::LogDb, "huemorse.db")
            .with(ConfigKey::MaxMsgLength, 10000)
    }

    fn load_with(key: ConfigKey, value: impl Into<RawValue>) -> Result<MorseConfig, ConfigError> {
        MorseConfig::load(&reference_source().with(key, value))
    }

    fn assert_invalid(result: Result<MorseConfig, ConfigError>, expected_key: &str) {
        match result {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected Invalid for {expected_key}, got {other:?}"),
        }
    }

    // ── Happy path ────────────────────────────────────────────────────────────

    #[test]
    fn test_reference_values_load() {
        // Arrange / Act
        let cfg = MorseConfig::load(&reference_source()).expect("load");

        // Assert
        assert_eq!(cfg.server_address(), "192.168.1.200");
        assert_eq!(cfg.server_port(), 22042);
        assert_eq!(cfg.log_db(), Path::new("huemorse.db"));
        assert_eq!(cfg.max_msg_length(), 10000);
    }

    #[test]
    fn test_get_returns_integers_for_numeric_keys() {
        let cfg = MorseConfig::load(&reference_source()).unwrap();

        assert_eq!(cfg.get("server_port").unwrap(), ConfigValue::Integer(22042));
        assert_eq!(cfg.get("max_msg_length").unwrap(), ConfigValue::Integer(10000));
    }

    #[test]
    fn test_get_returns_text_and_path() {
        let cfg = MorseConfig::load(&reference_source()).unwrap();

        assert_eq!(
            cfg.get("server_address").unwrap().as_text(),
            Some("192.168.1.200")
        );
        assert_eq!(
            cfg.get("log_db").unwrap().as_path(),
            Some(Path::new("huemorse.db"))
        );
    }

    #[test]
    fn test_get_unknown_key_is_missing() {
        let cfg = MorseConfig::load(&reference_source()).unwrap();

        let err = cfg.get("bridge_ip").unwrap_err();

        assert_eq!(
            err,
            ConfigError::Missing {
                key: "bridge_ip".to_string()
            }
        );
    }

    #[test]
    fn test_port_bounds_are_inclusive() {
        assert_eq!(load_with(ConfigKey::ServerPort, 1).unwrap().server_port(), 1);
        assert_eq!(
            load_with(ConfigKey::ServerPort, 65535).unwrap().server_port(),
            65535
        );
    }

    #[test]
    fn test_numeric_text_is_accepted_for_integers() {
        // Arrange: environment variables always arrive as text
        let cfg = MorseConfig::load(
            &reference_source()
                .with(ConfigKey::ServerPort, " 8080 ")
                .with(ConfigKey::MaxMsgLength, "42"),
        )
        .unwrap();

        // Assert
        assert_eq!(cfg.server_port(), 8080);
        assert_eq!(cfg.max_msg_length(), 42);
    }

    #[test]
    fn test_padded_address_is_invalid() {
        assert_invalid(
            load_with(ConfigKey::ServerAddress, "  morse.local "),
            "server_address",
        );
    }

    #[test]
    fn test_padded_log_db_comes_back_unchanged() {
        // Arrange
        let cfg = load_with(ConfigKey::LogDb, " huemorse.db").unwrap();

        // Act
        let value = cfg.get("log_db").unwrap();

        // Assert
        assert_eq!(value.as_path(), Some(Path::new(" huemorse.db")));
        assert_eq!(cfg.log_db(), Path::new(" huemorse.db"));
    }

    // ── Invalid values ────────────────────────────────────────────────────────

    #[test]
    fn test_port_zero_is_invalid() {
        assert_invalid(load_with(ConfigKey::ServerPort, 0), "server_port");
    }

    #[test]
    fn test_port_65536_is_invalid() {
        assert_invalid(load_with(ConfigKey::ServerPort, 65536), "server_port");
    }

    #[test]
    fn test_port_70000_is_invalid_and_names_the_key() {
        let err = load_with(ConfigKey::ServerPort, 70000).unwrap_err();

        assert_eq!(err.key(), "server_port");
        assert!(err.to_string().contains("70000"), "got: {err}");
    }

    #[test]
    fn test_non_numeric_port_is_invalid() {
        assert_invalid(load_with(ConfigKey::ServerPort, "twenty"), "server_port");
    }

    #[test]
    fn test_empty_address_is_invalid() {
        assert_invalid(load_with(ConfigKey::ServerAddress, ""), "server_address");
        assert_invalid(load_with(ConfigKey::ServerAddress, "   "), "server_address");
    }

    #[test]
    fn test_address_with_inner_whitespace_is_invalid() {
        assert_invalid(
            load_with(ConfigKey::ServerAddress, "192.168.1.200 22042"),
            "server_address",
        );
    }

    #[test]
    fn test_integer_address_is_invalid() {
        assert_invalid(load_with(ConfigKey::ServerAddress, 42), "server_address");
    }

    #[test]
    fn test_empty_log_db_is_invalid() {
        assert_invalid(load_with(ConfigKey::LogDb, ""), "log_db");
    }

    #[test]
    fn test_zero_and_negative_max_length_are_invalid() {
        assert_invalid(load_with(ConfigKey::MaxMsgLength, 0), "max_msg_length");
        assert_invalid(load_with(ConfigKey::MaxMsgLength, -5), "max_msg_length");
    }

    // ── Missing keys ──────────────────────────────────────────────────────────

    #[test]
    fn test_each_missing_key_is_reported() {
        for missing in ConfigKey::ALL {
            // Arrange: every key except `missing`
            let mut source = ConfigSource::new();
            for (key, value) in reference_source().iter() {
                if key != missing {
                    source.set(key, value.clone());
                }
            }

            // Act
            let err = MorseConfig::load(&source).unwrap_err();

            // Assert
            assert_eq!(
                err,
                ConfigError::Missing {
                    key: missing.as_str().to_string()
                }
            );
        }
    }

    #[test]
    fn test_first_bad_key_wins() {
        // Arrange: both address and port are bad; address is checked first
        let source = reference_source()
            .with(ConfigKey::ServerAddress, "")
            .with(ConfigKey::ServerPort, 0);

        // Act
        let err = MorseConfig::load(&source).unwrap_err();

        // Assert
        assert_eq!(err.key(), "server_address");
    }

    // ── Source layering ───────────────────────────────────────────────────────

    #[test]
    fn test_merge_overrides_key_by_key() {
        // Arrange
        let mut base = reference_source();
        let overrides = ConfigSource::new().with(ConfigKey::ServerPort, "9000");

        // Act
        base.merge(overrides);
        let cfg = MorseConfig::load(&base).unwrap();

        // Assert
        assert_eq!(cfg.server_port(), 9000);
        assert_eq!(cfg.server_address(), "192.168.1.200");
    }

    #[test]
    fn test_to_source_reloads_to_equal_config() {
        let cfg = MorseConfig::load(&reference_source()).unwrap();

        let reloaded = MorseConfig::load(&cfg.to_source()).unwrap();

        assert_eq!(cfg, reloaded);
    }

    #[test]
    fn test_key_names_parse_back() {
        for key in ConfigKey::ALL {
            assert_eq!(key.as_str().parse::<ConfigKey>().unwrap(), key);
        }
    }

    // ── Remote headroom ───────────────────────────────────────────────────────

    #[test]
    fn test_reference_length_fits_remote_buffer() {
        let cfg = MorseConfig::load(&reference_source()).unwrap();

        assert_eq!(cfg.remote_buffer_demand(), 70000);
        assert!(cfg.within_remote_headroom());
    }

    #[test]
    fn test_huge_length_still_loads_but_exceeds_headroom() {
        let cfg = load_with(ConfigKey::MaxMsgLength, 100_000).unwrap();

        assert!(!cfg.within_remote_headroom());
    }

    #[test]
    fn test_value_display() {
        let cfg = MorseConfig::load(&reference_source()).unwrap();

        assert_eq!(cfg.value(ConfigKey::ServerPort).to_string(), "22042");
        assert_eq!(cfg.value(ConfigKey::LogDb).to_string(), "huemorse.db");
    }
}
