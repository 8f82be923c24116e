//! # huemorse-core
//!
//! Shared library for the huemorse client containing the configuration store
//! and the client-side message bounds.
//!
//! This crate has zero dependencies on network sockets, the file system, or
//! an async runtime.  The `huemorse-client` crate wires it to a TOML file and
//! to the morse server.
//!
//! # Architecture overview
//!
//! huemorse turns text into light: a remote morse server drives a smart
//! light, blinking out whatever dots and dashes it receives over TCP.  This
//! client side decides *where* to send a message and *how much* of it to send.
//!
//! - **`domain::config`** – The four settings (server address, server port,
//!   log database path, maximum message length), validated once at startup
//!   and read-only afterwards.
//!
//! - **`domain::message`** – Truncation of incoming messages to the
//!   configured bound and flattening into a single wire line.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `huemorse_core::MorseConfig` instead of `huemorse_core::domain::config::MorseConfig`.
pub use domain::config::{
    ConfigError, ConfigKey, ConfigSource, ConfigValue, MorseConfig, RawValue,
    MORSE_EXPANSION_FACTOR, REMOTE_BUFFER_SIZE,
};
pub use domain::message::{to_wire_line, truncate_message, Truncation};
