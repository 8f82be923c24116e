//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML file from the platform config
//! directory (or an explicit path), layers command-line overrides on top, and
//! hands the result to [`huemorse_core::MorseConfig::load`].  It can also write
//! a template file for first-time setup.

pub mod config;
