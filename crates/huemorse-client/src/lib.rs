//! huemorse-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! ```text
//! main.rs          CLI: check / get / send / init
//!   application/   ForwardMessageUseCase (truncate, flatten, deliver)
//!   infrastructure/
//!     storage/     TOML config file ↔ huemorse_core::ConfigSource
//!     network/     TCP connection to the morse server
//! ```

pub mod application;
pub mod infrastructure;
