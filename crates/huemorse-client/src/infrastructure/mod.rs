//! Infrastructure layer for the huemorse client.
//!
//! Everything that touches the outside world lives here:
//!
//! - **`storage`** – Reading and writing the TOML configuration file.
//! - **`network`** – The TCP connection to the morse server.

pub mod network;
pub mod storage;
