//! Application layer use cases for the huemorse client.
//!
//! Use cases depend on traits rather than sockets, so they can be tested
//! without a running morse server.
//!
//! - **`forward_message`** – Bounds an incoming message to the configured
//!   length and hands it to a [`forward_message::MessageSink`].

pub mod forward_message;
