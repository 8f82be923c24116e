//! Domain entities for huemorse.
//!
//! Pure business rules with no infrastructure dependencies: nothing in here
//! opens a socket, reads a file, or looks at the environment.  Outer layers
//! gather raw values and hand them in; the domain validates and answers.

/// The configuration store.
///
/// See [`config::MorseConfig`] for the main type.
pub mod config;

/// Client-side message bounds.
pub mod message;
