//! ForwardMessageUseCase: bounds an incoming message and forwards it.
//!
//! The steps are:
//!
//! 1. Cut the message to `max_msg_length` characters.  The morse server keeps
//!    its own, larger limit, so this is a client-side courtesy.
//! 2. Flatten line breaks so the message travels as exactly one line.
//! 3. Refuse to send a blank line.
//! 4. Hand the line to the injected [`MessageSink`].
//!
//! The use case depends only on the sink trait and the immutable
//! [`MorseConfig`]; the TCP implementation lives in
//! `infrastructure::network`.

use std::sync::Arc;

use async_trait::async_trait;
use huemorse_core::{to_wire_line, truncate_message, MorseConfig};
use thiserror::Error;
use tracing::{info, warn};

/// Error type for the forward-message use case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ForwardError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Trait for delivering one wire line to the morse server.
///
/// Infrastructure implementations open a TCP connection; tests use a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Delivers `line` (without trailing newline).
    async fn deliver(&self, line: &str) -> Result<(), String>;

    /// Human-readable destination for log messages.
    fn destination(&self) -> String;
}

/// Outcome of a successful forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardReport {
    /// Characters actually sent.
    pub sent_chars: usize,
    /// Characters in the message as received.
    pub original_chars: usize,
}

impl ForwardReport {
    pub fn truncated(&self) -> bool {
        self.sent_chars < self.original_chars
    }
}

/// Forwards messages to the morse server within the configured bound.
pub struct ForwardMessageUseCase {
    config: Arc<MorseConfig>,
    sink: Arc<dyn MessageSink>,
}

impl ForwardMessageUseCase {
    pub fn new(config: Arc<MorseConfig>, sink: Arc<dyn MessageSink>) -> Self {
        Self { config, sink }
    }

    /// Truncates, flattens, and delivers `message`.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::EmptyMessage`] when nothing but whitespace is
    /// left to send, and [`ForwardError::Delivery`] when the sink fails.
    pub async fn forward(&self, message: &str) -> Result<ForwardReport, ForwardError> {
        let cut = truncate_message(message, self.config.max_msg_length());
        if cut.was_truncated() {
            warn!(
                "message of {} characters truncated to max_msg_length={}",
                cut.original_chars,
                self.config.max_msg_length()
            );
        }

        let line = to_wire_line(cut.text);
        if line.trim().is_empty() {
            return Err(ForwardError::EmptyMessage);
        }

        self.sink.deliver(&line).await.map_err(ForwardError::Delivery)?;

        info!(
            "forwarded {} characters to {}",
            cut.kept_chars,
            self.sink.destination()
        );
        Ok(ForwardReport {
            sent_chars: cut.kept_chars,
            original_chars: cut.original_chars,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
