//! Network infrastructure for the huemorse client.
//!
//! The morse server speaks a one-shot protocol: it accepts a TCP connection,
//! reads a single line, queues it for the light, and closes the connection.
//! [`MorseServerConnection`] mirrors that:
//!
//! ```text
//! client                          morse server
//! ──────                          ────────────
//! connect(address:port)   ───►
//! "<payload>\n"           ───►    queue payload
//! shutdown(write)         ───►
//!                         ◄───    close
//! ```
//!
//! Each step is bounded by the configured timeout so a dead server cannot
//! hang the client.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use huemorse_core::MorseConfig;
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time,
};
use tracing::{debug, info};

use crate::application::forward_message::MessageSink;

/// Errors that can occur talking to the morse server.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// TCP connection to the server failed.
    #[error("failed to connect to morse server at {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: io::Error,
    },
    /// An I/O error occurred on the established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] io::Error),
    /// The server did not accept or close the connection in time.
    #[error("morse server at {target} did not respond within {after:?}")]
    Timeout { target: String, after: Duration },
}

/// A sender of single lines to the morse server.
///
/// Holds no open socket; every [`MorseServerConnection::send_line`] call
/// opens and closes its own connection.
#[derive(Debug, Clone)]
pub struct MorseServerConnection {
    host: String,
    port: u16,
    timeout: Duration,
}

impl MorseServerConnection {
    /// Creates a connection description for `host:port`.
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Targets the server named by `config`.
    pub fn from_config(config: &MorseConfig, timeout: Duration) -> Self {
        let (host, port) = config.server_endpoint();
        Self::new(host, port, timeout)
    }

    /// `host:port` for log and error messages; IPv6 literals get brackets.
    pub fn target(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Sends `line` followed by a newline and waits for the server to close.
    ///
    /// Host names are resolved by tokio.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Connect`] if the server is unreachable,
    /// [`ConnectionError::Timeout`] if either the connect or the exchange
    /// exceeds the timeout, and [`ConnectionError::Io`] for write failures.
    pub async fn send_line(&self, line: &str) -> Result<(), ConnectionError> {
        let target = self.target();
        let timeout_err = || ConnectionError::Timeout {
            target: target.clone(),
            after: self.timeout,
        };

        let mut stream = time::timeout(
            self.timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        .map_err(|_| timeout_err())?
        .map_err(|source| ConnectionError::Connect {
            target: target.clone(),
            source,
        })?;
        debug!("connected to morse server at {target}");

        time::timeout(self.timeout, exchange(&mut stream, line))
            .await
            .map_err(|_| timeout_err())??;

        info!("sent {} bytes to morse server at {target}", line.len() + 1);
        Ok(())
    }
}

/// Writes one line, half-closes, then drains until the server hangs up.
async fn exchange(stream: &mut TcpStream, line: &str) -> Result<(), ConnectionError> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await?;
    stream.shutdown().await?;

    let mut scratch = [0u8; 256];
    loop {
        match stream.read(&mut scratch).await {
            Ok(0) => return Ok(()),
            Ok(n) => debug!("ignoring {n} unexpected bytes from morse server"),
            // The server may reset instead of closing once it has the line.
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => return Ok(()),
            Err(e) => return Err(e.into()),
        }
    }
}

#[async_trait]
impl MessageSink for MorseServerConnection {
    async fn deliver(&self, line: &str) -> Result<(), String> {
        self.send_line(line).await.map_err(|e| e.to_string())
    }

    fn destination(&self) -> String {
        self.target()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
