//! Client error types.

use thiserror::Error;

/// Errors surfaced to callers of the client API.
///
/// Transport faults are values, not panics; the caller decides whether to
/// retry or abort. Protocol-level failures (nick collisions, join refusals)
/// are not errors at all - they arrive as classified
/// [`crate::events::Failure`] notifications.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Transport-level I/O failure (connect, send, or receive).
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Wire-level framing failure (oversized or undecodable line).
    #[error(transparent)]
    Protocol(#[from] slirc_wire::ProtocolError),

    /// Configuration could not be loaded or was invalid.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The client task is not running (all handles point at a finished
    /// client, or the event loop has exited).
    #[error("client is not running")]
    NotRunning,
}
