//! Error types for the RPC client.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for RPC operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for RPC operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level errors (connect failure, socket closed, frame fault).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol-level errors (envelope shape violations, unexpected result
    /// shapes).
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A well-formed failure reported by the server.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// No matching response arrived within the deadline.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Transport-specific errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to establish the WebSocket connection.
    #[error("Failed to connect to {url}: {reason}")]
    ConnectFailed {
        /// The URL we tried to connect to.
        url: String,
        /// What went wrong during the handshake.
        reason: String,
    },

    /// The target URL could not be parsed or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// TLS configuration failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The connection is closed: a close frame was received, the stream
    /// ended, or a prior fault shut the transport down.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Socket-level fault while sending or receiving.
    #[error("WebSocket error: {0}")]
    Socket(String),
}

/// Protocol-level errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Failed to serialize an outbound request.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An inbound frame was not valid JSON.
    #[error("Malformed JSON frame: {0}")]
    MalformedFrame(String),

    /// Decodable JSON that lacks the required JSON-RPC envelope shape.
    #[error("Invalid JSON-RPC envelope: {0}")]
    InvalidEnvelope(&'static str),

    /// A result object was missing a field the method is defined to return.
    #[error("Unexpected response shape: missing field `{0}`")]
    MissingField(&'static str),
}

/// A failure reported by the server, with its code and message preserved
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct RpcError {
    /// Numeric error code from the server.
    pub code: i64,
    /// Human-readable error message from the server.
    pub message: String,
}
