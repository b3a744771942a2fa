//! Transport abstraction for the RPC connection.
//!
//! A transport owns one bidirectional message-framed socket. Writes are
//! serialized behind the implementation's own lock; reads are consumed by a
//! single receive loop. Specific implementations live in submodules.

pub mod websocket;

#[cfg(test)]
pub(crate) mod mock;

use crate::error::Result;
use async_trait::async_trait;

pub use websocket::WebSocketTransport;

/// A bidirectional message-framed connection.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one text frame.
    ///
    /// Safe to invoke concurrently; physical writes are serialized so frames
    /// never interleave.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or the write fails.
    async fn send(&self, text: String) -> Result<()>;

    /// Receive the next text frame, blocking until one arrives.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TransportError::ConnectionClosed`] once a
    /// close frame is received or the stream ends, and a socket error on any
    /// other fault. All subsequent operations fail the same way.
    async fn recv(&self) -> Result<String>;

    /// Send a protocol-level keepalive probe, where the transport has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or the write fails.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake cannot be sent.
    async fn close(&self) -> Result<()>;
}
