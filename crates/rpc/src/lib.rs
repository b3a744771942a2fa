//! Client library for the UnrealIRCd JSON-RPC administrative API.
//!
//! Speaks JSON-RPC 2.0 over a single long-lived WebSocket connection:
//! requests are correlated to responses by a monotonically increasing id,
//! server pushes (log streams) arrive on a separate event channel, and the
//! administrative modules (users, channels, bans, spamfilters, logs) are
//! exposed as thin typed wrappers over one `call` primitive.
//!
//! # Example
//!
//! ```no_run
//! use unrealircd_rpc::Connection;
//!
//! async fn example() -> unrealircd_rpc::Result<()> {
//!     let conn = Connection::builder("wss://irc.example.test:8600/", "admin:secret")
//!         .tls_verify(false)
//!         .issuer("admin-panel")
//!         .connect()
//!         .await?;
//!
//!     if let Some(user) = conn.user().get("alice", 2).await? {
//!         println!("{user}");
//!     }
//!
//!     conn.log().subscribe(&["all"]).await?;
//!     if let Some(event) = conn.poll_event().await? {
//!         println!("{event}");
//!     }
//!
//!     conn.close().await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod modules;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use client::{Connection, ConnectionBuilder};
pub use error::{Error, ProtocolError, Result, RpcError, TransportError};
pub use modules::{
    Channel, Log, NameBan, OperOptions, Rpc, Server, ServerBan, ServerBanException, Spamfilter,
    Stats, User,
};
pub use protocol::{Inbound, RequestEnvelope};
pub use transport::{Transport, WebSocketTransport};

// Re-export the dynamic result type that is part of our public API
pub use serde_json::Value;
