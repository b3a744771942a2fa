//! JSON-RPC 2.0 envelope types.

use crate::error::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version string carried in every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request envelope.
///
/// `params` is omitted from the wire representation entirely when absent,
/// which is how UnrealIRCd expects parameterless methods to be called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Dot-namespaced method name, e.g. `user.get`.
    pub method: String,
    /// Method parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Client-chosen correlation id, unique among outstanding requests.
    pub id: u64,
}

impl RequestEnvelope {
    /// Create a request envelope for the given method, parameters and id.
    pub fn new(method: impl Into<String>, params: Option<Value>, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// Classification of an inbound frame.
///
/// Every decodable frame is exactly one of these; anything else is a
/// [`crate::error::ProtocolError`].
#[derive(Debug)]
pub enum Inbound {
    /// A response correlated to a client-issued request id.
    Reply {
        /// The correlation id the server echoed back.
        id: u64,
        /// The decoded `result`, or the server-reported `error`.
        outcome: std::result::Result<Value, RpcError>,
    },
    /// A server push carrying an event payload (no correlation id). Log
    /// streams arrive this way.
    Push(Value),
    /// A server push reporting an error with no correlation id.
    PushError(RpcError),
}
