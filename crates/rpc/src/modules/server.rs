//! Server information operations (`server.*`).

use super::{optional_field, required_field};
use crate::client::Connection;
use crate::error::Result;
use serde_json::{Value, json};

/// Handle for `server.*` operations.
pub struct Server<'a> {
    conn: &'a Connection,
}

impl<'a> Server<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// List all servers on the network.
    ///
    /// # Errors
    ///
    /// Fails if the call fails or the result lacks the `list` field.
    pub async fn list(&self) -> Result<Value> {
        let result = self.conn.call("server.list", None).await?;
        required_field(result, "list")
    }

    /// Get one server, or the one we are connected to when `server` is
    /// `None`. Returns `None` if no such server.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn get(&self, server: Option<&str>) -> Result<Option<Value>> {
        let mut params = json!({});
        if let Some(server) = server {
            params["server"] = json!(server);
        }
        let result = self.conn.call("server.get", Some(params)).await?;
        Ok(optional_field(result, "server"))
    }
}
