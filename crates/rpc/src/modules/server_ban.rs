//! Server ban (TKL) operations (`server_ban.*`).

use super::{optional_field, required_field};
use crate::client::Connection;
use crate::error::Result;
use serde_json::{Value, json};

/// Handle for `server_ban.*` operations.
pub struct ServerBan<'a> {
    conn: &'a Connection,
}

impl<'a> ServerBan<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Add a ban. Returns the created TKL, or `None` if the server did not
    /// echo one back.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn add(
        &self,
        name: &str,
        ban_type: &str,
        duration: &str,
        reason: &str,
    ) -> Result<Option<Value>> {
        let result = self
            .conn
            .call(
                "server_ban.add",
                Some(json!({
                    "name": name,
                    "type": ban_type,
                    "reason": reason,
                    "duration_string": duration,
                })),
            )
            .await?;
        Ok(optional_field(result, "tkl"))
    }

    /// Delete a ban.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn del(&self, name: &str, ban_type: &str) -> Result<Option<Value>> {
        let result = self
            .conn
            .call(
                "server_ban.del",
                Some(json!({"name": name, "type": ban_type})),
            )
            .await?;
        Ok(optional_field(result, "tkl"))
    }

    /// List all bans.
    ///
    /// # Errors
    ///
    /// Fails if the call fails or the result lacks the `list` field.
    pub async fn list(&self) -> Result<Value> {
        let result = self.conn.call("server_ban.list", None).await?;
        required_field(result, "list")
    }

    /// Get one ban; `None` if no such ban.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn get(&self, name: &str, ban_type: &str) -> Result<Option<Value>> {
        let result = self
            .conn
            .call(
                "server_ban.get",
                Some(json!({"name": name, "type": ban_type})),
            )
            .await?;
        Ok(optional_field(result, "tkl"))
    }
}
