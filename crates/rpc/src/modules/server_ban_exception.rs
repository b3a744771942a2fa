//! Server ban exception operations (`server_ban_exception.*`).

use super::{optional_field, required_field};
use crate::client::Connection;
use crate::error::Result;
use serde_json::{Value, json};

/// Handle for `server_ban_exception.*` operations.
pub struct ServerBanException<'a> {
    conn: &'a Connection,
}

impl<'a> ServerBanException<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Add a ban exception.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn add(
        &self,
        name: &str,
        exception_types: &str,
        reason: &str,
        set_by: Option<&str>,
        duration: Option<&str>,
    ) -> Result<Option<Value>> {
        let mut params = json!({
            "name": name,
            "exception_types": exception_types,
            "reason": reason,
        });
        if let Some(set_by) = set_by {
            params["set_by"] = json!(set_by);
        }
        if let Some(duration) = duration {
            params["duration_string"] = json!(duration);
        }
        let result = self.conn.call("server_ban_exception.add", Some(params)).await?;
        Ok(optional_field(result, "tkl"))
    }

    /// Delete a ban exception.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn del(&self, name: &str) -> Result<Option<Value>> {
        let result = self
            .conn
            .call("server_ban_exception.del", Some(json!({"name": name})))
            .await?;
        Ok(optional_field(result, "tkl"))
    }

    /// List all ban exceptions.
    ///
    /// # Errors
    ///
    /// Fails if the call fails or the result lacks the `list` field.
    pub async fn list(&self) -> Result<Value> {
        let result = self.conn.call("server_ban_exception.list", None).await?;
        required_field(result, "list")
    }

    /// Get one ban exception; `None` if no such exception.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn get(&self, name: &str) -> Result<Option<Value>> {
        let result = self
            .conn
            .call("server_ban_exception.get", Some(json!({"name": name})))
            .await?;
        Ok(optional_field(result, "tkl"))
    }
}
