//! Name ban (QLine) operations (`name_ban.*`).

use super::{optional_field, required_field};
use crate::client::Connection;
use crate::error::Result;
use serde_json::{Value, json};

/// Handle for `name_ban.*` operations.
pub struct NameBan<'a> {
    conn: &'a Connection,
}

impl<'a> NameBan<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Add a name ban. A missing `duration` means permanent.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn add(
        &self,
        name: &str,
        reason: &str,
        duration: Option<&str>,
        set_by: Option<&str>,
    ) -> Result<Option<Value>> {
        let mut params = json!({
            "name": name,
            "reason": reason,
            "duration_string": duration.unwrap_or("0"),
        });
        if let Some(set_by) = set_by {
            params["set_by"] = json!(set_by);
        }
        let result = self.conn.call("name_ban.add", Some(params)).await?;
        Ok(optional_field(result, "tkl"))
    }

    /// Delete a name ban.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn del(&self, name: &str) -> Result<Option<Value>> {
        let result = self
            .conn
            .call("name_ban.del", Some(json!({"name": name})))
            .await?;
        Ok(optional_field(result, "tkl"))
    }

    /// List all name bans.
    ///
    /// # Errors
    ///
    /// Fails if the call fails or the result lacks the `list` field.
    pub async fn list(&self) -> Result<Value> {
        let result = self.conn.call("name_ban.list", None).await?;
        required_field(result, "list")
    }

    /// Get one name ban; `None` if no such ban.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn get(&self, name: &str) -> Result<Option<Value>> {
        let result = self
            .conn
            .call("name_ban.get", Some(json!({"name": name})))
            .await?;
        Ok(optional_field(result, "tkl"))
    }
}
