//! Spamfilter operations (`spamfilter.*`).

use super::{optional_field, required_field};
use crate::client::Connection;
use crate::error::Result;
use serde_json::{Value, json};

/// Handle for `spamfilter.*` operations.
pub struct Spamfilter<'a> {
    conn: &'a Connection,
}

impl<'a> Spamfilter<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Add a spamfilter.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn add(
        &self,
        name: &str,
        match_type: &str,
        spamfilter_targets: &str,
        ban_action: &str,
        ban_duration: &str,
        reason: &str,
    ) -> Result<Option<Value>> {
        let result = self
            .conn
            .call(
                "spamfilter.add",
                Some(json!({
                    "name": name,
                    "match_type": match_type,
                    "spamfilter_targets": spamfilter_targets,
                    "ban_action": ban_action,
                    "ban_duration": ban_duration,
                    "reason": reason,
                })),
            )
            .await?;
        Ok(optional_field(result, "tkl"))
    }

    /// Delete a spamfilter.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn del(
        &self,
        name: &str,
        match_type: &str,
        spamfilter_targets: &str,
        ban_action: &str,
    ) -> Result<Option<Value>> {
        let result = self
            .conn
            .call(
                "spamfilter.del",
                Some(json!({
                    "name": name,
                    "match_type": match_type,
                    "spamfilter_targets": spamfilter_targets,
                    "ban_action": ban_action,
                })),
            )
            .await?;
        Ok(optional_field(result, "tkl"))
    }

    /// List all spamfilters.
    ///
    /// # Errors
    ///
    /// Fails if the call fails or the result lacks the `list` field.
    pub async fn list(&self) -> Result<Value> {
        let result = self.conn.call("spamfilter.list", None).await?;
        required_field(result, "list")
    }

    /// Get one spamfilter; `None` if no such filter.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn get(
        &self,
        name: &str,
        match_type: &str,
        spamfilter_targets: &str,
        ban_action: &str,
    ) -> Result<Option<Value>> {
        let result = self
            .conn
            .call(
                "spamfilter.get",
                Some(json!({
                    "name": name,
                    "match_type": match_type,
                    "spamfilter_targets": spamfilter_targets,
                    "ban_action": ban_action,
                })),
            )
            .await?;
        Ok(optional_field(result, "tkl"))
    }
}
