//! Channel management operations (`channel.*`).

use super::{optional_field, required_field};
use crate::client::Connection;
use crate::error::Result;
use serde_json::{Value, json};

/// Handle for `channel.*` operations.
pub struct Channel<'a> {
    conn: &'a Connection,
}

impl<'a> Channel<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// List all channels at the given detail level.
    ///
    /// # Errors
    ///
    /// Fails if the call fails or the result lacks the `list` field.
    pub async fn list(&self, object_detail_level: u8) -> Result<Value> {
        let result = self
            .conn
            .call(
                "channel.list",
                Some(json!({"object_detail_level": object_detail_level})),
            )
            .await?;
        required_field(result, "list")
    }

    /// Get one channel by name; `None` if no such channel.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn get(&self, channel: &str, object_detail_level: u8) -> Result<Option<Value>> {
        let result = self
            .conn
            .call(
                "channel.get",
                Some(json!({"channel": channel, "object_detail_level": object_detail_level})),
            )
            .await?;
        Ok(optional_field(result, "channel"))
    }

    /// Set and unset modes on a channel.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn set_mode(&self, channel: &str, modes: &str, parameters: &str) -> Result<Value> {
        self.conn
            .call(
                "channel.set_mode",
                Some(json!({"channel": channel, "modes": modes, "parameters": parameters})),
            )
            .await
    }

    /// Set the channel topic.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn set_topic(
        &self,
        channel: &str,
        topic: &str,
        set_by: Option<&str>,
        set_at: Option<&str>,
    ) -> Result<Value> {
        let mut params = json!({"channel": channel, "topic": topic});
        if let Some(set_by) = set_by {
            params["set_by"] = json!(set_by);
        }
        if let Some(set_at) = set_at {
            params["set_at"] = json!(set_at);
        }
        self.conn.call("channel.set_topic", Some(params)).await
    }

    /// Kick a user from the channel.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn kick(&self, channel: &str, nick: &str, reason: &str) -> Result<Value> {
        self.conn
            .call(
                "channel.kick",
                Some(json!({"nick": nick, "channel": channel, "reason": reason})),
            )
            .await
    }
}
