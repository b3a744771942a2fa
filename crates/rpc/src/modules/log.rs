//! Log retrieval and streaming operations (`log.*`).
//!
//! Subscribing selects which log sources the server pushes; the pushed
//! events themselves arrive via [`Connection::poll_event`].

use super::optional_field;
use crate::client::Connection;
use crate::error::Result;
use serde_json::{Value, json};

/// Handle for `log.*` operations.
pub struct Log<'a> {
    conn: &'a Connection,
}

impl<'a> Log<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Subscribe to log events from the given sources. Any previous
    /// subscription is overwritten.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn subscribe(&self, sources: &[&str]) -> Result<Value> {
        self.conn
            .call("log.subscribe", Some(json!({"sources": sources})))
            .await
    }

    /// Unsubscribe from all log events.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn unsubscribe(&self) -> Result<Value> {
        self.conn.call("log.unsubscribe", None).await
    }

    /// Get past log events, optionally filtered by source. Returns `None`
    /// when the server has no log backlog.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn list(&self, sources: Option<&[&str]>) -> Result<Option<Value>> {
        let mut params = json!({});
        if let Some(sources) = sources {
            params["sources"] = json!(sources);
        }
        let result = self.conn.call("log.list", Some(params)).await?;
        Ok(optional_field(result, "list"))
    }
}
