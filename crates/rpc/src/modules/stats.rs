//! Statistics operations (`stats.*`).

use crate::client::Connection;
use crate::error::Result;
use serde_json::{Value, json};

/// Handle for `stats.*` operations.
pub struct Stats<'a> {
    conn: &'a Connection,
}

impl<'a> Stats<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Get basic statistics: user counts, channel counts, and so on.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn get(&self, object_detail_level: u8) -> Result<Value> {
        self.conn
            .call(
                "stats.get",
                Some(json!({"object_detail_level": object_detail_level})),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::scripted_connection;

    #[tokio::test]
    async fn get_returns_the_raw_result() {
        let (conn, mock) = scripted_connection();
        mock.script_result(json!({"user": {"total": 42}, "channel": {"total": 7}}));

        let stats = conn.stats().get(1).await.unwrap();

        assert_eq!(stats["user"]["total"], 42);
        assert_eq!(mock.requests()[0].method, "stats.get");
    }
}
