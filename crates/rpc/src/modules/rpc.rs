//! RPC meta-operations (`rpc.*`).

use crate::client::Connection;
use crate::error::Result;
use serde_json::{Value, json};

/// Server-side timer ids are generated above the range regular query ids
/// realistically reach, so the timer's recurring responses stay
/// distinguishable.
const TIMER_ID_FLOOR: u64 = 100_000;
const TIMER_ID_CEILING: u64 = 1_000_000;

/// Handle for `rpc.*` meta-operations.
pub struct Rpc<'a> {
    conn: &'a Connection,
}

impl<'a> Rpc<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Get information on all RPC modules loaded by the server.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn info(&self) -> Result<Value> {
        self.conn.call("rpc.info", None).await
    }

    /// Set the name of the issuer performing the requests (UnrealIRCd
    /// 6.0.8+).
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn set_issuer(&self, name: &str) -> Result<Value> {
        self.conn
            .call("rpc.set_issuer", Some(json!({"name": name})))
            .await
    }

    /// Register a server-side timer that invokes `method` with `params`
    /// every `every_msec` milliseconds (UnrealIRCd 6.1.0+).
    ///
    /// The nested request's `request_id` is used by the server for each
    /// recurring invocation; when `None` one is generated above the regular
    /// query-id range.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn add_timer(
        &self,
        timer_id: &str,
        every_msec: u64,
        method: &str,
        params: Option<Value>,
        request_id: Option<u64>,
    ) -> Result<Value> {
        let request_id =
            request_id.unwrap_or_else(|| fastrand::u64(TIMER_ID_FLOOR..TIMER_ID_CEILING));
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": request_id,
        });
        self.conn
            .call(
                "rpc.add_timer",
                Some(json!({
                    "timer_id": timer_id,
                    "every_msec": every_msec,
                    "request": request,
                })),
            )
            .await
    }

    /// Cancel a server-side timer by its id (UnrealIRCd 6.1.0+).
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn del_timer(&self, timer_id: &str) -> Result<Value> {
        self.conn
            .call("rpc.del_timer", Some(json!({"timer_id": timer_id})))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::scripted_connection;

    #[tokio::test]
    async fn add_timer_nests_a_full_request_envelope() {
        let (conn, mock) = scripted_connection();
        mock.script_result(json!(true));

        conn.rpc()
            .add_timer(
                "stats-poll",
                1000,
                "stats.get",
                Some(json!({"object_detail_level": 1})),
                Some(123_456),
            )
            .await
            .unwrap();

        let params = mock.requests()[0].params.clone().unwrap();
        assert_eq!(params["timer_id"], "stats-poll");
        assert_eq!(params["every_msec"], 1000);
        assert_eq!(params["request"]["jsonrpc"], "2.0");
        assert_eq!(params["request"]["method"], "stats.get");
        assert_eq!(params["request"]["id"], 123_456);
    }

    #[tokio::test]
    async fn add_timer_generates_an_id_above_the_query_range() {
        let (conn, mock) = scripted_connection();
        mock.script_result(json!(true));

        conn.rpc()
            .add_timer("ping", 5000, "rpc.info", None, None)
            .await
            .unwrap();

        let params = mock.requests()[0].params.clone().unwrap();
        let id = params["request"]["id"].as_u64().unwrap();
        assert!((TIMER_ID_FLOOR..TIMER_ID_CEILING).contains(&id));
    }

    #[tokio::test]
    async fn del_timer_sends_the_timer_id() {
        let (conn, mock) = scripted_connection();
        mock.script_result(json!(true));

        conn.rpc().del_timer("stats-poll").await.unwrap();

        let request = &mock.requests()[0];
        assert_eq!(request.method, "rpc.del_timer");
        assert_eq!(request.params.as_ref().unwrap()["timer_id"], "stats-poll");
    }
}
