//! Connection core: id allocation, the pending-call table, the receive
//! loop, and the `call`/`notify`/`poll_event` operations.

use crate::error::{Error, Result, RpcError, TransportError};
use crate::modules::{
    Channel, Log, NameBan, Rpc, Server, ServerBan, ServerBanException, Spamfilter, Stats, User,
};
use crate::protocol::{self, Inbound, RequestEnvelope};
use crate::transport::{Transport, WebSocketTransport};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Default deadline for a call to receive its response.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default deadline for one [`Connection::poll_event`] attempt.
pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default deadline for the WebSocket handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Events buffered between the receive loop and the event consumer.
const EVENT_BUFFER: usize = 128;

/// One entry in the pending-call table.
enum PendingCall {
    /// A caller is parked on the oneshot receiver.
    Waiting(oneshot::Sender<Result<Value>>),
    /// The caller timed out; the late reply is dropped on arrival.
    TimedOut,
}

/// Builder for establishing a [`Connection`].
#[derive(Debug, Clone)]
pub struct ConnectionBuilder {
    url: String,
    credential: String,
    tls_verify: bool,
    issuer: Option<String>,
    query_timeout: Duration,
    event_timeout: Duration,
    handshake_timeout: Duration,
}

impl ConnectionBuilder {
    /// Create a builder for `url` with the `login:password` credential.
    #[must_use]
    pub fn new(url: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credential: credential.into(),
            tls_verify: true,
            issuer: None,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            event_timeout: DEFAULT_EVENT_TIMEOUT,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Enable or disable TLS certificate verification.
    #[must_use]
    pub const fn tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set the issuer name announced once at connect time (UnrealIRCd
    /// 6.0.8+) via a fire-and-forget `rpc.set_issuer`.
    #[must_use]
    pub fn issuer(mut self, name: impl Into<String>) -> Self {
        self.issuer = Some(name.into());
        self
    }

    /// Set the per-call response deadline.
    #[must_use]
    pub const fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Set the deadline for one event poll.
    #[must_use]
    pub const fn event_timeout(mut self, timeout: Duration) -> Self {
        self.event_timeout = timeout;
        self
    }

    /// Set the WebSocket handshake deadline.
    #[must_use]
    pub const fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Perform the handshake and start the receive loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or the
    /// connect-time announcement cannot be sent.
    pub async fn connect(self) -> Result<Connection> {
        let transport = WebSocketTransport::connect(
            &self.url,
            &self.credential,
            self.tls_verify,
            self.handshake_timeout,
        )
        .await?;

        let connection =
            Connection::spawn(Arc::new(transport), self.query_timeout, self.event_timeout);

        match self.issuer {
            Some(name) => {
                connection
                    .notify("rpc.set_issuer", Some(json!({"name": name})))
                    .await?;
            }
            None => connection.transport.ping().await?,
        }

        Ok(connection)
    }
}

/// A live connection to the UnrealIRCd JSON-RPC endpoint.
///
/// Owns the transport, the monotonically increasing request-id counter, the
/// pending-call table, and the receive loop that correlates inbound frames.
/// All operations take `&self` and may be used concurrently.
pub struct Connection {
    transport: Arc<dyn Transport>,
    next_id: AtomicU64,
    pending: Arc<DashMap<u64, PendingCall>>,
    events: Mutex<mpsc::Receiver<Result<Value>>>,
    last_error: Arc<RwLock<Option<RpcError>>>,
    query_timeout: Duration,
    event_timeout: Duration,
    reader: JoinHandle<()>,
}

impl Connection {
    /// Start building a connection.
    #[must_use]
    pub fn builder(url: impl Into<String>, credential: impl Into<String>) -> ConnectionBuilder {
        ConnectionBuilder::new(url, credential)
    }

    /// Wrap an established transport and spawn the receive loop.
    pub(crate) fn spawn(
        transport: Arc<dyn Transport>,
        query_timeout: Duration,
        event_timeout: Duration,
    ) -> Self {
        let pending: Arc<DashMap<u64, PendingCall>> = Arc::new(DashMap::new());
        let last_error = Arc::new(RwLock::new(None));
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);

        let reader = tokio::spawn(receive_loop(
            Arc::clone(&transport),
            Arc::clone(&pending),
            events_tx,
            Arc::clone(&last_error),
        ));

        Self {
            transport,
            next_id: AtomicU64::new(1),
            pending,
            events: Mutex::new(events_rx),
            last_error,
            query_timeout,
            event_timeout,
            reader,
        }
    }

    /// Issue a request and wait for its correlated response.
    ///
    /// The decoded `result` payload is returned unchanged; interpreting its
    /// shape is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Rpc`] on a server-reported error (code and
    /// message preserved verbatim), [`Error::Timeout`] when no matching
    /// response arrives in time, and a transport error if the connection is
    /// closed or the send fails.
    #[instrument(skip(self, params))]
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let text = protocol::encode_request(&RequestEnvelope::new(method, params, id))
            .map_err(Error::Protocol)?;

        // Register before sending so a response cannot beat the table entry.
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, PendingCall::Waiting(tx));

        debug!(id, "sending request");
        if let Err(e) = self.transport.send(text).await {
            self.pending.remove(&id);
            return Err(e);
        }

        match timeout(self.query_timeout, rx).await {
            Err(_) => {
                // Leave a tombstone so the receive loop recognizes the late
                // reply and drops it instead of surfacing it as an event.
                self.pending.alter(&id, |_, _| PendingCall::TimedOut);
                debug!(id, "request timed out");
                Err(Error::Timeout(self.query_timeout))
            }
            Ok(Err(_)) => Err(TransportError::ConnectionClosed.into()),
            Ok(Ok(Ok(result))) => {
                *self.last_error.write() = None;
                Ok(result)
            }
            Ok(Ok(Err(error))) => {
                if let Error::Rpc(rpc) = &error {
                    *self.last_error.write() = Some(rpc.clone());
                }
                Err(error)
            }
        }
    }

    /// Issue a request without waiting for the server's acknowledgement.
    ///
    /// An id is still allocated and sent; any acknowledgement the server
    /// produces routes to the event channel.
    ///
    /// # Errors
    ///
    /// Fails only if the send itself fails.
    #[instrument(skip(self, params))]
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let text = protocol::encode_request(&RequestEnvelope::new(method, params, id))
            .map_err(Error::Protocol)?;
        debug!(id, "sending notification");
        self.transport.send(text).await
    }

    /// Receive one server-pushed payload: a log-stream event, an
    /// acknowledgement of a [`notify`](Self::notify), or any other frame not
    /// correlated to an outstanding call.
    ///
    /// Returns `Ok(None)` when nothing arrived within the poll deadline,
    /// distinguishing "nothing happened" from a dead connection.
    ///
    /// # Errors
    ///
    /// Fails with [`TransportError::ConnectionClosed`] once the connection
    /// is gone, and with [`Error::Rpc`] for a server-pushed error frame.
    pub async fn poll_event(&self) -> Result<Option<Value>> {
        let mut events = self.events.lock().await;
        match timeout(self.event_timeout, events.recv()).await {
            Err(_) => Ok(None),
            Ok(None) => Err(TransportError::ConnectionClosed.into()),
            Ok(Some(Ok(payload))) => Ok(Some(payload)),
            Ok(Some(Err(error))) => Err(error),
        }
    }

    /// The most recent server-reported error on this connection, kept as a
    /// diagnostic. Every failing call also returns its own error, so this
    /// never needs to be consulted to learn a call's outcome.
    #[must_use]
    pub fn last_error(&self) -> Option<RpcError> {
        self.last_error.read().clone()
    }

    /// Close the connection. Every outstanding call fails with
    /// [`TransportError::ConnectionClosed`], as do all calls made after.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake cannot be sent.
    pub async fn close(&self) -> Result<()> {
        let result = self.transport.close().await;
        fail_outstanding(&self.pending);
        self.reader.abort();
        result
    }

    /// RPC meta-operations (`rpc.*`).
    #[must_use]
    pub const fn rpc(&self) -> Rpc<'_> {
        Rpc::new(self)
    }

    /// Statistics (`stats.*`).
    #[must_use]
    pub const fn stats(&self) -> Stats<'_> {
        Stats::new(self)
    }

    /// User management (`user.*`).
    #[must_use]
    pub const fn user(&self) -> User<'_> {
        User::new(self)
    }

    /// Channel management (`channel.*`).
    #[must_use]
    pub const fn channel(&self) -> Channel<'_> {
        Channel::new(self)
    }

    /// Server information (`server.*`).
    #[must_use]
    pub const fn server(&self) -> Server<'_> {
        Server::new(self)
    }

    /// Server bans, or TKLs (`server_ban.*`).
    #[must_use]
    pub const fn server_ban(&self) -> ServerBan<'_> {
        ServerBan::new(self)
    }

    /// Server ban exceptions (`server_ban_exception.*`).
    #[must_use]
    pub const fn server_ban_exception(&self) -> ServerBanException<'_> {
        ServerBanException::new(self)
    }

    /// Name bans, or QLines (`name_ban.*`).
    #[must_use]
    pub const fn name_ban(&self) -> NameBan<'_> {
        NameBan::new(self)
    }

    /// Spamfilters (`spamfilter.*`).
    #[must_use]
    pub const fn spamfilter(&self) -> Spamfilter<'_> {
        Spamfilter::new(self)
    }

    /// Log retrieval and streaming (`log.*`).
    #[must_use]
    pub const fn log(&self) -> Log<'_> {
        Log::new(self)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Consume the transport for the connection's lifetime, completing pending
/// calls and forwarding everything else to the event channel.
async fn receive_loop(
    transport: Arc<dyn Transport>,
    pending: Arc<DashMap<u64, PendingCall>>,
    events: mpsc::Sender<Result<Value>>,
    last_error: Arc<RwLock<Option<RpcError>>>,
) {
    loop {
        let text = match transport.recv().await {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "receive loop stopping");
                break;
            }
        };

        match protocol::classify(&text) {
            Ok(Inbound::Reply { id, outcome }) => match pending.remove(&id) {
                Some((_, PendingCall::Waiting(tx))) => {
                    // The receiver is gone if the caller timed out at this
                    // exact moment; the reply is dropped either way.
                    let _ = tx.send(outcome.map_err(Error::Rpc));
                }
                Some((_, PendingCall::TimedOut)) => {
                    debug!(id, "discarding late reply for timed-out call");
                }
                None => {
                    // Acknowledgement of a notify, or an id we never issued.
                    forward_event(&events, outcome.map_err(Error::Rpc));
                }
            },
            Ok(Inbound::Push(payload)) => forward_event(&events, Ok(payload)),
            Ok(Inbound::PushError(error)) => {
                *last_error.write() = Some(error.clone());
                forward_event(&events, Err(Error::Rpc(error)));
            }
            Err(e) => warn!(error = %e, "ignoring malformed frame"),
        }
    }

    fail_outstanding(&pending);
    // Dropping the event sender closes the channel, which is how
    // `poll_event` learns the connection is gone.
}

fn forward_event(events: &mpsc::Sender<Result<Value>>, event: Result<Value>) {
    if let Err(e) = events.try_send(event) {
        warn!(error = %e, "dropping event: consumer not keeping up");
    }
}

fn fail_outstanding(pending: &DashMap<u64, PendingCall>) {
    let ids: Vec<u64> = pending.iter().map(|entry| *entry.key()).collect();
    for id in ids {
        if let Some((_, PendingCall::Waiting(tx))) = pending.remove(&id) {
            let _ = tx.send(Err(TransportError::ConnectionClosed.into()));
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::scripted_connection;
    use super::*;

    #[tokio::test]
    async fn notifications_use_distinct_monotonic_ids() {
        let (conn, mock) = scripted_connection();

        conn.notify("rpc.set_issuer", Some(json!({"name": "ops"})))
            .await
            .unwrap();
        conn.notify("rpc.set_issuer", Some(json!({"name": "ops"})))
            .await
            .unwrap();
        conn.notify("rpc.info", None).await.unwrap();

        let ids: Vec<u64> = mock.requests().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn call_returns_scripted_result() {
        let (conn, mock) = scripted_connection();

        mock.script_result(json!({"name": "irc.example.test"}));
        let result = conn.call("server.get", None).await.unwrap();

        assert_eq!(result, json!({"name": "irc.example.test"}));
        let requests = mock.requests();
        assert_eq!(requests[0].method, "server.get");
        assert_eq!(requests[0].jsonrpc, "2.0");
    }

    #[tokio::test]
    async fn rpc_error_is_preserved_and_recorded() {
        let (conn, mock) = scripted_connection();

        mock.script_error(401, "Auth failed");
        let error = conn.call("server.get", None).await.unwrap_err();

        match error {
            Error::Rpc(rpc) => {
                assert_eq!(rpc.code, 401);
                assert_eq!(rpc.message, "Auth failed");
            }
            other => panic!("expected rpc error, got {other:?}"),
        }
        assert_eq!(
            conn.last_error(),
            Some(RpcError {
                code: 401,
                message: "Auth failed".to_string()
            })
        );

        // The next success clears the diagnostic.
        mock.script_result(json!("ok"));
        conn.call("rpc.info", None).await.unwrap();
        assert_eq!(conn.last_error(), None);
    }

    #[tokio::test]
    async fn responses_match_calls_by_id_not_arrival_order() {
        let (conn, mock) = scripted_connection();
        let conn = Arc::new(conn);

        let first = tokio::spawn({
            let conn = Arc::clone(&conn);
            async move { conn.call("user.get", Some(json!({"nick": "alice"}))).await }
        });
        mock.wait_for_requests(1).await;

        let second = tokio::spawn({
            let conn = Arc::clone(&conn);
            async move { conn.call("user.get", Some(json!({"nick": "bob"}))).await }
        });
        mock.wait_for_requests(2).await;

        let requests = mock.requests();
        mock.push_frame(json!({"id": requests[1].id, "result": "bob"}).to_string());
        mock.push_frame(json!({"id": requests[0].id, "result": "alice"}).to_string());

        assert_eq!(first.await.unwrap().unwrap(), json!("alice"));
        assert_eq!(second.await.unwrap().unwrap(), json!("bob"));
    }

    #[tokio::test]
    async fn timeout_evicts_call_and_late_reply_is_discarded() {
        let (conn, mock) = scripted_connection();

        let error = conn.call("server.list", None).await.unwrap_err();
        assert!(matches!(error, Error::Timeout(_)));

        // The late reply completes nothing and is not surfaced as an event.
        let id = mock.requests()[0].id;
        mock.push_frame(json!({"id": id, "result": "late"}).to_string());
        assert!(conn.poll_event().await.unwrap().is_none());

        // Correlation still works afterwards.
        mock.script_result(json!("alive"));
        assert_eq!(conn.call("rpc.info", None).await.unwrap(), json!("alive"));
    }

    #[tokio::test]
    async fn frames_without_id_are_events_not_completions() {
        let (conn, mock) = scripted_connection();

        mock.push_frame(r#"{"result":{"msg":"log line"}}"#);

        assert_eq!(
            conn.poll_event().await.unwrap(),
            Some(json!({"msg": "log line"}))
        );
        assert!(conn.pending.is_empty());
    }

    #[tokio::test]
    async fn notify_acknowledgement_routes_to_event_channel() {
        let (conn, mock) = scripted_connection();

        mock.script_result(json!("ack"));
        conn.notify("rpc.set_issuer", Some(json!({"name": "ops"})))
            .await
            .unwrap();

        assert_eq!(conn.poll_event().await.unwrap(), Some(json!("ack")));
    }

    #[tokio::test]
    async fn transport_close_fails_pending_calls() {
        let (conn, mock) = scripted_connection();
        let conn = Arc::new(conn);

        let call = tokio::spawn({
            let conn = Arc::clone(&conn);
            async move { conn.call("server.list", None).await }
        });
        mock.wait_for_requests(1).await;

        mock.shutdown();

        let error = call.await.unwrap().unwrap_err();
        assert!(matches!(
            error,
            Error::Transport(TransportError::ConnectionClosed)
        ));
        assert!(matches!(
            conn.poll_event().await,
            Err(Error::Transport(TransportError::ConnectionClosed))
        ));
    }

    #[tokio::test]
    async fn malformed_frame_does_not_stop_correlation() {
        let (conn, mock) = scripted_connection();

        mock.push_frame("{not json");
        mock.push_frame("[42]");
        mock.script_result(json!({"ok": true}));

        assert_eq!(conn.call("rpc.info", None).await.unwrap(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn close_fails_in_flight_and_future_calls() {
        let (conn, mock) = scripted_connection();
        let conn = Arc::new(conn);

        let call = tokio::spawn({
            let conn = Arc::clone(&conn);
            async move { conn.call("server.list", None).await }
        });
        mock.wait_for_requests(1).await;

        conn.close().await.unwrap();

        assert!(matches!(
            call.await.unwrap(),
            Err(Error::Transport(TransportError::ConnectionClosed))
        ));
        assert!(matches!(
            conn.call("rpc.info", None).await,
            Err(Error::Transport(TransportError::ConnectionClosed))
        ));
    }

    #[test]
    fn builder_defaults() {
        let builder = Connection::builder("wss://irc.example.test:8600/", "admin:secret");
        assert!(builder.tls_verify);
        assert_eq!(builder.query_timeout, DEFAULT_QUERY_TIMEOUT);
        assert_eq!(builder.event_timeout, DEFAULT_EVENT_TIMEOUT);
        assert_eq!(builder.handshake_timeout, DEFAULT_HANDSHAKE_TIMEOUT);
    }
}
