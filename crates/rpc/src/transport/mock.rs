//! Scripted in-process transport for unit tests.
//!
//! Records every outbound request envelope and can answer each one with a
//! scripted result or error, keyed to the request's actual correlation id.
//! Raw frames (pushes, garbage) can be injected directly.

use crate::error::{Result, TransportError};
use crate::protocol::envelope::RequestEnvelope;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

use super::Transport;

enum ScriptedReply {
    Result(Value),
    Error { code: i64, message: String },
}

pub(crate) struct MockTransport {
    requests: Mutex<Vec<RequestEnvelope>>,
    script: Mutex<VecDeque<ScriptedReply>>,
    inbound_tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
    closed: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            inbound_tx: Mutex::new(Some(tx)),
            inbound_rx: tokio::sync::Mutex::new(rx),
            closed: AtomicBool::new(false),
        })
    }

    /// Queue a `result` reply for the next outbound request.
    pub fn script_result(&self, result: Value) {
        self.script.lock().push_back(ScriptedReply::Result(result));
    }

    /// Queue an `error` reply for the next outbound request.
    pub fn script_error(&self, code: i64, message: &str) {
        self.script.lock().push_back(ScriptedReply::Error {
            code,
            message: message.to_string(),
        });
    }

    /// Inject a raw inbound frame, as if the server had pushed it.
    pub fn push_frame(&self, frame: impl Into<String>) {
        if let Some(tx) = self.inbound_tx.lock().as_ref() {
            let _ = tx.send(frame.into());
        }
    }

    /// All request envelopes sent so far.
    pub fn requests(&self) -> Vec<RequestEnvelope> {
        self.requests.lock().clone()
    }

    /// Block until at least `n` requests have been sent.
    pub async fn wait_for_requests(&self, n: usize) {
        while self.requests.lock().len() < n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Drop the inbound stream, as if the server had gone away.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.inbound_tx.lock().take();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, text: String) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed.into());
        }
        let envelope: RequestEnvelope =
            serde_json::from_str(&text).expect("client sent an invalid request envelope");
        let reply = self.script.lock().pop_front().map(|r| match r {
            ScriptedReply::Result(result) => json!({"id": envelope.id, "result": result}),
            ScriptedReply::Error { code, message } => {
                json!({"id": envelope.id, "error": {"code": code, "message": message}})
            }
        });
        self.requests.lock().push(envelope);
        if let Some(reply) = reply {
            self.push_frame(reply.to_string());
        }
        Ok(())
    }

    async fn recv(&self) -> Result<String> {
        match self.inbound_rx.lock().await.recv().await {
            Some(text) => Ok(text),
            None => Err(TransportError::ConnectionClosed.into()),
        }
    }

    async fn close(&self) -> Result<()> {
        self.shutdown();
        Ok(())
    }
}
