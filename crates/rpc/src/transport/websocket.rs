//! WebSocket transport implementation.
//!
//! Connects with HTTP Basic credentials in the handshake and an optional
//! TLS certificate-verification toggle. After the handshake the socket is
//! split: the sink is guarded by the send mutex, the stream is consumed by
//! the connection's receive loop.

use crate::error::{Error, Result, TransportError};
use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{
    Connector, MaybeTlsStream, WebSocketStream, connect_async_tls_with_config,
};
use tracing::debug;
use url::Url;

use super::Transport;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport over an optionally TLS-wrapped TCP stream.
pub struct WebSocketTransport {
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
    closed: AtomicBool,
}

impl WebSocketTransport {
    /// Connect to `url` (`ws://` or `wss://`), carrying
    /// `Authorization: Basic base64(credential)` in the handshake.
    ///
    /// With `tls_verify` disabled the handshake is still attempted; only
    /// certificate validation is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, TLS setup fails, or the
    /// handshake fails or exceeds `handshake_timeout`.
    pub async fn connect(
        url: &str,
        credential: &str,
        tls_verify: bool,
        handshake_timeout: Duration,
    ) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        match parsed.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(
                    TransportError::InvalidUrl(format!("unsupported scheme `{other}`")).into(),
                );
            }
        }

        let mut request = parsed
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(credential);
        let authorization = http::HeaderValue::from_str(&format!("Basic {encoded}"))
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        request
            .headers_mut()
            .insert(http::header::AUTHORIZATION, authorization);

        let connector = if tls_verify {
            None
        } else {
            Some(Connector::Rustls(Arc::new(accept_any_cert_config()?)))
        };

        debug!(url = %parsed, "connecting");

        let (ws_stream, _response) = timeout(
            handshake_timeout,
            connect_async_tls_with_config(request, None, false, connector),
        )
        .await
        .map_err(|_| TransportError::ConnectFailed {
            url: parsed.to_string(),
            reason: "handshake timed out".to_string(),
        })?
        .map_err(|e| TransportError::ConnectFailed {
            url: parsed.to_string(),
            reason: e.to_string(),
        })?;

        let (sink, stream) = ws_stream.split();

        Ok(Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            closed: AtomicBool::new(false),
        })
    }

    fn fault(&self, error: tungstenite::Error) -> Error {
        self.closed.store(true, Ordering::Release);
        match error {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                TransportError::ConnectionClosed.into()
            }
            other => TransportError::Socket(other.to_string()).into(),
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&self, text: String) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed.into());
        }
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(|e| self.fault(e))
    }

    async fn recv(&self) -> Result<String> {
        loop {
            if self.closed.load(Ordering::Acquire) {
                return Err(TransportError::ConnectionClosed.into());
            }
            let next = { self.stream.lock().await.next().await };
            match next {
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(Message::Close(_))) | None => {
                    self.closed.store(true, Ordering::Release);
                    return Err(TransportError::ConnectionClosed.into());
                }
                Some(Ok(other)) => {
                    // Ping/Pong bookkeeping is handled inside tungstenite;
                    // binary frames are not part of this protocol.
                    debug!(frame = ?other, "ignoring non-text frame");
                }
                Some(Err(e)) => return Err(self.fault(e)),
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed.into());
        }
        let mut sink = self.sink.lock().await;
        sink.send(Message::Ping(Bytes::new()))
            .await
            .map_err(|e| self.fault(e))
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.send(Message::Close(None)).await {
            debug!(error = %e, "close frame not delivered");
        }
        Ok(())
    }
}

fn accept_any_cert_config() -> Result<rustls::ClientConfig> {
    let provider = rustls::crypto::aws_lc_rs::default_provider();
    let config = rustls::ClientConfig::builder_with_provider(Arc::new(provider.clone()))
        .with_safe_default_protocol_versions()
        .map_err(|e| TransportError::Tls(e.to_string()))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert { provider }))
        .with_no_client_auth();
    Ok(config)
}

/// Certificate verifier used when TLS verification is disabled: accepts any
/// chain, while signature checks stay delegated to the crypto provider.
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: CryptoProvider,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
