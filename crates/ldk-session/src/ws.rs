//! WebSocket client transport over tokio-tungstenite.

use anyhow::Context;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use ldk_schemas::{ClientCommand, ServerEvent};

use crate::client::{ClientTransport, Connector};
use crate::transport::TransportError;

// ---------------------------------------------------------------------------
// WsClientTransport
// ---------------------------------------------------------------------------

/// JSON-over-WebSocket client end.
pub struct WsClientTransport {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClientTransport {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let (inner, _response) = connect_async(url)
            .await
            .with_context(|| format!("websocket connect {url}"))?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl ClientTransport for WsClientTransport {
    async fn send(&mut self, command: &ClientCommand) -> Result<(), TransportError> {
        let text = serde_json::to_string(command)
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        self.inner
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<ServerEvent, TransportError>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(
                        serde_json::from_str(&text)
                            .map_err(|e| TransportError::Protocol(e.to_string())),
                    );
                }
                // Keepalive traffic is handled by tungstenite; skip it.
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
                Ok(Message::Binary(_)) => continue,
                Ok(Message::Close(_)) => return None,
                Err(e) => return Some(Err(TransportError::Io(e.to_string()))),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// WsConnector
// ---------------------------------------------------------------------------

/// Reconnectable factory for [`WsClientTransport`].
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&mut self) -> anyhow::Result<Box<dyn ClientTransport>> {
        let transport = WsClientTransport::connect(&self.url).await?;
        Ok(Box::new(transport))
    }
}
