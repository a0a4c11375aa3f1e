//! WebSocket endpoint: one upgrade = one `ConnectionSession` task.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

use ldk_schemas::{AuthContext, ClientCommand, ServerEvent};
use ldk_session::{ConnectionSession, Transport, TransportError};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /v1/ws
// ---------------------------------------------------------------------------

/// Identity presented at connect time. Opaque to the core: validation (if
/// any) happened upstream; the daemon only routes with it.
#[derive(Debug, Deserialize)]
pub(crate) struct ConnectQuery {
    pub recipient_id: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub name: Option<String>,
}

fn default_role() -> String {
    "staff".to_string()
}

pub(crate) async fn ws_handler(
    State(st): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let auth = AuthContext {
        recipient_id: query.recipient_id,
        role: query.role,
        display_name: query.name,
    };
    ws.on_upgrade(move |socket| async move {
        let transport = WsServerTransport { socket };
        let session = ConnectionSession::new(
            transport,
            auth,
            Arc::clone(&st.hub),
            Arc::clone(&st.router),
        );
        let id = session.run().await;
        debug!(session_id = %id, "websocket connection finished");
    })
}

// ---------------------------------------------------------------------------
// WsServerTransport
// ---------------------------------------------------------------------------

/// JSON-over-WebSocket server end of one connection.
struct WsServerTransport {
    socket: WebSocket,
}

#[async_trait]
impl Transport for WsServerTransport {
    async fn send(&mut self, event: &ServerEvent) -> Result<(), TransportError> {
        let text = serde_json::to_string(event)
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        self.socket
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<ClientCommand, TransportError>> {
        loop {
            match self.socket.recv().await? {
                Ok(Message::Text(text)) => {
                    return Some(
                        serde_json::from_str(&text)
                            .map_err(|e| TransportError::Protocol(e.to_string())),
                    );
                }
                // Keepalive frames are answered by axum itself.
                Ok(Message::Ping(_) | Message::Pong(_)) => continue,
                Ok(Message::Binary(_)) => {
                    return Some(Err(TransportError::Protocol(
                        "binary frames are not accepted".to_string(),
                    )));
                }
                Ok(Message::Close(_)) => return None,
                Err(e) => return Some(Err(TransportError::Io(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.socket.send(Message::Close(None)).await;
    }
}
