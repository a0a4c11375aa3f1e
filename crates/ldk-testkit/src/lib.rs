//! Test harness pieces shared by scenario tests across the workspace:
//! in-memory transports that behave like sockets, a session spawn helper,
//! and router fakes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use ldk_hub::{NotificationHub, SessionId};
use ldk_schemas::{AuthContext, ChannelKey, ClientCommand, ReceiptAction, ServerEvent};
use ldk_session::{
    ActionRouter, ClientTransport, ConnectionSession, Transport, TransportError,
};

// ---------------------------------------------------------------------------
// Server-side duplex transport
// ---------------------------------------------------------------------------

/// In-memory server transport; the paired [`ClientEnd`] plays the client.
pub struct DuplexTransport {
    commands: mpsc::Receiver<Result<ClientCommand, TransportError>>,
    events: mpsc::Sender<ServerEvent>,
}

/// Test handle driving a [`DuplexTransport`] like a remote peer would.
pub struct ClientEnd {
    commands: mpsc::Sender<Result<ClientCommand, TransportError>>,
    events: mpsc::Receiver<ServerEvent>,
}

/// Build a connected (client, server-transport) pair.
pub fn duplex(capacity: usize) -> (ClientEnd, DuplexTransport) {
    let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
    let (ev_tx, ev_rx) = mpsc::channel(capacity);
    (
        ClientEnd {
            commands: cmd_tx,
            events: ev_rx,
        },
        DuplexTransport {
            commands: cmd_rx,
            events: ev_tx,
        },
    )
}

#[async_trait]
impl Transport for DuplexTransport {
    async fn send(&mut self, event: &ServerEvent) -> Result<(), TransportError> {
        self.events
            .send(event.clone())
            .await
            .map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<Result<ClientCommand, TransportError>> {
        self.commands.recv().await
    }

    async fn close(&mut self) {}
}

impl ClientEnd {
    pub async fn send(&self, command: ClientCommand) {
        self.commands
            .send(Ok(command))
            .await
            .expect("session gone while sending command");
    }

    /// Inject a frame the server cannot parse.
    pub async fn send_malformed(&self, raw: &str) {
        self.commands
            .send(Err(TransportError::Protocol(format!(
                "invalid command frame: {raw}"
            ))))
            .await
            .expect("session gone while sending malformed frame");
    }

    pub async fn recv(&mut self) -> Option<ServerEvent> {
        self.events.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ServerEvent> {
        self.events.try_recv().ok()
    }

    /// Simulate the peer going away (half-close of the command stream).
    pub fn disconnect(self) -> mpsc::Receiver<ServerEvent> {
        self.events
    }
}

// ---------------------------------------------------------------------------
// Client-side duplex transport (for reconnect driver tests)
// ---------------------------------------------------------------------------

/// In-memory client transport; the paired [`ServerPeer`] plays the server.
pub struct MemoryClientTransport {
    commands: mpsc::Sender<ClientCommand>,
    events: mpsc::Receiver<Result<ServerEvent, TransportError>>,
}

pub struct ServerPeer {
    pub commands: mpsc::Receiver<ClientCommand>,
    pub events: mpsc::Sender<Result<ServerEvent, TransportError>>,
}

pub fn client_duplex(capacity: usize) -> (MemoryClientTransport, ServerPeer) {
    let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
    let (ev_tx, ev_rx) = mpsc::channel(capacity);
    (
        MemoryClientTransport {
            commands: cmd_tx,
            events: ev_rx,
        },
        ServerPeer {
            commands: cmd_rx,
            events: ev_tx,
        },
    )
}

#[async_trait]
impl ClientTransport for MemoryClientTransport {
    async fn send(&mut self, command: &ClientCommand) -> Result<(), TransportError> {
        self.commands
            .send(command.clone())
            .await
            .map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<Result<ServerEvent, TransportError>> {
        self.events.recv().await
    }
}

// ---------------------------------------------------------------------------
// Routers
// ---------------------------------------------------------------------------

/// Router that accepts everything and does nothing.
pub struct NullRouter;

#[async_trait]
impl ActionRouter for NullRouter {
    async fn acknowledge(
        &self,
        _auth: &AuthContext,
        _artifact_id: &str,
        _action: ReceiptAction,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn request_update(
        &self,
        _auth: &AuthContext,
        _session_id: SessionId,
        _resource_type: &str,
        _resource_id: &str,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session spawn helper
// ---------------------------------------------------------------------------

/// Wire a session over a duplex transport and run it as its own task,
/// exactly as the daemon does per connection.
pub fn spawn_session(
    hub: Arc<NotificationHub>,
    router: Arc<dyn ActionRouter>,
    auth: AuthContext,
) -> (ClientEnd, SessionId, JoinHandle<SessionId>) {
    let (client, transport) = duplex(64);
    let session = ConnectionSession::new(transport, auth, hub, router);
    let id = session.id();
    let handle = tokio::spawn(session.run());
    (client, id, handle)
}

/// Wait until `session` is subscribed to `channel` (subscribe confirmations
/// race the test otherwise).
pub async fn subscribe_and_confirm(
    client: &mut ClientEnd,
    channel: &ChannelKey,
) -> Option<ServerEvent> {
    client
        .send(ClientCommand::Subscribe {
            channel: channel.clone(),
        })
        .await;
    client.recv().await
}
