//! The per-connection session task.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use ldk_hub::{NotificationHub, SessionId};
use ldk_schemas::{AuthContext, ChannelKey, ClientCommand, ReceiptAction, ServerEvent};

use crate::state::SessionState;
use crate::transport::{Transport, TransportError};

// ---------------------------------------------------------------------------
// ActionRouter
// ---------------------------------------------------------------------------

/// Application hook for passthrough commands. The session itself never
/// touches order or receipt state; `acknowledge` and `request_update` are
/// routed to the surrounding application through this trait.
#[async_trait]
pub trait ActionRouter: Send + Sync {
    async fn acknowledge(
        &self,
        auth: &AuthContext,
        artifact_id: &str,
        action: ReceiptAction,
    ) -> anyhow::Result<()>;

    /// Pull hint: answer by re-sending current state to `session_id` only.
    async fn request_update(
        &self,
        auth: &AuthContext,
        session_id: SessionId,
        resource_type: &str,
        resource_id: &str,
    ) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// ConnectionSession
// ---------------------------------------------------------------------------

/// One live client connection.
///
/// Created per connect, destroyed on disconnect; never reused. The run
/// loop is the single consumer of both the transport and the hub outbound
/// queue, which preserves per-session command ordering.
pub struct ConnectionSession<T: Transport> {
    id: SessionId,
    auth: AuthContext,
    state: SessionState,
    subscribed: HashSet<ChannelKey>,
    transport: T,
    hub: Arc<NotificationHub>,
    router: Arc<dyn ActionRouter>,
}

impl<T: Transport> ConnectionSession<T> {
    pub fn new(
        transport: T,
        auth: AuthContext,
        hub: Arc<NotificationHub>,
        router: Arc<dyn ActionRouter>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            auth,
            state: SessionState::Connecting,
            subscribed: HashSet::new(),
            transport,
            hub,
            router,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Channels this session has subscribed during its lifetime. Session
    /// scoped: a reconnected client starts from an empty set.
    pub fn subscriptions(&self) -> &HashSet<ChannelKey> {
        &self.subscribed
    }

    /// Drive the session to completion: register with the hub under no
    /// channels, then pump until the transport dies or the hub forgets us.
    /// Always ends `Disconnected` with the hub deregistered.
    pub async fn run(mut self) -> SessionId {
        let mut outbound = self.hub.register(self.id, &self.auth.recipient_id);
        self.state
            .transition(SessionState::Connected)
            .expect("connecting -> connected is always legal");
        info!(session_id = %self.id, recipient = %self.auth.recipient_id, "session connected");

        loop {
            tokio::select! {
                delivery = outbound.recv() => {
                    match delivery {
                        Some(event) => {
                            if let Err(err) = self.transport.send(&event).await {
                                debug!(session_id = %self.id, %err, "outbound send failed");
                                break;
                            }
                        }
                        // Hub dropped us (e.g. slow-consumer eviction).
                        None => break,
                    }
                }
                frame = self.transport.recv() => {
                    match frame {
                        Some(Ok(command)) => {
                            if self.dispatch(command).await.is_err() {
                                break;
                            }
                        }
                        Some(Err(err)) if err.is_recoverable() => {
                            let reply = ServerEvent::Error { message: err.to_string() };
                            if self.transport.send(&reply).await.is_err() {
                                break;
                            }
                        }
                        Some(Err(_)) | None => break,
                    }
                }
            }
        }

        self.hub.deregister(self.id);
        self.transport.close().await;
        self.state
            .transition(SessionState::Disconnected)
            .expect("connected -> disconnected is always legal");
        info!(session_id = %self.id, "session disconnected");
        self.id
    }

    async fn dispatch(&mut self, command: ClientCommand) -> Result<(), TransportError> {
        match command {
            ClientCommand::Subscribe { channel } => {
                self.hub.subscribe(self.id, &channel);
                self.subscribed.insert(channel.clone());
                self.transport
                    .send(&ServerEvent::Subscribed { channel })
                    .await
            }
            ClientCommand::Unsubscribe { channel } => {
                self.hub.unsubscribe(self.id, &channel);
                self.subscribed.remove(&channel);
                self.transport
                    .send(&ServerEvent::Unsubscribed { channel })
                    .await
            }
            ClientCommand::MarkRead { notification_id } => {
                self.hub.mark_read(self.id, notification_id);
                self.transport
                    .send(&ServerEvent::MarkedRead { notification_id })
                    .await
            }
            ClientCommand::MarkAllRead => {
                let cleared = self.hub.mark_all_read(self.id) as u64;
                self.transport
                    .send(&ServerEvent::AllMarkedRead { cleared })
                    .await
            }
            ClientCommand::Acknowledge { artifact_id, action } => {
                match self
                    .router
                    .acknowledge(&self.auth, &artifact_id, action)
                    .await
                {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        warn!(session_id = %self.id, %err, "acknowledge failed");
                        self.transport
                            .send(&ServerEvent::Error { message: err.to_string() })
                            .await
                    }
                }
            }
            ClientCommand::RequestUpdate { resource_type, resource_id } => {
                match self
                    .router
                    .request_update(&self.auth, self.id, &resource_type, &resource_id)
                    .await
                {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        self.transport
                            .send(&ServerEvent::Error { message: err.to_string() })
                            .await
                    }
                }
            }
            ClientCommand::Typing { channel, is_typing } => {
                // Passthrough to the channel's other members; never echoed.
                let event = ServerEvent::Typing {
                    user_id: self.auth.recipient_id.clone(),
                    is_typing,
                };
                self.hub.send_transient(&channel, &event, Some(self.id));
                Ok(())
            }
            ClientCommand::Ping => {
                self.transport
                    .send(&ServerEvent::Pong {
                        ts_millis: chrono::Utc::now().timestamp_millis(),
                    })
                    .await
            }
        }
    }
}
