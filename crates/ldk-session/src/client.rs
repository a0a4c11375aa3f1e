//! Client-side abstractions used by the reconnect driver.

use async_trait::async_trait;

use ldk_schemas::{ClientCommand, ServerEvent};

use crate::transport::TransportError;

/// Client end of one connection: commands out, events in.
#[async_trait]
pub trait ClientTransport: Send {
    async fn send(&mut self, command: &ClientCommand) -> Result<(), TransportError>;

    /// Next server event. `None` means the server closed cleanly.
    async fn recv(&mut self) -> Option<Result<ServerEvent, TransportError>>;
}

/// Factory for client transports; called once per (re)connect attempt.
#[async_trait]
pub trait Connector: Send {
    async fn connect(&mut self) -> anyhow::Result<Box<dyn ClientTransport>>;
}

/// Application callbacks driven by [`crate::run_with_reconnect`].
#[async_trait]
pub trait ClientHandler: Send {
    /// Runs after every successful connect. Subscriptions are
    /// session-scoped, so re-issue them all here.
    async fn on_connected(&mut self, transport: &mut dyn ClientTransport) -> anyhow::Result<()>;

    /// One inbound server event.
    async fn on_event(&mut self, event: ServerEvent) -> anyhow::Result<()>;
}
