//! Server-side transport abstraction: one bidirectional message channel
//! per connection. How the channel is secured or multiplexed over physical
//! sockets is the substrate's concern, not the core's.

use async_trait::async_trait;

use ldk_schemas::{ClientCommand, ServerEvent};

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// The peer is gone; the session must end.
    Closed,
    /// A frame arrived that is not a valid command. Recoverable: the
    /// session answers with an `error` event and keeps running.
    Protocol(String),
    /// The underlying channel failed; the session must end.
    Io(String),
}

impl TransportError {
    /// `true` for errors the session survives.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TransportError::Protocol(_))
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Closed => f.write_str("transport closed"),
            TransportError::Protocol(msg) => write!(f, "protocol error: {msg}"),
            TransportError::Io(msg) => write!(f, "transport io error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Server side of one client connection.
#[async_trait]
pub trait Transport: Send {
    /// Push one event to the peer.
    async fn send(&mut self, event: &ServerEvent) -> Result<(), TransportError>;

    /// Next inbound frame. `None` means the peer closed cleanly.
    async fn recv(&mut self) -> Option<Result<ClientCommand, TransportError>>;

    /// Best-effort close of the underlying channel.
    async fn close(&mut self);
}
