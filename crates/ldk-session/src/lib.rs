//! Per-connection session handling.
//!
//! One [`ConnectionSession`] wraps one live client connection: it registers
//! with the hub, pumps hub deliveries out over the transport, and
//! dispatches inbound client commands. Disconnection is terminal for the
//! instance; a reconnect is a brand-new session with a new id and an empty
//! subscription set (the client re-subscribes).
//!
//! The reconnect side ([`ReconnectPolicy`], [`run_with_reconnect`]) is
//! client-machinery: bounded attempts with capped exponential backoff,
//! attempt counter reset on every successful connect.

mod client;
mod reconnect;
mod session;
mod state;
mod transport;
mod ws;

pub use client::{ClientHandler, ClientTransport, Connector};
pub use reconnect::{run_with_reconnect, ReconnectError, ReconnectPolicy};
pub use session::{ActionRouter, ConnectionSession};
pub use state::{SessionError, SessionState};
pub use transport::{Transport, TransportError};
pub use ws::{WsClientTransport, WsConnector};
