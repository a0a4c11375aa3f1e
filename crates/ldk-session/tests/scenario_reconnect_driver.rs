//! Reconnect driver: bounded attempts, backoff, and mandatory re-subscribe.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::mpsc;

use ldk_schemas::{ChannelKey, ClientCommand, ServerEvent};
use ldk_session::{
    run_with_reconnect, ClientHandler, ClientTransport, Connector, ReconnectError,
    ReconnectPolicy,
};
use ldk_testkit::{client_duplex, MemoryClientTransport, ServerPeer};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Connector following a script: `true` connects (handing the server peer
/// to the test task), `false` fails. Once the script is exhausted every
/// further attempt fails.
struct ScriptedConnector {
    script: VecDeque<bool>,
    accepted: mpsc::UnboundedSender<ServerPeer>,
}

impl ScriptedConnector {
    fn new(
        script: impl IntoIterator<Item = bool>,
    ) -> (Self, mpsc::UnboundedReceiver<ServerPeer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                script: script.into_iter().collect(),
                accepted: tx,
            },
            rx,
        )
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&mut self) -> anyhow::Result<Box<dyn ClientTransport>> {
        match self.script.pop_front() {
            Some(true) => {
                let (transport, peer): (MemoryClientTransport, ServerPeer) = client_duplex(16);
                let _ = self.accepted.send(peer);
                Ok(Box::new(transport))
            }
            _ => anyhow::bail!("connection refused"),
        }
    }
}

/// Handler re-subscribing one channel on every connect and counting events.
struct ResubscribingHandler {
    channel: ChannelKey,
    connects: usize,
    events: Vec<ServerEvent>,
}

#[async_trait]
impl ClientHandler for ResubscribingHandler {
    async fn on_connected(&mut self, transport: &mut dyn ClientTransport) -> anyhow::Result<()> {
        self.connects += 1;
        transport
            .send(&ClientCommand::Subscribe {
                channel: self.channel.clone(),
            })
            .await?;
        Ok(())
    }

    async fn on_event(&mut self, event: ServerEvent) -> anyhow::Result<()> {
        self.events.push(event);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn exhausted_attempts_give_up_with_last_error() {
    // Every attempt fails; default policy allows 5 retry delays.
    let (mut connector, _accepted) = ScriptedConnector::new(std::iter::empty());
    let mut handler = ResubscribingHandler {
        channel: ChannelKey::orders(),
        connects: 0,
        events: Vec::new(),
    };

    let err = run_with_reconnect(&mut connector, ReconnectPolicy::default(), &mut handler)
        .await
        .unwrap_err();

    match err {
        ReconnectError::AttemptsExhausted { attempts, .. } => assert_eq!(attempts, 6),
        other => panic!("expected exhaustion, got {other}"),
    }
    assert_eq!(handler.connects, 0, "no session was ever established");
}

#[tokio::test(start_paused = true)]
async fn each_reconnect_is_a_fresh_session_needing_resubscribe() {
    // Two successful connects with a failure between them, then permanent
    // failure so the driver terminates.
    let (mut connector, mut accepted) = ScriptedConnector::new([true, false, true]);

    // Server side: for each accepted connection, expect a subscribe command
    // (nothing is restored implicitly), answer it, then drop the
    // connection.
    let server = tokio::spawn(async move {
        let mut subscribe_count = 0;
        for _round in 0..2 {
            let mut peer = accepted.recv().await.expect("accepted peer");
            match peer.commands.recv().await {
                Some(ClientCommand::Subscribe { .. }) => subscribe_count += 1,
                other => panic!("expected subscribe first, got {other:?}"),
            }
            let _ = peer
                .events
                .send(Ok(ServerEvent::Subscribed {
                    channel: ChannelKey::orders(),
                }))
                .await;
            // Dropping the peer closes the connection from the server side.
        }
        subscribe_count
    });

    let mut handler = ResubscribingHandler {
        channel: ChannelKey::orders(),
        connects: 0,
        events: Vec::new(),
    };
    let err = run_with_reconnect(&mut connector, ReconnectPolicy::default(), &mut handler)
        .await
        .unwrap_err();
    assert!(matches!(err, ReconnectError::AttemptsExhausted { .. }));

    assert_eq!(handler.connects, 2, "two live sessions were established");
    let subscribe_count = server.await.expect("server task panicked");
    assert_eq!(
        subscribe_count, 2,
        "every reconnect had to subscribe from scratch"
    );
    assert_eq!(
        handler
            .events
            .iter()
            .filter(|e| matches!(e, ServerEvent::Subscribed { .. }))
            .count(),
        2
    );
}
