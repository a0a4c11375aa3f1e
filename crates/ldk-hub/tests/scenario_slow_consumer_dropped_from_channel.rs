//! A session whose outbound queue is full loses the affected channel;
//! the publish continues to everyone else.

use ldk_hub::{DedupConfig, HubConfig, NotificationHub, SessionId};
use ldk_schemas::{ChannelKey, Notification, Priority};

fn tiny_hub() -> NotificationHub {
    NotificationHub::new(HubConfig {
        outbound_capacity: 1,
        dedup: DedupConfig::default(),
    })
}

fn announce(text: &str) -> Notification {
    Notification::system_announcement(text, text, Priority::Normal)
}

#[tokio::test]
async fn full_queue_drops_session_but_publish_continues() {
    let hub = tiny_hub();
    let ch = ChannelKey::orders();

    // The slow session never drains its queue of depth 1.
    let slow = SessionId::new();
    let _slow_rx = hub.register(slow, "slow");
    hub.subscribe(slow, &ch);

    let healthy = SessionId::new();
    let mut healthy_rx = hub.register(healthy, "healthy");
    hub.subscribe(healthy, &ch);

    // First publish fills the slow queue.
    let first = hub.publish(&ch, &announce("n1"));
    assert_eq!(first.delivered, 2);

    // Second publish overflows it: the slow session is dropped from the
    // channel, the healthy one still receives.
    let second = hub.publish(&ch, &announce("n2"));
    assert_eq!(second.delivered, 1);
    assert_eq!(second.dropped, 1);
    assert!(!hub.is_subscribed(slow, &ch));
    assert_eq!(hub.subscriber_count(&ch), 1);

    // The slow session is still registered; only the channel was lost.
    assert_eq!(hub.session_count(), 2);

    // The healthy session saw both publishes, in order.
    for expected in ["n1", "n2"] {
        match healthy_rx.recv().await {
            Some(ldk_schemas::ServerEvent::Notification { notification }) => {
                assert_eq!(notification.title, expected);
            }
            other => panic!("expected {expected}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn closed_queue_forgets_the_session_entirely() {
    let hub = tiny_hub();
    let ch = ChannelKey::orders();

    let sid = SessionId::new();
    let rx = hub.register(sid, "r1");
    hub.subscribe(sid, &ch);
    // Receiver dropped: the transport is dead.
    drop(rx);

    let report = hub.publish(&ch, &announce("n1"));
    assert_eq!(report.dropped, 1);
    assert_eq!(hub.session_count(), 0, "dead session forgotten");
    assert_eq!(hub.subscriber_count(&ch), 0);
}
