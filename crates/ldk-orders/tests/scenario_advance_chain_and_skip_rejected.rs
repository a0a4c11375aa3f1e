//! Advance walks one step at a time and notifies subscribers per step.

use std::sync::Arc;

use ldk_hub::{NotificationHub, SessionId};
use ldk_orders::{AdvanceError, OrderPriority, OrderService};
use ldk_schemas::{ChannelKey, NotificationPayload, OrderStatus, ServerEvent};
use ldk_store::MemoryStore;

fn service_with_hub() -> (OrderService, Arc<NotificationHub>) {
    let store = Arc::new(MemoryStore::new());
    let hub = Arc::new(NotificationHub::default());
    (OrderService::new(store, Arc::clone(&hub)), hub)
}

#[tokio::test]
async fn ord_100_advance_skip_advance() {
    let (service, hub) = service_with_hub();
    let order = service.create("ORD-100", OrderPriority::Routine).await.unwrap();
    assert_eq!(order.status, OrderStatus::Ordered);

    // A dashboard session watches this order's channel.
    let watcher = SessionId::new();
    let mut rx = hub.register(watcher, "dashboard");
    hub.subscribe(watcher, &ChannelKey::order(&order.id));

    // Step 1: ordered -> sample_collected succeeds and emits one event.
    let change = service
        .advance(order.id, OrderStatus::SampleCollected)
        .await
        .unwrap();
    assert_eq!(change.previous, OrderStatus::Ordered);
    assert_eq!(change.new, OrderStatus::SampleCollected);

    match rx.recv().await {
        Some(ServerEvent::Notification { notification }) => {
            assert_eq!(notification.kind(), "order_status_changed");
            match notification.payload {
                NotificationPayload::OrderStatusChanged {
                    order_id,
                    previous_status,
                    new_status,
                    ..
                } => {
                    assert_eq!(order_id, order.id);
                    assert_eq!(previous_status, OrderStatus::Ordered);
                    assert_eq!(new_status, OrderStatus::SampleCollected);
                }
                other => panic!("wrong payload: {other:?}"),
            }
        }
        other => panic!("expected notification, got {other:?}"),
    }

    // Step 2: skipping sample_received is refused; nothing is emitted.
    let err = service
        .advance(order.id, OrderStatus::InProgress)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AdvanceError::InvalidTransition {
            from: OrderStatus::SampleCollected,
            attempted: OrderStatus::InProgress,
        }
    );
    assert!(rx.try_recv().is_err(), "refused advance emits nothing");

    // The order is unchanged in storage.
    let current = service.get(order.id).await.unwrap().unwrap();
    assert_eq!(current.status, OrderStatus::SampleCollected);

    // Step 3: the immediate successor now succeeds.
    let change = service
        .advance(order.id, OrderStatus::SampleReceived)
        .await
        .unwrap();
    assert_eq!(change.new, OrderStatus::SampleReceived);
    assert!(rx.recv().await.is_some());
}

#[tokio::test]
async fn advance_emits_on_fine_and_coarse_channels() {
    let (service, hub) = service_with_hub();
    let order = service.create("ORD-200", OrderPriority::Urgent).await.unwrap();

    let fine = SessionId::new();
    let mut fine_rx = hub.register(fine, "doctor-1");
    hub.subscribe(fine, &ChannelKey::order(&order.id));

    let coarse = SessionId::new();
    let mut coarse_rx = hub.register(coarse, "ops-dashboard");
    hub.subscribe(coarse, &ChannelKey::orders());

    service
        .advance(order.id, OrderStatus::SampleCollected)
        .await
        .unwrap();

    let fine_ev = fine_rx.recv().await.expect("per-order channel event");
    let coarse_ev = coarse_rx.recv().await.expect("coarse channel event");
    // One notification value fans out on both channels.
    match (fine_ev, coarse_ev) {
        (
            ServerEvent::Notification { notification: a },
            ServerEvent::Notification { notification: b },
        ) => assert_eq!(a.id, b.id),
        other => panic!("expected two notifications, got {other:?}"),
    }

    // Exactly one per channel.
    assert!(fine_rx.try_recv().is_err());
    assert!(coarse_rx.try_recv().is_err());
}

#[tokio::test]
async fn unknown_order_is_reported() {
    let (service, _hub) = service_with_hub();
    let missing = uuid::Uuid::new_v4();
    let err = service
        .advance(missing, OrderStatus::SampleCollected)
        .await
        .unwrap_err();
    assert_eq!(err, AdvanceError::UnknownOrder { order_id: missing });
}
