//! Order intake entry point and explicit cancellation.

use std::sync::Arc;

use ldk_hub::{NotificationHub, SessionId};
use ldk_orders::{AdvanceError, CreateError, OrderPriority, OrderService};
use ldk_schemas::{ChannelKey, OrderStatus, ServerEvent};
use ldk_store::MemoryStore;

fn service_with_hub() -> (OrderService, Arc<NotificationHub>) {
    let store = Arc::new(MemoryStore::new());
    let hub = Arc::new(NotificationHub::default());
    (OrderService::new(store, Arc::clone(&hub)), hub)
}

#[tokio::test]
async fn duplicate_order_number_is_rejected() {
    let (service, _hub) = service_with_hub();
    service.create("ORD-400", OrderPriority::Routine).await.unwrap();

    let err = service
        .create("ORD-400", OrderPriority::Urgent)
        .await
        .unwrap_err();
    assert_eq!(err, CreateError::DuplicateOrderNumber("ORD-400".to_string()));
}

#[tokio::test]
async fn cancel_emits_status_change_and_locks_the_order() {
    let (service, hub) = service_with_hub();
    let order = service.create("ORD-401", OrderPriority::Routine).await.unwrap();

    let watcher = SessionId::new();
    let mut rx = hub.register(watcher, "dashboard");
    hub.subscribe(watcher, &ChannelKey::order(&order.id));

    service.advance(order.id, OrderStatus::SampleCollected).await.unwrap();
    let change = service.cancel(order.id).await.unwrap();
    assert_eq!(change.previous, OrderStatus::SampleCollected);
    assert_eq!(change.new, OrderStatus::Cancelled);

    // Two events: the advance, then the cancel.
    assert!(matches!(rx.recv().await, Some(ServerEvent::Notification { .. })));
    match rx.recv().await {
        Some(ServerEvent::Notification { notification }) => {
            assert_eq!(notification.kind(), "order_status_changed");
        }
        other => panic!("expected cancel notification, got {other:?}"),
    }

    // Cancelled is terminal: both advance and a second cancel are refused.
    assert!(matches!(
        service.advance(order.id, OrderStatus::SampleReceived).await,
        Err(AdvanceError::TerminalState { .. })
    ));
    assert!(matches!(
        service.cancel(order.id).await,
        Err(AdvanceError::TerminalState { .. })
    ));
}
