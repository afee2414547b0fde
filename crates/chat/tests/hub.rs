//! Fan-out hub delivery semantics, exercised without any transport.

use std::sync::Arc;
use std::time::Duration;

use agora_chat::ws::Hub;
use agora_core::chat::{Message, WsEvent};
use chrono::Utc;
use tokio::sync::mpsc::error::TryRecvError;

fn created(id: i64, topic_id: i64) -> WsEvent {
    let now = Utc::now();
    WsEvent::Created {
        message: Message {
            id,
            topic_id,
            author_id: 1,
            content: format!("message {id}"),
            created_at: now,
            updated_at: now,
        },
    }
}

// ---------------------------------------------------------------------------
// Registry bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn counts_follow_register_and_unregister() {
    let hub = Hub::default();
    assert_eq!(hub.connection_count().await, 0);

    let a = hub.register(7).await;
    let b = hub.register(7).await;
    let c = hub.register(23).await; // same shard as 7
    assert_eq!(hub.connection_count().await, 3);
    assert_eq!(hub.subscriber_count(7).await, 2);
    assert_eq!(hub.subscriber_count(23).await, 1);

    hub.unregister(&a.key).await;
    assert_eq!(hub.subscriber_count(7).await, 1);
    hub.unregister(&b.key).await;
    hub.unregister(&c.key).await;
    assert_eq!(hub.connection_count().await, 0);
}

#[tokio::test]
async fn unregister_closes_the_queue_after_draining() {
    let hub = Hub::default();
    let mut sub = hub.register(5).await;
    let event = created(1, 5);

    hub.publish(5, event.clone()).await;
    hub.unregister(&sub.key).await;

    assert_eq!(sub.events.recv().await, Some(event));
    assert_eq!(sub.events.recv().await, None);
}

// ---------------------------------------------------------------------------
// Isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_reaches_only_the_topic() {
    let hub = Hub::default();
    let mut c1 = hub.register(7).await;
    let mut c2 = hub.register(7).await;
    let mut c3 = hub.register(9).await;

    let event = created(42, 7);
    assert_eq!(hub.publish(7, event.clone()).await, 2);

    assert_eq!(c1.events.recv().await, Some(event.clone()));
    assert_eq!(c2.events.recv().await, Some(event));
    assert_eq!(c1.events.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(c2.events.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(c3.events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn publish_to_empty_topic_is_a_noop() {
    let hub = Hub::default();
    assert_eq!(hub.publish(99, WsEvent::Deleted { message_id: 1 }).await, 0);
}

#[tokio::test]
async fn per_subscriber_order_is_fifo() {
    let hub = Hub::default();
    let mut sub = hub.register(3).await;

    for id in 1..=5 {
        hub.publish(3, WsEvent::Deleted { message_id: id }).await;
    }
    for id in 1..=5 {
        assert_eq!(sub.events.recv().await, Some(WsEvent::Deleted { message_id: id }));
    }
}

// ---------------------------------------------------------------------------
// Backpressure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_queue_drops_without_blocking() {
    let hub = Hub::new(2);
    let mut slow = hub.register(1).await;
    let mut fast = hub.register(1).await;

    assert_eq!(hub.publish(1, WsEvent::Deleted { message_id: 1 }).await, 2);
    assert_eq!(fast.events.recv().await, Some(WsEvent::Deleted { message_id: 1 }));
    assert_eq!(hub.publish(1, WsEvent::Deleted { message_id: 2 }).await, 2);
    assert_eq!(fast.events.recv().await, Some(WsEvent::Deleted { message_id: 2 }));

    // `slow` is now full; this publish must return at once.
    let delivered = tokio::time::timeout(
        Duration::from_millis(100),
        hub.publish(1, WsEvent::Deleted { message_id: 3 }),
    )
    .await
    .expect("publish blocked on a full queue");
    assert_eq!(delivered, 1);
    assert_eq!(fast.events.recv().await, Some(WsEvent::Deleted { message_id: 3 }));

    assert_eq!(slow.events.recv().await, Some(WsEvent::Deleted { message_id: 1 }));
    assert_eq!(slow.events.recv().await, Some(WsEvent::Deleted { message_id: 2 }));
    assert_eq!(slow.events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn dropped_receiver_does_not_break_publish() {
    let hub = Hub::default();
    let gone = hub.register(4).await;
    let mut alive = hub.register(4).await;
    drop(gone.events);

    assert_eq!(hub.publish(4, WsEvent::Deleted { message_id: 8 }).await, 1);
    assert_eq!(alive.events.recv().await, Some(WsEvent::Deleted { message_id: 8 }));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_register_publish_unregister() {
    let hub = Arc::new(Hub::new(1024));
    let mut tasks = Vec::new();

    for topic in 0..32_i64 {
        let hub = Arc::clone(&hub);
        tasks.push(tokio::spawn(async move {
            let mut sub = hub.register(topic).await;
            for id in 0..10 {
                hub.publish(topic, WsEvent::Deleted { message_id: id }).await;
            }
            let mut seen = 0;
            while let Ok(WsEvent::Deleted { .. }) = sub.events.try_recv() {
                seen += 1;
            }
            hub.unregister(&sub.key).await;
            seen
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), 10);
    }
    assert_eq!(hub.connection_count().await, 0);
}

#[tokio::test]
async fn shutdown_all_closes_every_queue() {
    let hub = Hub::default();
    let mut a = hub.register(1).await;
    let mut b = hub.register(2).await;

    assert_eq!(hub.shutdown_all().await, 2);
    assert_eq!(hub.connection_count().await, 0);
    assert_eq!(a.events.recv().await, None);
    assert_eq!(b.events.recv().await, None);
}
