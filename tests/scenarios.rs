//! End-to-end room scenarios: workers → bridge → directory → sessions.

use indyscan_realtime::bridge::EventBridge;
use indyscan_realtime::websocket::{ChannelDirectory, HubConfig, Outbound, ServerMessage};
use indyscan_realtime::worker::{ServiceWorkers, Worker, WorkerHandle, WorkerInfo};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

struct Fixture {
    directory: Arc<ChannelDirectory>,
    bridge: EventBridge,
}

fn setup(workers: &[Arc<WorkerHandle>]) -> Fixture {
    let registry: ServiceWorkers = workers
        .iter()
        .map(|w| Arc::clone(w) as Arc<dyn Worker>)
        .collect();
    let directory = Arc::new(ChannelDirectory::new(HubConfig::default()));
    let bridge = EventBridge::attach(&registry, Arc::clone(&directory));
    Fixture { directory, bridge }
}

fn expansion(network: &str) -> Arc<WorkerHandle> {
    Arc::new(WorkerHandle::new(WorkerInfo::new("expansion", network, "domain")))
}

async fn next(rx: &mut Outbound) -> ServerMessage {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for message")
        .expect("outbound queue closed")
}

/// Wait until the forwarding tasks have drained, then assert nothing arrived
async fn assert_silent(rx: &mut Outbound) {
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err(), "unexpected message");
}

#[tokio::test]
async fn tx_processed_reaches_only_its_room() {
    let w1 = expansion("net-a");
    let fixture = setup(&[w1.clone()]);

    let (mut s1, mut rx1) = fixture.directory.register().unwrap();
    let (mut s2, mut rx2) = fixture.directory.register().unwrap();
    s1.switch_room("net-a").unwrap();
    s2.switch_room("net-b").unwrap();
    assert_eq!(next(&mut rx1).await, ServerMessage::switched_room("net-a"));
    assert_eq!(next(&mut rx2).await, ServerMessage::switched_room("net-b"));

    w1.events()
        .emit_tx_processed(json!({"id": 1}), json!({"hash": "abc"}));

    let received = next(&mut rx1).await;
    assert_eq!(
        serde_json::to_value(&received).unwrap(),
        json!({
            "event": "tx-processed",
            "data": {"workerData": {"id": 1}, "txData": {"hash": "abc"}}
        })
    );
    assert_silent(&mut rx2).await;

    fixture.bridge.shutdown();
}

#[tokio::test]
async fn switching_rooms_moves_delivery() {
    let net_a = expansion("net-a");
    let net_b = expansion("net-b");
    let fixture = setup(&[net_a.clone(), net_b.clone()]);

    let (mut s1, mut rx) = fixture.directory.register().unwrap();
    s1.switch_room("net-a").unwrap();
    assert_eq!(next(&mut rx).await, ServerMessage::switched_room("net-a"));

    s1.switch_room("net-b").unwrap();
    assert_eq!(next(&mut rx).await, ServerMessage::switched_room("net-b"));
    assert!(!fixture.directory.is_member("net-a", s1.id()));
    assert!(fixture.directory.is_member("net-b", s1.id()));

    net_a
        .events()
        .emit_tx_processed(json!({"id": "a"}), json!({"seqNo": 1}));
    net_b
        .events()
        .emit_rescan_scheduled(json!({"id": "b"}), json!(60000));

    assert_eq!(
        next(&mut rx).await,
        ServerMessage::RescanScheduled {
            worker_data: json!({"id": "b"}),
            ms_till_rescan: json!(60000),
        }
    );
    assert_silent(&mut rx).await;

    fixture.bridge.shutdown();
}

#[tokio::test]
async fn non_expansion_workers_are_never_published() {
    let serializer = Arc::new(WorkerHandle::new(WorkerInfo::new(
        "rtw-serialization",
        "net-a",
        "domain",
    )));
    let fixture = setup(&[serializer.clone()]);
    assert_eq!(fixture.bridge.linked_count(), 0);

    let (mut s1, mut rx) = fixture.directory.register().unwrap();
    s1.switch_room("net-a").unwrap();
    let _ = next(&mut rx).await;

    assert_eq!(
        serializer
            .events()
            .emit_tx_processed(json!({"id": 9}), json!({})),
        0
    );
    assert_silent(&mut rx).await;
}

#[tokio::test]
async fn events_without_subscribers_are_dropped() {
    let w1 = expansion("net-a");
    let fixture = setup(&[w1.clone()]);

    w1.events().emit_tx_processed(json!({"id": 1}), json!({}));
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Late joiner gets no backlog
    let (mut s1, mut rx) = fixture.directory.register().unwrap();
    s1.switch_room("net-a").unwrap();
    assert_eq!(next(&mut rx).await, ServerMessage::switched_room("net-a"));
    assert_silent(&mut rx).await;

    fixture.bridge.shutdown();
}

#[tokio::test]
async fn disconnected_session_receives_nothing_more() {
    let w1 = expansion("net-a");
    let fixture = setup(&[w1.clone()]);

    let (mut gone, gone_rx) = fixture.directory.register().unwrap();
    let (mut stays, mut stays_rx) = fixture.directory.register().unwrap();
    gone.switch_room("net-a").unwrap();
    stays.switch_room("net-a").unwrap();
    let _ = next(&mut stays_rx).await;
    assert_eq!(fixture.directory.member_count("net-a"), 2);

    drop(gone);
    drop(gone_rx);
    assert_eq!(fixture.directory.member_count("net-a"), 1);
    assert_eq!(fixture.directory.connection_count(), 1);

    w1.events().emit_tx_processed(json!({"id": 1}), json!({"n": 1}));
    assert_eq!(
        next(&mut stays_rx).await,
        ServerMessage::TxProcessed {
            worker_data: json!({"id": 1}),
            tx_data: json!({"n": 1}),
        }
    );

    fixture.bridge.shutdown();
}

#[tokio::test]
async fn one_worker_keeps_emission_order() {
    let w1 = expansion("net-a");
    let fixture = setup(&[w1.clone()]);

    let (mut s1, mut rx) = fixture.directory.register().unwrap();
    s1.switch_room("net-a").unwrap();
    let _ = next(&mut rx).await;

    for n in 0..20u64 {
        if n % 3 == 0 {
            w1.events().emit_rescan_scheduled(json!({"id": 1}), json!(n));
        } else {
            w1.events().emit_tx_processed(json!({"id": 1}), json!(n));
        }
    }

    for n in 0..20u64 {
        let expected = if n % 3 == 0 {
            ServerMessage::RescanScheduled {
                worker_data: json!({"id": 1}),
                ms_till_rescan: json!(n),
            }
        } else {
            ServerMessage::TxProcessed {
                worker_data: json!({"id": 1}),
                tx_data: json!(n),
            }
        };
        assert_eq!(next(&mut rx).await, expected);
    }

    fixture.bridge.shutdown();
}

#[tokio::test]
async fn same_room_switch_keeps_single_membership() {
    let w1 = expansion("net-a");
    let fixture = setup(&[w1.clone()]);

    let (mut s1, mut rx) = fixture.directory.register().unwrap();
    s1.switch_room("net-a").unwrap();
    s1.switch_room("net-a").unwrap();
    assert_eq!(next(&mut rx).await, ServerMessage::switched_room("net-a"));
    assert_eq!(next(&mut rx).await, ServerMessage::switched_room("net-a"));
    assert_eq!(fixture.directory.member_count("net-a"), 1);

    w1.events().emit_tx_processed(json!({"id": 1}), json!({}));
    let _ = next(&mut rx).await;
    // Delivered once, not twice
    assert_silent(&mut rx).await;

    fixture.bridge.shutdown();
}
