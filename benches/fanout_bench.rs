//! Benchmarks for room fan-out
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use indyscan_realtime::websocket::{ChannelDirectory, HubConfig, ServerMessage};
use serde_json::json;
use tokio::sync::mpsc;

fn tx_message() -> ServerMessage {
    ServerMessage::TxProcessed {
        worker_data: json!({"id": "sovmain-domain-expansion"}),
        tx_data: json!({"seqNo": 42, "txn": {"type": "1", "data": {"dest": "V4SGRU86Z58d6TV7PBUe6f"}}}),
    }
}

fn bench_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish");

    for members in [1, 100, 1000] {
        let directory = ChannelDirectory::new(HubConfig::default());
        let mut receivers = Vec::with_capacity(members);
        for i in 0..members {
            let (tx, rx) = mpsc::channel(1);
            directory.join("sovmain", &format!("conn-{}", i), tx);
            receivers.push(rx);
        }
        let message = tx_message();

        group.throughput(Throughput::Elements(members as u64));
        // Queues stay full after the first round, so this measures the
        // non-blocking drop path as much as cloning.
        group.bench_function(format!("members_{}", members), |b| {
            b.iter(|| directory.publish(black_box("sovmain"), black_box(&message)))
        });
    }

    group.finish();
}

fn bench_membership(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership");
    let directory = ChannelDirectory::new(HubConfig::default());
    let (tx, _rx) = mpsc::channel(1);

    group.bench_function("join_leave", |b| {
        b.iter(|| {
            directory.join(black_box("sovmain"), "conn", tx.clone());
            directory.leave(black_box("sovmain"), "conn")
        })
    });

    group.finish();
}

criterion_group!(benches, bench_publish, bench_membership);
criterion_main!(benches);
