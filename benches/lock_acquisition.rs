//! Benchmarks for lock acquisition latency

use criterion::{criterion_group, criterion_main, Criterion};
use locker::{LockClient, MemoryStore, DEFAULT_VALUE};
use tokio::sync::watch;

fn bench_memory_lock(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let client = LockClient::new(MemoryStore::new());

    let mut group = c.benchmark_group("memory_lock");
    group.bench_function("lock_unlock", |b| {
        b.to_async(&rt).iter(|| async {
            let (quit_tx, quit_rx) = watch::channel(false);
            let report = client.lock("bench-lock", DEFAULT_VALUE, None, quit_rx).await;
            assert!(report.is_success());
            let _ = client.unlock("bench-lock", &quit_tx).await;
        });
    });

    group.bench_function("inspect_unheld", |b| {
        b.to_async(&rt).iter(|| async {
            let report = client.inspect("bench-unheld").await;
            assert!(report.is_success());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_memory_lock);
criterion_main!(benches);
