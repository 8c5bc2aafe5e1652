use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use signage_server::message::{parse_control, parse_discovery, parse_seconds};
use signage_server::store::{ClientRecord, JsonFileStore, RegistryStore};
use signage_server::topics::TopicRouter;
use std::hint::black_box;
use tempfile::TempDir;
use tokio::runtime::Runtime;

fn bench_route(c: &mut Criterion) {
    let router = TopicRouter::new("ar-signage");
    let topics = [
        ("discovery", "ar-signage/devicediscovery"),
        ("setseconds", "ar-signage/lobby/timer/setseconds"),
        ("control", "ar-signage/lobby/timer/control"),
        ("rejected", "ar-signage/lobby/timer/seconds"),
        ("foreign", "other/lobby/timer/control"),
    ];

    let mut group = c.benchmark_group("route");
    for (name, topic) in topics {
        group.bench_with_input(BenchmarkId::from_parameter(name), &topic, |b, topic| {
            b.iter(|| black_box(router.route(black_box(topic)).ok()));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_seconds", |b| {
        b.iter(|| black_box(parse_seconds(black_box(br#"{"value":3600}"#)).ok()));
    });

    c.bench_function("parse_control", |b| {
        b.iter(|| black_box(parse_control(black_box(br#"{"value":"START"}"#)).ok()));
    });

    c.bench_function("parse_discovery", |b| {
        let payload = br#"{"value":{"uuid":"5f0c6a2e-1b7d-4d8e-9a55-0c3b2f1e7a90","role":"client"}}"#;
        b.iter(|| black_box(parse_discovery(black_box(payload)).ok()));
    });
}

fn bench_store_lookup(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(
        temp_dir.path().join("clients.json"),
        temp_dir.path().join("rooms.json"),
    );

    let mut group = c.benchmark_group("store_get");
    for count in [10, 100, 1000] {
        rt.block_on(async {
            for i in 0..count {
                store
                    .upsert_if_absent(ClientRecord {
                        uuid: format!("client-{}", i),
                        room_name: "lobby".to_string(),
                        client_name: format!("display-{}", i),
                    })
                    .await
                    .unwrap();
            }
        });

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(store.get("client-5").await.unwrap()) });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_route, bench_parse, bench_store_lookup);
criterion_main!(benches);
