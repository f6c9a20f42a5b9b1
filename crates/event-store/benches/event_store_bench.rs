use common::{IdGenerator, UuidIdGenerator};
use criterion::{Criterion, criterion_group, criterion_main};
use event_store::{
    AggregateId, AppendOptions, EventEnvelope, EventStore, EventStoreExt, InMemoryEventStore,
    Version,
};

fn make_event(aggregate_id: AggregateId, version: i64) -> EventEnvelope {
    EventEnvelope::builder()
        .aggregate_id(aggregate_id)
        .aggregate_type("ShoppingCart")
        .event_type("ItemAdded")
        .version(Version::new(version))
        .payload_raw(serde_json::json!({
            "type": "ItemAdded",
            "data": {
                "cart_id": aggregate_id.to_string(),
                "product_id": 42,
                "quantity": 1,
                "price": 100,
                "pos": version
            }
        }))
        .build()
        .unwrap()
}

fn bench_append_single_event(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let ids = UuidIdGenerator::new();

    c.bench_function("event_store/append_single_event", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                store
                    .append_event(make_event(ids.next_id(), 1), AppendOptions::expect_new())
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_append_batch_10(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let ids = UuidIdGenerator::new();

    c.bench_function("event_store/append_batch_10", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                let agg_id = ids.next_id();
                let events: Vec<EventEnvelope> = (1..=10).map(|v| make_event(agg_id, v)).collect();
                store.append(events, AppendOptions::new()).await.unwrap();
            });
        });
    });
}

fn bench_append_to_long_log(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    let agg_id = UuidIdGenerator::new().next_id();

    rt.block_on(async {
        let events: Vec<EventEnvelope> = (1..=1000).map(|v| make_event(agg_id, v)).collect();
        store.append(events, AppendOptions::new()).await.unwrap();
    });

    // Every iteration after the first conflicts; this measures the guard.
    c.bench_function("event_store/append_guard_at_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                let _ = store
                    .append_event(
                        make_event(agg_id, 1001),
                        AppendOptions::expect_version(Version::new(1000)),
                    )
                    .await;
            });
        });
    });
}

fn bench_get_events_for_aggregate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    let agg_id = UuidIdGenerator::new().next_id();

    rt.block_on(async {
        let events: Vec<EventEnvelope> = (1..=100).map(|v| make_event(agg_id, v)).collect();
        store.append(events, AppendOptions::new()).await.unwrap();
    });

    c.bench_function("event_store/get_events_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.get_events_for_aggregate(agg_id).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_append_single_event,
    bench_append_batch_10,
    bench_append_to_long_log,
    bench_get_events_for_aggregate,
);
criterion_main!(benches);
