//! Benchmarks for change tree reconstruction.
use changetrace_core::changes::{Change, ChangeAggregator, FieldNormalizer, RawEvent, ValueFormatter};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

fn nested_feed(depth: usize, leaves_per_group: usize) -> Vec<RawEvent> {
    let mut events = Vec::new();
    for level in 0..depth {
        let kind = if level == 0 { "action" } else { "reaction" };
        events.push(RawEvent::new(json!({
            "type": kind,
            "spyReportStart": true,
            "target": {"$mobx": {"name": format!("Store@{}", level)}},
            "object": {"$mobx": {"name": format!("Reaction@{}", level)}},
        })));
        for i in 0..leaves_per_group {
            events.push(RawEvent::new(json!({
                "type": "update",
                "object": {"$mobx": {"name": "Store@0.items"}},
                "name": "count",
                "newValue": i,
                "oldValue": i.saturating_sub(1),
            })));
        }
    }
    for _ in 0..depth {
        events.push(RawEvent::new(json!({"spyReportEnd": true, "time": 1})));
    }
    events
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let normalizer = FieldNormalizer::default();
    let event = RawEvent::new(json!({
        "type": "update",
        "object": {"$mobx": {"name": "Store@1"}},
        "newValue": 1,
        "oldValue": 0,
        "$mobx": {"hidden": true},
        "__proto__": {"inherited": true},
    }));
    group.bench_function("update_event", |b| { b.iter(|| black_box(normalizer.normalize(&event))); });
    group.finish();
}

fn bench_format_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_value");
    let formatter = ValueFormatter::default();
    let short = json!("short value");
    let long = json!("x".repeat(1_000));
    group.bench_function("short_string", |b| { b.iter(|| black_box(formatter.format(short.clone()))); });
    group.bench_function("long_string", |b| { b.iter(|| black_box(formatter.format(long.clone()))); });
    group.finish();
}

fn bench_push_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_nested");
    for depth in [1, 4, 16] {
        let feed = nested_feed(depth, 8);
        group.throughput(Throughput::Elements(feed.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &feed, |b, feed| {
            b.iter(|| {
                let mut emitted = 0usize;
                let mut aggregator = ChangeAggregator::new(|tree: Change| emitted += tree.node_count());
                for event in feed {
                    aggregator.push(event);
                }
                drop(aggregator);
                black_box(emitted)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_format_value, bench_push_nested);
criterion_main!(benches);
