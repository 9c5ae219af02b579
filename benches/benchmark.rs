use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use graphite64::{Counter, Gauge, GraphiteRegistry, Histogram, Labels, Registry};

fn registry() -> GraphiteRegistry {
    GraphiteRegistry::new("127.0.0.1:2003", Duration::ZERO)
        .expect("benchmark address is valid")
        .with_prefix("graphite64.benchmarks")
}

pub fn benchmark_lookup(c: &mut Criterion) {
    let registry = registry();
    let nine_tags = Labels::from([
        "one", "1", "two", "2", "three", "3", "four", "4", "five", "5", "six", "6", "seven", "7",
        "eight", "8", "nine", "9",
    ]);
    c.bench_function("counter-1-tag-new", |b| {
        let mut values = 0u64..;
        b.iter(|| {
            let labels = Labels::from(["tag".to_string(), values.next().unwrap().to_string()]);
            registry.counter("one-tag", &labels)
        })
    });
    c.bench_function("counter-1-tag-existing", |b| {
        let labels = Labels::from(["tag", "one"]);
        let _counter = black_box(registry.counter("one-tag-existing", &labels));
        b.iter(|| registry.counter("one-tag-existing", &labels));
    });
    c.bench_function("counter-9-tags", |b| {
        b.iter(|| registry.counter("nine-tag", &nine_tags));
    });
}

pub fn benchmark_counter(c: &mut Criterion) {
    let registry = registry();
    c.bench_function("counter-inc-1-tag", |b| {
        let counter = registry.counter("counter.inc-one-tag", &Labels::from(["tag", "one"]));
        b.iter(|| counter.inc());
    });
    c.bench_function("counter-clone-1-tag", |b| {
        let counter = registry.counter("counter.inc-one-tag", &Labels::from(["tag", "one"]));
        b.iter(|| black_box(counter.clone()));
    });
    c.bench_function("gauge-set", |b| {
        let gauge = registry.gauge("gauge.set", &Labels::default());
        b.iter(|| gauge.set(black_box(42.0)));
    });
}

pub fn benchmark_histogram(c: &mut Criterion) {
    let registry = registry();
    c.bench_function("histogram-observe-1-tag", |b| {
        let histogram = registry.histogram(
            "histogram.observe-one-tag",
            &Labels::from(["tag", "one"]),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        );
        b.iter(|| histogram.observe(black_box(0.2)));
    });
}

criterion_group!(
    benches,
    benchmark_lookup,
    benchmark_counter,
    benchmark_histogram
);
criterion_main!(benches);
