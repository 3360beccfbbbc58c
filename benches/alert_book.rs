use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wbids::alerts::{AlertBook, ResolvePolicy};
use wbids::mock::MockData;

fn ingest_benchmark(c: &mut Criterion) {
    let mut data = MockData::seeded(42);
    let batch = data.alerts(500);

    c.bench_function("ingest 500 fresh alerts", |b| {
        b.iter(|| {
            let mut book = AlertBook::new(ResolvePolicy::Monotonic);
            black_box(book.ingest(black_box(batch.clone())));
        })
    });

    let mut warm = AlertBook::new(ResolvePolicy::Monotonic);
    warm.ingest(batch.clone());
    for alert in batch.iter().step_by(3) {
        warm.resolve(&alert.id());
    }
    c.bench_function("re-ingest 500 known alerts", |b| {
        b.iter(|| {
            black_box(warm.ingest(black_box(batch.clone())));
        })
    });

    c.bench_function("severity breakdown", |b| {
        b.iter(|| black_box(warm.severity_breakdown()))
    });
}

criterion_group!(benches, ingest_benchmark);
criterion_main!(benches);
