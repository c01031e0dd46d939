use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use saju_core::{Balance, CivilDate, ElementMap, compute_pillars, today_boost};
use std::hint::black_box;

fn bench_compute_pillars(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_pillars");

    for (label, year) in [("before_anchor", 1850), ("modern", 1990), ("future", 2150)] {
        group.bench_with_input(BenchmarkId::new("with_hour", label), &year, |b, &y| {
            b.iter(|| compute_pillars(black_box(y), black_box(5), black_box(15), black_box(Some(6))))
        });
        group.bench_with_input(BenchmarkId::new("no_hour", label), &year, |b, &y| {
            b.iter(|| compute_pillars(black_box(y), black_box(5), black_box(15), black_box(None)))
        });
    }

    group.finish();
}

fn bench_civil_days(c: &mut Criterion) {
    let date = CivilDate::new(1990, 5, 15).unwrap();
    c.bench_function("civil_to_days_and_back", |b| {
        b.iter(|| CivilDate::from_days(black_box(date).to_days()))
    });
}

fn bench_today_boost(c: &mut Criterion) {
    let balance = Balance::from_counts(ElementMap::from_fn(|e| e.index() as u32));
    let today = CivilDate::new(2026, 10, 19).unwrap();
    c.bench_function("today_boost", |b| {
        b.iter(|| today_boost(black_box(&balance), black_box(today)))
    });
}

criterion_group!(benches, bench_compute_pillars, bench_civil_days, bench_today_boost);
criterion_main!(benches);
