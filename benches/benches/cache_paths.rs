// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::convert::Infallible;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use dropgrid_cache::{CacheConfig, PositionCache, SlotPosition};
use dropgrid_timing::ManualClock;

fn mapper(start_sec: i64, end_sec: i64) -> Result<SlotPosition, Infallible> {
    Ok(SlotPosition {
        offset: start_sec as f64 / 60.0,
        length: (end_sec - start_sec) as f64 / 60.0,
    })
}

fn fresh_cache(max_size: usize) -> PositionCache<u32, &'static str, ManualClock> {
    PositionCache::new(
        CacheConfig {
            max_size,
            max_age_ms: 60_000,
        },
        ManualClock::new(0),
    )
}

fn bench_hit_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_hit");
    group.bench_function("drag_resample_x1024", |b| {
        b.iter_batched(
            || {
                let mut cache = fresh_cache(512);
                let _ = cache.get_or_compute(7, 9 * 3600, 10 * 3600, &["cal:work"], mapper);
                cache
            },
            |mut cache| {
                // A drag revisits the same minute-truncated key with jitter.
                for i in 0..1024_i64 {
                    let p = cache.get_or_compute(7, 9 * 3600 + i % 50, 10 * 3600 + i % 50, &[], mapper);
                    black_box(p);
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_miss_and_evict(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_miss_evict");
    group.bench_function("churn_past_capacity", |b| {
        b.iter_batched(
            || fresh_cache(128),
            |mut cache| {
                for i in 0..1024_u32 {
                    let start = i64::from(i) * 60;
                    let p = cache.get_or_compute(i, start, start + 3600, &["cal:work"], mapper);
                    black_box(p);
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_invalidation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_invalidate");
    group.bench_function("dependency_sweep", |b| {
        b.iter_batched(
            || {
                let mut cache = fresh_cache(512);
                for i in 0..512_u32 {
                    let dep = if i % 2 == 0 { "cal:work" } else { "cal:home" };
                    let _ = cache.get_or_compute(i, i64::from(i) * 60, i64::from(i) * 60 + 3600, &[dep], mapper);
                }
                cache
            },
            |mut cache| {
                let removed = cache.invalidate_dependency(&"cal:work");
                black_box(removed);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_hit_path, bench_miss_and_evict, bench_invalidation);
criterion_main!(benches);
