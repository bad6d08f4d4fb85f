// Copyright 2025 the Dropgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dropgrid_index::{Box2D, GridIndex, QuadIndex};

fn gen_week_rects(days: usize, per_day: usize) -> Vec<Box2D> {
    // Calendar-shaped load: blocks stacked down day columns, some overlapping.
    let mut out = Vec::with_capacity(days * per_day);
    for d in 0..days {
        for i in 0..per_day {
            let x0 = d as f64 * 200.0;
            let y0 = i as f64 * 45.0;
            out.push(Box2D::from_xywh(x0, y0, 200.0, 60.0));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Box2D> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 2000.0, rng.next_f64() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Box2D::from_xywh(cx + dx, cy + dy, 12.0, 12.0));
        }
    }
    out
}

fn bench_grid_week(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_week");
    for &per_day in &[8usize, 32, 96] {
        let rects = gen_week_rects(7, per_day);
        group.throughput(Throughput::Elements((7 * per_day) as u64));
        group.bench_function(format!("insert_commit_rect_n{}", 7 * per_day), |b| {
            b.iter_batched(
                || GridIndex::<u32>::with_uniform_grid(200.0, 60.0),
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        let _ = idx.insert(r, i as u32);
                    }
                    let _ = idx.commit();
                    let hits: usize = idx
                        .query_rect(Box2D::from_xywh(200.0, 100.0, 400.0, 400.0))
                        .count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_quadtree_week(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_week");
    for &per_day in &[8usize, 32, 96] {
        let rects = gen_week_rects(7, per_day);
        group.throughput(Throughput::Elements((7 * per_day) as u64));
        group.bench_function(format!("insert_commit_rect_n{}", 7 * per_day), |b| {
            b.iter_batched(
                || QuadIndex::<u32>::with_quadtree(Box2D::from_xywh(0.0, 0.0, 1400.0, 4400.0)),
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        let _ = idx.insert(r, i as u32);
                    }
                    let _ = idx.commit();
                    let hits: usize = idx
                        .query_rect(Box2D::from_xywh(200.0, 100.0, 400.0, 400.0))
                        .count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_quadtree_clustered(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_clustered");
    let rects = gen_clustered_rects(16, 256, 128.0);
    group.bench_function("insert_commit_query", |b| {
        b.iter_batched(
            || QuadIndex::<u32>::with_quadtree(Box2D::from_xywh(0.0, 0.0, 2048.0, 2048.0)),
            |mut idx| {
                for (i, r) in rects.iter().copied().enumerate() {
                    let _ = idx.insert(r, i as u32);
                }
                let _ = idx.commit();
                let hits = idx
                    .query_rect(Box2D::from_xywh(800.0, 800.0, 400.0, 400.0))
                    .count();
                black_box(hits);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_drag_update_heavy(c: &mut Criterion) {
    // One item reindexed across the surface, the frame-by-frame drag cost.
    let mut group = c.benchmark_group("drag_update_heavy");
    let rects = gen_week_rects(7, 32);
    group.bench_function("grid_update_commit_x256", |b| {
        b.iter_batched(
            || {
                let mut idx = GridIndex::<u32>::with_uniform_grid(200.0, 60.0);
                let keys: Vec<_> = rects
                    .iter()
                    .copied()
                    .enumerate()
                    .map(|(i, r)| idx.insert(r, i as u32))
                    .collect();
                let _ = idx.commit();
                (idx, keys)
            },
            |(mut idx, keys)| {
                for step in 0..256_usize {
                    let y = (step % 64) as f64 * 10.0;
                    idx.update(keys[0], Box2D::from_xywh(0.0, y, 200.0, 60.0));
                    let _ = idx.commit();
                }
                let hits = idx.query_radius(100.0, 100.0, 300.0).len();
                black_box(hits);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_grid_week,
    bench_quadtree_week,
    bench_quadtree_clustered,
    bench_drag_update_heavy,
);
criterion_main!(benches);
