// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! KD-tree build and box query throughput.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tessera_index::{Aabb3D, KdTree};

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
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        v as f32 / (1_u64 << 24) as f32
    }
}

/// `count` small random boxes inside a 100 unit cube.
fn gen_random_boxes(count: usize) -> Vec<Aabb3D<f32>> {
    let mut rng = Rng::new(0x3C6E_F35F_4750_2932);
    (0..count)
        .map(|_| {
            let lo = [
                rng.next_f32() * 100.0,
                rng.next_f32() * 100.0,
                rng.next_f32() * 100.0,
            ];
            let size = 0.5 + rng.next_f32() * 2.0;
            Aabb3D::new(lo, [lo[0] + size, lo[1] + size, lo[2] + size])
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kd_tree_build");
    for &n in &[1_000_usize, 10_000, 100_000] {
        let boxes = gen_random_boxes(n);
        group.throughput(Throughput::Elements(n as u64));
        for leaf in [1, 4, 16] {
            group.bench_function(BenchmarkId::new(format!("leaf{leaf}"), n), |b| {
                b.iter(|| KdTree::build(black_box(&boxes), leaf))
            });
        }
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("kd_tree_query");
    let boxes = gen_random_boxes(100_000);
    let probes = gen_random_boxes(256);
    for leaf in [1, 4, 16] {
        let tree = KdTree::build(&boxes, leaf);
        group.throughput(Throughput::Elements(probes.len() as u64));
        group.bench_function(BenchmarkId::new("overlapping", leaf), |b| {
            b.iter(|| {
                let mut hits = 0_usize;
                for probe in &probes {
                    tree.visit_overlapping(&boxes, black_box(probe), |_| hits += 1);
                }
                hits
            })
        });
        group.bench_function(BenchmarkId::new("containing", leaf), |b| {
            b.iter(|| {
                let mut hits = 0_usize;
                for probe in &probes {
                    tree.visit_containing(&boxes, black_box(probe.min()), |_| hits += 1);
                }
                hits
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_query);
criterion_main!(benches);
