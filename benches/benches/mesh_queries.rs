// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mesh evaluator queries on a tessellated sphere.

use core::f32::consts::{PI, TAU};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tessera_mesh::glam::Vec3;
use tessera_mesh::{EvaluatorConfig, MeshDescription, MeshEvaluator};

/// Latitude/longitude sphere of radius one with `rings * segments` quads.
fn sphere(rings: u32, segments: u32) -> MeshDescription {
    let mut positions = vec![Vec3::Z];
    for i in 1..rings {
        let theta = PI * i as f32 / rings as f32;
        for j in 0..segments {
            let phi = TAU * j as f32 / segments as f32;
            positions.push(Vec3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            ));
        }
    }
    let south = positions.len() as u32;
    positions.push(Vec3::NEG_Z);

    let ring = |i: u32, j: u32| 1 + (i - 1) * segments + j % segments;
    let mut triangles = Vec::new();
    for j in 0..segments {
        triangles.push([0, ring(1, j), ring(1, j + 1)]);
        triangles.push([south, ring(rings - 1, j + 1), ring(rings - 1, j)]);
    }
    for i in 1..rings - 1 {
        for j in 0..segments {
            triangles.push([ring(i, j), ring(i + 1, j), ring(i + 1, j + 1)]);
            triangles.push([ring(i, j), ring(i + 1, j + 1), ring(i, j + 1)]);
        }
    }
    MeshDescription::from_triangles(positions, &triangles)
}

/// Points on a spiral through and around the unit sphere.
fn probes(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            let r = 0.25 + 1.5 * t;
            let a = t * 37.0;
            Vec3::new(r * a.cos(), r * a.sin(), 2.0 * t - 1.0)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator_build");
    for &(rings, segments) in &[(32_u32, 64_u32), (128, 256)] {
        let desc = sphere(rings, segments);
        let n = 2 * rings as usize * segments as usize;
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| MeshEvaluator::new(black_box(&desc)))
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator_query");
    let desc = sphere(128, 256);
    let points = probes(1024);
    group.throughput(Throughput::Elements(points.len() as u64));
    for leaf in [1, 4, 16] {
        let Ok(evaluator) =
            MeshEvaluator::with_config(&desc, EvaluatorConfig::new().with_max_leaf_size(leaf))
        else {
            return;
        };
        group.bench_function(BenchmarkId::new("closest_point", leaf), |b| {
            b.iter(|| {
                for &p in &points {
                    black_box(evaluator.closest_point(p));
                }
            })
        });
        group.bench_function(BenchmarkId::new("intersection", leaf), |b| {
            b.iter(|| {
                for &p in &points {
                    black_box(evaluator.intersection(Vec3::new(0.0, 0.0, -3.0), p, f32::INFINITY));
                }
            })
        });
        // Feature normals are built on the first call.
        let _ = evaluator.signed_distance(Vec3::ZERO);
        group.bench_function(BenchmarkId::new("signed_distance", leaf), |b| {
            b.iter(|| {
                for &p in &points {
                    let _ = black_box(evaluator.signed_distance(p));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
