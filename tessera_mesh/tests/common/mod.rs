// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mesh fixtures shared by the integration tests.

#![allow(
    missing_docs,
    reason = "Integration-test helper module; not part of the public API."
)]
#![allow(dead_code, reason = "Each test binary uses a different subset of fixtures.")]

use tessera_mesh::glam::{Vec2, Vec3};
use tessera_mesh::{Attribute, Interpolation, MeshDescription};

/// Axis-aligned unit cube `[0, 1]³`, outward winding, twelve triangles.
pub(crate) fn unit_cube() -> MeshDescription {
    MeshDescription::from_triangles(
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ],
        &[
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ],
    )
}

/// Closed latitude/longitude sphere of `radius` around the origin, outward winding.
///
/// `rings` counts latitude bands (at least 2) and `segments` longitude slices (at
/// least 3). Each vertex carries a `"uv"` attribute of (longitude, latitude) in
/// `[0, 1)` x `[0, 1]`, which wraps around the seam and so is only meaningful for
/// sampling, not for UV lookup.
pub(crate) fn uv_sphere(radius: f32, rings: u32, segments: u32) -> MeshDescription {
    use core::f32::consts::{PI, TAU};

    let mut positions = vec![Vec3::new(0.0, 0.0, radius)];
    let mut uvs = vec![Vec2::new(0.0, 0.0)];
    for i in 1..rings {
        let theta = PI * i as f32 / rings as f32;
        for j in 0..segments {
            let phi = TAU * j as f32 / segments as f32;
            positions.push(
                Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos()) * radius,
            );
            uvs.push(Vec2::new(j as f32 / segments as f32, i as f32 / rings as f32));
        }
    }
    let south = u32::try_from(positions.len()).unwrap();
    positions.push(Vec3::new(0.0, 0.0, -radius));
    uvs.push(Vec2::new(0.0, 1.0));

    let ring = |i: u32, j: u32| 1 + (i - 1) * segments + j % segments;
    let mut triangles = Vec::new();
    for j in 0..segments {
        triangles.push([0, ring(1, j), ring(1, j + 1)]);
    }
    for i in 1..rings - 1 {
        for j in 0..segments {
            let (u0, u1) = (ring(i, j), ring(i, j + 1));
            let (l0, l1) = (ring(i + 1, j), ring(i + 1, j + 1));
            triangles.push([u0, l0, l1]);
            triangles.push([u0, l1, u1]);
        }
    }
    for j in 0..segments {
        triangles.push([south, ring(rings - 1, j + 1), ring(rings - 1, j)]);
    }

    MeshDescription::from_triangles(positions, &triangles)
        .with_attribute("uv", Attribute::new(Interpolation::Vertex, uvs))
}

/// An `n` x `n` grid of unit quads on z = 0 with per-corner UVs in `[0, 1]²`.
pub(crate) fn uv_grid(n: u32) -> MeshDescription {
    let side = n + 1;
    let mut positions = Vec::new();
    for y in 0..side {
        for x in 0..side {
            positions.push(Vec3::new(x as f32, y as f32, 0.0));
        }
    }
    let mut triangles = Vec::new();
    for y in 0..n {
        for x in 0..n {
            let i = y * side + x;
            triangles.push([i, i + 1, i + side + 1]);
            triangles.push([i, i + side + 1, i + side]);
        }
    }
    let uvs: Vec<Vec2> = triangles
        .iter()
        .flatten()
        .map(|&v| positions[v as usize].truncate() / n as f32)
        .collect();
    MeshDescription::from_triangles(positions, &triangles)
        .with_attribute("uv", Attribute::new(Interpolation::FaceVarying, uvs))
}
