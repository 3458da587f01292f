// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Probe a torus mesh with every kind of query.
//!
//! This example shows how to:
//! - describe a mesh with positions and face-varying UVs,
//! - query closest points, rays and UV locations,
//! - compare the cached volume and area against the analytic torus,
//! - render a signed-distance slice with the parallel batch query.
//!
//! Run:
//! - `cargo run -p tessera_demos --example torus_probe`

use core::f32::consts::{PI, TAU};

use tessera_index::Aabb3D;
use tessera_mesh::glam::{Vec2, Vec3};
use tessera_mesh::{Attribute, Interpolation, MeshDescription, MeshEvaluator, MeshError};

const MAJOR: f32 = 2.0;
const MINOR: f32 = 0.75;

/// A closed torus around the z axis with `(u, v)` texture coordinates per corner.
///
/// UVs are face-varying so the seams at `u = 1` and `v = 1` do not wrap back to zero.
fn torus(rings: u32, sides: u32) -> MeshDescription {
    let mut positions = Vec::new();
    for i in 0..rings {
        let u = TAU * i as f32 / rings as f32;
        for j in 0..sides {
            let v = TAU * j as f32 / sides as f32;
            let r = MAJOR + MINOR * v.cos();
            positions.push(Vec3::new(r * u.cos(), r * u.sin(), MINOR * v.sin()));
        }
    }
    let id = |i: u32, j: u32| (i % rings) * sides + j % sides;
    let uv = |i: u32, j: u32| Vec2::new(i as f32 / rings as f32, j as f32 / sides as f32);

    let mut triangles = Vec::new();
    let mut uvs = Vec::new();
    for i in 0..rings {
        for j in 0..sides {
            triangles.push([id(i, j), id(i + 1, j), id(i + 1, j + 1)]);
            uvs.extend([uv(i, j), uv(i + 1, j), uv(i + 1, j + 1)]);
            triangles.push([id(i, j), id(i + 1, j + 1), id(i, j + 1)]);
            uvs.extend([uv(i, j), uv(i + 1, j + 1), uv(i, j + 1)]);
        }
    }
    MeshDescription::from_triangles(positions, &triangles)
        .with_attribute("uv", Attribute::new(Interpolation::FaceVarying, uvs))
}

fn main() -> Result<(), MeshError> {
    let evaluator = MeshEvaluator::new(&torus(64, 24))?;
    println!(
        "{} triangles, {} tree nodes",
        evaluator.mesh().triangle_count(),
        evaluator.tree().node_count()
    );

    // Cached integrals against the smooth torus.
    let volume = 2.0 * PI * PI * MAJOR * MINOR * MINOR;
    let area = 4.0 * PI * PI * MAJOR * MINOR;
    println!("volume  {:8.4} (smooth {volume:.4})", evaluator.volume());
    println!("area    {:8.4} (smooth {area:.4})", evaluator.surface_area());
    println!("center  {:?}", evaluator.center_of_gravity());

    // Closest point from above the tube.
    let p = Vec3::new(MAJOR, 0.0, 2.0);
    if let Some(hit) = evaluator.closest_point(p) {
        println!(
            "closest to {p}: {} on triangle {} (uv {:?})",
            hit.point, hit.triangle, hit.uv
        );
    }

    // A ray along x crosses the tube twice on each side of the hole.
    let origin = Vec3::new(-5.0, 0.0, 0.0);
    for hit in evaluator.intersections(origin, Vec3::X, f32::INFINITY) {
        println!(
            "ray hit at {:7.4} ({}) {}",
            hit.distance,
            if hit.front_facing { "enter" } else { "exit" },
            hit.result.point
        );
    }

    // Back from texture space to the surface.
    for uv in [Vec2::new(0.0, 0.0), Vec2::new(0.25, 0.5), Vec2::new(0.6, 0.9)] {
        match evaluator.point_at_uv(uv)? {
            Some(hit) => println!("uv {uv} -> {} (tangents {:?})", hit.point, hit.tangents),
            None => println!("uv {uv} -> nothing"),
        }
    }

    let slab = Aabb3D::new([-0.1, -3.0, -1.0], [0.1, 3.0, 1.0]);
    println!(
        "{} triangles near the plane x = 0",
        evaluator.triangles_overlapping(&slab).len()
    );

    // Signed distance slice through z = 0.
    const W: usize = 64;
    const H: usize = 32;
    let points: Vec<Vec3> = (0..H)
        .flat_map(|y| {
            (0..W).map(move |x| {
                Vec3::new(
                    (x as f32 / (W - 1) as f32 - 0.5) * 7.0,
                    (y as f32 / (H - 1) as f32 - 0.5) * 7.0,
                    0.0,
                )
            })
        })
        .collect();
    let distances = evaluator.signed_distances(&points)?;
    for row in distances.chunks(W) {
        let line: String = row
            .iter()
            .map(|d| match d {
                Some(d) if *d < -0.25 => '#',
                Some(d) if *d < 0.0 => '+',
                Some(d) if *d < 0.25 => '.',
                _ => ' ',
            })
            .collect();
        println!("{line}");
    }
    Ok(())
}
