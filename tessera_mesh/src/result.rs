// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query results.

use glam::{Vec2, Vec3};

/// A point on the mesh surface.
///
/// Produced by every query of a [`MeshEvaluator`][crate::MeshEvaluator]. It is a plain
/// value; pass it back to [`MeshEvaluator::sample`][crate::MeshEvaluator::sample] to read
/// any other attribute at the same location.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QueryResult {
    /// Index of the triangle the point lies on.
    pub triangle: usize,
    /// Barycentric weights of the point on that triangle; non-negative, summing to one.
    pub bary: [f32; 3],
    /// Vertex ids of the triangle's corners.
    pub vertex_ids: [u32; 3],
    /// Position.
    pub point: Vec3,
    /// Unit geometric normal of the triangle (zero for a degenerate triangle).
    pub normal: Vec3,
    /// UV coordinate, if the mesh has a `Vec2` attribute with the configured UV name.
    pub uv: Option<Vec2>,
    /// Surface derivatives along U and V, when the triangle has a non-degenerate UV layout.
    pub tangents: Option<Tangents>,
}

/// Position derivatives with respect to the UV parameterization, constant over a triangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tangents {
    /// dP/du.
    pub u: Vec3,
    /// dP/dv.
    pub v: Vec3,
}

impl Tangents {
    /// Tangents of a triangle from its corner positions and UVs.
    ///
    /// Returns `None` when the UVs are collinear.
    pub fn from_corners(p: [Vec3; 3], uv: [Vec2; 3]) -> Option<Self> {
        let e1 = p[1] - p[0];
        let e2 = p[2] - p[0];
        let d1 = uv[1] - uv[0];
        let d2 = uv[2] - uv[0];
        let det = d1.perp_dot(d2);
        if det == 0.0 {
            return None;
        }
        let r = 1.0 / det;
        Some(Self {
            u: (e1 * d2.y - e2 * d1.y) * r,
            v: (e2 * d1.x - e1 * d2.x) * r,
        })
    }
}

/// A ray/mesh hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Where the ray hit.
    pub result: QueryResult,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Whether the ray arrived against the triangle's winding normal.
    pub front_facing: bool,
}
