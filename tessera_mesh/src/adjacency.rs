// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Triangle adjacency and the feature normals used to sign distances.
//!
//! The sign of a distance is read from the normal of the closest *feature*: a face,
//! an edge or a vertex. Edge normals average the two adjacent face normals; vertex
//! normals are angle-weighted pseudo-normals (Bærentzen and Aanæs), which classify
//! inside and outside correctly at both convex and concave corners of a closed mesh.

use glam::Vec3;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::{MeshError, Result};
use crate::snapshot::MeshSnapshot;
use crate::triangle;

/// An undirected edge, smaller vertex id first.
pub(crate) type Edge = (u32, u32);

#[inline]
pub(crate) fn edge(a: u32, b: u32) -> Edge {
    if a < b { (a, b) } else { (b, a) }
}

/// Vertex-to-triangle and edge-to-triangle incidence.
#[derive(Clone, Debug)]
pub(crate) struct Adjacency {
    pub(crate) vertex_triangles: Vec<SmallVec<[u32; 8]>>,
    pub(crate) edge_triangles: HashMap<Edge, SmallVec<[u32; 2]>>,
}

impl Adjacency {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Triangle indices fit in u32, like the tree handles."
    )]
    pub(crate) fn new(mesh: &MeshSnapshot) -> Self {
        let mut vertex_triangles = vec![SmallVec::new(); mesh.vertex_count()];
        let mut edge_triangles: HashMap<Edge, SmallVec<[u32; 2]>> =
            HashMap::with_capacity(mesh.triangle_count() * 3 / 2);
        for (t, ids) in mesh.triangles().iter().enumerate() {
            let t = t as u32;
            for k in 0..3 {
                vertex_triangles[ids[k] as usize].push(t);
                edge_triangles
                    .entry(edge(ids[k], ids[(k + 1) % 3]))
                    .or_default()
                    .push(t);
            }
        }
        Self {
            vertex_triangles,
            edge_triangles,
        }
    }

    /// The smallest edge not shared by exactly two triangles, with its triangle count.
    pub(crate) fn first_non_manifold_edge(&self) -> Option<(Edge, usize)> {
        self.edge_triangles
            .iter()
            .filter(|(_, tris)| tris.len() != 2)
            .map(|(&e, tris)| (e, tris.len()))
            .min()
    }
}

/// Face, edge and vertex normals of a closed manifold mesh.
#[derive(Clone, Debug)]
pub(crate) struct FeatureNormals {
    face: Vec<Vec3>,
    edge: HashMap<Edge, Vec3>,
    vertex: Vec<Vec3>,
}

impl FeatureNormals {
    /// Compute all feature normals, or fail if some edge is not shared by exactly two
    /// triangles.
    pub(crate) fn new(mesh: &MeshSnapshot) -> Result<Self> {
        let adjacency = Adjacency::new(mesh);
        if let Some((edge, triangle_count)) = adjacency.first_non_manifold_edge() {
            log::warn!(
                "mesh is not a closed manifold: edge {edge:?} has {triangle_count} triangles"
            );
            return Err(MeshError::NonManifold {
                edge,
                triangle_count,
            });
        }

        let face: Vec<Vec3> = (0..mesh.triangle_count())
            .map(|t| {
                let [a, b, c] = mesh.corners(t);
                triangle::normal(a, b, c)
            })
            .collect();

        let vertex = adjacency
            .vertex_triangles
            .iter()
            .enumerate()
            .map(|(v, tris)| {
                let mut sum = Vec3::ZERO;
                for &t in tris {
                    let t = t as usize;
                    let ids = mesh.triangles()[t];
                    let p = mesh.corners(t);
                    let k = ids.iter().position(|&id| id as usize == v).unwrap_or(0);
                    let angle = triangle::angle_at(p[k], p[(k + 1) % 3], p[(k + 2) % 3]);
                    // Collapsed triangles have no angle or normal to give.
                    if angle.is_finite() && face[t] != Vec3::ZERO {
                        sum += face[t] * angle;
                    }
                }
                sum.normalize_or_zero()
            })
            .collect();

        let edge = adjacency
            .edge_triangles
            .iter()
            .map(|(&e, tris)| {
                let n = tris
                    .iter()
                    .fold(Vec3::ZERO, |acc, &t| acc + face[t as usize]);
                (e, n.normalize_or_zero())
            })
            .collect();

        log::debug!(
            "feature normals: {} faces, {} edges, {} vertices",
            mesh.triangle_count(),
            adjacency.edge_triangles.len(),
            mesh.vertex_count()
        );

        Ok(Self { face, edge, vertex })
    }

    /// The normal of the feature closest point `bary` on triangle `t` lies on.
    ///
    /// Weights at or below `epsilon` count as zero: none gives the face, one gives the
    /// edge opposite that corner, two give the remaining vertex.
    pub(crate) fn classify(&self, t: usize, ids: [u32; 3], bary: [f32; 3], epsilon: f32) -> Vec3 {
        let near_zero = bary.map(|w| w <= epsilon);
        match near_zero {
            [false, false, false] | [true, true, true] => self.face[t],
            [true, false, false] => self.edge_normal(ids[1], ids[2], t),
            [false, true, false] => self.edge_normal(ids[2], ids[0], t),
            [false, false, true] => self.edge_normal(ids[0], ids[1], t),
            [false, true, true] => self.vertex[ids[0] as usize],
            [true, false, true] => self.vertex[ids[1] as usize],
            [true, true, false] => self.vertex[ids[2] as usize],
        }
    }

    fn edge_normal(&self, a: u32, b: u32, t: usize) -> Vec3 {
        self.edge.get(&edge(a, b)).copied().unwrap_or(self.face[t])
    }
}
