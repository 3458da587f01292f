// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial queries over a triangle mesh.

use std::sync::OnceLock;

use glam::{Mat3, Vec2, Vec3};
use smallvec::SmallVec;
use tessera_index::{Aabb2D, Aabb3D, KdTree};

use crate::adjacency::FeatureNormals;
use crate::attribute::{AttributeValue, Interpolation};
use crate::config::EvaluatorConfig;
use crate::error::{MeshError, Result};
use crate::mass::{self, MassProperties};
use crate::result::{QueryResult, RayHit, Tangents};
use crate::snapshot::{MeshDescription, MeshSnapshot};
use crate::triangle;

/// Traversal stack of `(slot, lower bound)` pairs.
type Stack = SmallVec<[(usize, f32); 32]>;

/// Triangles laid out in UV space.
#[derive(Clone, Debug)]
struct UvIndex {
    corners: Vec<[Vec2; 3]>,
    bounds: Vec<Aabb2D<f32>>,
    tree: KdTree<Aabb2D<f32>>,
}

/// Answers geometric queries against one triangle mesh.
///
/// The evaluator takes a private [`MeshSnapshot`] and indexes the bounds of its triangles
/// in a [`KdTree`]. When the mesh has a `Vec2` attribute named
/// [`uv_name`][EvaluatorConfig::uv_name] that varies per vertex or per corner, a second
/// tree over the triangles' UV-space bounds serves [`point_at_uv`][Self::point_at_uv].
///
/// All queries take `&self` and can run from many threads at once. Volume, area and the
/// normals needed by [`signed_distance`][Self::signed_distance] are computed on first use
/// and then kept. [`rebuild`][Self::rebuild] needs `&mut self` and so can never overlap a
/// query.
///
/// # Example
///
/// ```rust
/// use glam::Vec3;
/// use tessera_mesh::{MeshDescription, MeshEvaluator};
///
/// // A single right triangle in the z = 0 plane.
/// let desc = MeshDescription::from_triangles(
///     vec![Vec3::ZERO, Vec3::X, Vec3::Y],
///     &[[0, 1, 2]],
/// );
/// let evaluator = MeshEvaluator::new(&desc)?;
///
/// let hit = evaluator.closest_point(Vec3::new(0.25, 0.25, 1.0)).unwrap();
/// assert_eq!(hit.triangle, 0);
/// assert!((hit.point - Vec3::new(0.25, 0.25, 0.0)).length() < 1e-6);
///
/// let ray = evaluator.intersection(Vec3::new(0.1, 0.1, -2.0), Vec3::Z, f32::INFINITY).unwrap();
/// assert!((ray.distance - 2.0).abs() < 1e-6);
/// assert!(!ray.front_facing);
/// # Ok::<(), tessera_mesh::MeshError>(())
/// ```
pub struct MeshEvaluator {
    mesh: MeshSnapshot,
    config: EvaluatorConfig,
    bounds: Vec<Aabb3D<f32>>,
    tree: KdTree<Aabb3D<f32>>,
    uv: Option<UvIndex>,
    mass: OnceLock<MassProperties>,
    area: OnceLock<f32>,
    normals: OnceLock<Result<FeatureNormals>>,
}

impl core::fmt::Debug for MeshEvaluator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MeshEvaluator")
            .field("triangles", &self.mesh.triangle_count())
            .field("config", &self.config)
            .field("tree", &self.tree)
            .field("uv_tree", &self.uv.as_ref().map(|uv| &uv.tree))
            .finish_non_exhaustive()
    }
}

impl MeshEvaluator {
    /// Validate `desc` and build an evaluator with the default configuration.
    pub fn new(desc: &MeshDescription) -> Result<Self> {
        Self::with_config(desc, EvaluatorConfig::default())
    }

    /// Validate `desc` and build an evaluator.
    pub fn with_config(desc: &MeshDescription, config: EvaluatorConfig) -> Result<Self> {
        Ok(Self::from_snapshot(MeshSnapshot::new(desc)?, config))
    }

    /// Build an evaluator over an existing snapshot.
    ///
    /// A [`max_leaf_size`][EvaluatorConfig::max_leaf_size] of zero is treated as one.
    pub fn from_snapshot(mesh: MeshSnapshot, mut config: EvaluatorConfig) -> Self {
        config.max_leaf_size = config.max_leaf_size.max(1);
        let bounds: Vec<_> = (0..mesh.triangle_count())
            .map(|t| {
                let [a, b, c] = mesh.corners(t);
                triangle::bound(a, b, c)
            })
            .collect();
        let tree = KdTree::build(&bounds, config.max_leaf_size);
        let uv = build_uv_index(&mesh, &config);
        log::debug!(
            "mesh evaluator: {} triangles, {} nodes (leaf size {}), uv tree: {}",
            mesh.triangle_count(),
            tree.node_count(),
            tree.max_leaf_size(),
            uv.is_some()
        );
        Self {
            mesh,
            config,
            bounds,
            tree,
            uv,
            mass: OnceLock::new(),
            area: OnceLock::new(),
            normals: OnceLock::new(),
        }
    }

    /// Rebuild the spatial trees from scratch with the current configuration.
    pub fn rebuild(&mut self) {
        self.tree.set_max_leaf_size(&self.bounds, self.config.max_leaf_size);
        if let Some(uv) = &mut self.uv {
            uv.tree.set_max_leaf_size(&uv.bounds, self.config.max_leaf_size);
        }
        log::debug!(
            "mesh evaluator: rebuilt {} nodes (leaf size {})",
            self.tree.node_count(),
            self.tree.max_leaf_size()
        );
    }

    /// Change the tree leaf capacity and rebuild.
    pub fn set_max_leaf_size(&mut self, max_leaf_size: usize) {
        self.config.max_leaf_size = max_leaf_size.max(1);
        self.rebuild();
    }

    /// The evaluated mesh.
    pub fn mesh(&self) -> &MeshSnapshot {
        &self.mesh
    }

    /// The configuration in use.
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// The triangle tree.
    pub fn tree(&self) -> &KdTree<Aabb3D<f32>> {
        &self.tree
    }

    /// Bound of the mesh positions.
    pub fn bound(&self) -> Aabb3D<f32> {
        self.mesh.bound()
    }

    /// Bound of the mesh in UV space, if it has usable UVs and at least one triangle.
    pub fn uv_bound(&self) -> Option<Aabb2D<f32>> {
        let uv = self.uv.as_ref()?;
        let bound = *uv.tree.bound(uv.tree.root());
        bound.is_valid().then_some(bound)
    }

    /// Indices of the triangles whose bounds overlap `query`, in ascending order.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Triangle indices fit in u32, like the tree handles."
    )]
    pub fn triangles_overlapping(&self, query: &Aabb3D<f32>) -> Vec<u32> {
        let mut out = Vec::new();
        self.tree
            .visit_overlapping(&self.bounds, query, |t| out.push(t as u32));
        out.sort_unstable();
        out
    }

    /// The closest point on the mesh to `p`; `None` only for a mesh without triangles.
    ///
    /// Ordered branch and bound: the nearer child of each branch is searched first and a
    /// subtree is skipped once its bound is no closer than the best point found so far.
    pub fn closest_point(&self, p: Vec3) -> Option<QueryResult> {
        if self.tree.is_empty() {
            return None;
        }
        let mut best_d2 = f32::INFINITY;
        let mut best: Option<(usize, [f32; 3])> = None;

        let root = self.tree.root();
        let mut stack = Stack::new();
        stack.push((root, triangle::distance_squared_to_box(p, self.tree.bound(root))));
        while let Some((slot, lower)) = stack.pop() {
            if lower >= best_d2 {
                continue;
            }
            if let (Some(lo), Some(hi)) = (self.tree.low_child(slot), self.tree.high_child(slot)) {
                let d_lo = triangle::distance_squared_to_box(p, self.tree.bound(lo));
                let d_hi = triangle::distance_squared_to_box(p, self.tree.bound(hi));
                // Nearer child on top.
                if d_lo <= d_hi {
                    stack.push((hi, d_hi));
                    stack.push((lo, d_lo));
                } else {
                    stack.push((lo, d_lo));
                    stack.push((hi, d_hi));
                }
                continue;
            }
            for &t in self.tree.members(slot) {
                let t = t as usize;
                let [a, b, c] = self.mesh.corners(t);
                let (q, bary) = triangle::closest_point(p, a, b, c);
                let d2 = (p - q).length_squared();
                if d2 < best_d2 {
                    best_d2 = d2;
                    best = Some((t, bary));
                }
            }
        }

        let (t, bary) = best?;
        log::trace!("closest point to {p}: triangle {t}, distance² {best_d2}");
        Some(self.evaluate(t, bary))
    }

    /// The point whose UV coordinate is `uv`.
    ///
    /// Fails with [`MeshError::MissingUvs`] when the mesh has no usable UV attribute.
    /// Returns `Ok(None)` when `uv` lies outside every triangle. Where UV islands overlap,
    /// the triangle with the smallest index wins.
    pub fn point_at_uv(&self, uv: Vec2) -> Result<Option<QueryResult>> {
        let index = self.uv.as_ref().ok_or_else(|| MeshError::MissingUvs {
            name: self.config.uv_name.clone(),
        })?;
        let eps = self.config.uv_epsilon;
        let mut best: Option<(usize, [f32; 3])> = None;
        index.tree.visit(
            &index.bounds,
            |b| {
                // Weights of at least `-eps` cover the triangle scaled by `1 + 3 eps` about
                // its centroid, which moves no corner further than `3 eps` times the
                // triangle's extent along either axis.
                let pad_x = 3.0 * eps * (b.max_x - b.min_x);
                let pad_y = 3.0 * eps * (b.max_y - b.min_y);
                b.min_x - pad_x <= uv.x
                    && uv.x <= b.max_x + pad_x
                    && b.min_y - pad_y <= uv.y
                    && uv.y <= b.max_y + pad_y
            },
            |t| {
                if best.is_some_and(|(found, _)| found < t) {
                    return;
                }
                let [a, b, c] = index.corners[t];
                let Some(bary) = triangle::barycentric_2d(uv, a, b, c) else {
                    return;
                };
                if bary.iter().all(|&w| w >= -eps) {
                    best = Some((t, normalize_weights(bary)));
                }
            },
        );
        Ok(best.map(|(t, bary)| {
            log::trace!("uv {uv}: triangle {t}");
            self.evaluate(t, bary)
        }))
    }

    /// The first hit of the ray from `origin` along `direction` within `max_distance`.
    ///
    /// `direction` is normalized internally, so distances are in world units. Both faces
    /// of a triangle are hit; [`RayHit::front_facing`] tells them apart. A zero direction
    /// hits nothing. Among equally distant hits the smallest triangle index wins.
    pub fn intersection(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || self.tree.is_empty() {
            return None;
        }
        let mut best_t = max_distance;
        let mut best: Option<(usize, triangle::TriangleHit)> = None;

        let mut stack = Stack::new();
        let root = self.tree.root();
        if let Some(t) = triangle::intersect_ray_box(origin, dir, self.tree.bound(root), best_t) {
            stack.push((root, t));
        }
        while let Some((slot, enter)) = stack.pop() {
            if enter > best_t {
                continue;
            }
            if let (Some(lo), Some(hi)) = (self.tree.low_child(slot), self.tree.high_child(slot)) {
                let t_lo = triangle::intersect_ray_box(origin, dir, self.tree.bound(lo), best_t);
                let t_hi = triangle::intersect_ray_box(origin, dir, self.tree.bound(hi), best_t);
                match (t_lo, t_hi) {
                    (Some(a), Some(b)) if a <= b => {
                        stack.push((hi, b));
                        stack.push((lo, a));
                    }
                    (Some(a), Some(b)) => {
                        stack.push((lo, a));
                        stack.push((hi, b));
                    }
                    (Some(a), None) => stack.push((lo, a)),
                    (None, Some(b)) => stack.push((hi, b)),
                    (None, None) => {}
                }
                continue;
            }
            for &t in self.tree.members(slot) {
                let t = t as usize;
                let [a, b, c] = self.mesh.corners(t);
                let Some(hit) = triangle::intersect_ray(origin, dir, a, b, c) else {
                    continue;
                };
                let better = match best {
                    None => hit.t <= best_t,
                    Some((found, _)) => hit.t < best_t || (hit.t == best_t && t < found),
                };
                if better {
                    best_t = hit.t;
                    best = Some((t, hit));
                }
            }
        }

        best.map(|(t, hit)| self.ray_hit(t, hit))
    }

    /// Every hit of the ray from `origin` along `direction` within `max_distance`, nearest
    /// first (ties by triangle index).
    pub fn intersections(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || self.tree.is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<(usize, triangle::TriangleHit)> = Vec::new();
        self.tree.visit(
            &self.bounds,
            |b| triangle::intersect_ray_box(origin, dir, b, max_distance).is_some(),
            |t| {
                let [a, b, c] = self.mesh.corners(t);
                if let Some(hit) = triangle::intersect_ray(origin, dir, a, b, c) {
                    if hit.t <= max_distance {
                        hits.push((t, hit));
                    }
                }
            },
        );
        hits.sort_unstable_by(|(ta, a), (tb, b)| a.t.total_cmp(&b.t).then(ta.cmp(tb)));
        log::trace!("ray from {origin} along {dir}: {} hits", hits.len());
        hits.into_iter().map(|(t, hit)| self.ray_hit(t, hit)).collect()
    }

    /// The point with barycentric weights `bary` on `triangle`, without any search.
    pub fn barycentric_position(&self, triangle: usize, bary: [f32; 3]) -> Result<QueryResult> {
        self.mesh.triangle(triangle)?;
        Ok(self.evaluate(triangle, bary))
    }

    /// Signed distance from `p` to the mesh: negative inside, positive outside.
    ///
    /// The sign comes from the normal of the closest feature (face, edge or vertex, chosen
    /// with [`feature_epsilon`][EvaluatorConfig::feature_epsilon]), which needs a closed
    /// manifold mesh; otherwise every call fails with [`MeshError::NonManifold`]. Returns
    /// `Ok(None)` for a mesh without triangles.
    pub fn signed_distance(&self, p: Vec3) -> Result<Option<f32>> {
        let normals = self.feature_normals()?;
        Ok(self.signed_distance_with(normals, p))
    }

    fn signed_distance_with(&self, normals: &FeatureNormals, p: Vec3) -> Option<f32> {
        let closest = self.closest_point(p)?;
        let offset = p - closest.point;
        let distance = offset.length();
        if distance == 0.0 {
            return Some(0.0);
        }
        let n = normals.classify(
            closest.triangle,
            closest.vertex_ids,
            closest.bary,
            self.config.feature_epsilon,
        );
        Some(if n.dot(offset) < 0.0 { -distance } else { distance })
    }

    fn feature_normals(&self) -> Result<&FeatureNormals> {
        self.normals
            .get_or_init(|| FeatureNormals::new(&self.mesh))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Enclosed volume (unit density solid; negative for inward winding).
    pub fn volume(&self) -> f32 {
        self.mass_properties().volume
    }

    /// Center of gravity of the enclosed solid.
    pub fn center_of_gravity(&self) -> Vec3 {
        self.mass_properties().center_of_gravity
    }

    /// Inertia tensor of the enclosed solid about its center of gravity.
    pub fn inertia_tensor(&self) -> Mat3 {
        self.mass_properties().inertia_tensor
    }

    /// Volume, center of gravity and inertia, computed once.
    pub fn mass_properties(&self) -> &MassProperties {
        self.mass.get_or_init(|| MassProperties::compute(&self.mesh))
    }

    /// Total triangle area, computed once.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Accumulated in f64, reported in f32."
    )]
    pub fn surface_area(&self) -> f32 {
        *self.area.get_or_init(|| {
            let area = mass::surface_area(&self.mesh);
            log::debug!("surface area: {area}");
            area as f32
        })
    }

    /// Sample attribute `name` at a query result's location.
    pub fn sample<T: AttributeValue>(&self, at: &QueryResult, name: &str) -> Result<T> {
        self.mesh.sample(name, at.triangle, at.bary)
    }

    fn ray_hit(&self, t: usize, hit: triangle::TriangleHit) -> RayHit {
        RayHit {
            result: self.evaluate(t, hit.bary),
            distance: hit.t,
            front_facing: hit.front,
        }
    }

    /// Fill in a [`QueryResult`] for a known triangle and weights.
    fn evaluate(&self, t: usize, bary: [f32; 3]) -> QueryResult {
        let corners = self.mesh.corners(t);
        let uv = self
            .mesh
            .attribute(&self.config.uv_name)
            .and_then(|attribute| self.mesh.sample_attribute::<Vec2>(attribute, t, bary));
        let tangents = self
            .uv
            .as_ref()
            .and_then(|index| Tangents::from_corners(corners, index.corners[t]));
        QueryResult {
            triangle: t,
            bary,
            vertex_ids: self.mesh.triangles()[t],
            point: triangle::interpolate(corners, bary),
            normal: triangle::normal(corners[0], corners[1], corners[2]),
            uv,
            tangents,
        }
    }
}

#[cfg(feature = "rayon")]
impl MeshEvaluator {
    /// [`closest_point`][Self::closest_point] for many points in parallel.
    pub fn closest_points(&self, points: &[Vec3]) -> Vec<Option<QueryResult>> {
        use rayon::prelude::*;
        points.par_iter().map(|&p| self.closest_point(p)).collect()
    }

    /// [`signed_distance`][Self::signed_distance] for many points in parallel.
    pub fn signed_distances(&self, points: &[Vec3]) -> Result<Vec<Option<f32>>> {
        use rayon::prelude::*;
        let normals = self.feature_normals()?;
        Ok(points
            .par_iter()
            .map(|&p| self.signed_distance_with(normals, p))
            .collect())
    }
}

fn build_uv_index(mesh: &MeshSnapshot, config: &EvaluatorConfig) -> Option<UvIndex> {
    let attribute = mesh.attribute(&config.uv_name)?;
    if !matches!(
        attribute.interpolation,
        Interpolation::Vertex | Interpolation::Varying | Interpolation::FaceVarying
    ) {
        log::debug!(
            "uv attribute \"{}\" is {}; no uv tree",
            config.uv_name,
            attribute.interpolation
        );
        return None;
    }
    attribute.values::<Vec2>()?;
    let corners: Vec<[Vec2; 3]> = (0..mesh.triangle_count())
        .map(|t| {
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
                .map(|bary| mesh.sample_attribute(attribute, t, bary).unwrap_or(Vec2::ZERO))
        })
        .collect();
    let bounds: Vec<_> = corners
        .iter()
        .map(|&[a, b, c]| triangle::bound_2d(a, b, c))
        .collect();
    let tree = KdTree::build(&bounds, config.max_leaf_size);
    Some(UvIndex {
        corners,
        bounds,
        tree,
    })
}

/// Clamp slightly negative weights to zero and rescale to sum to one.
fn normalize_weights(bary: [f32; 3]) -> [f32; 3] {
    let clamped = bary.map(|w| w.max(0.0));
    let sum: f32 = clamped.iter().sum();
    if sum > 0.0 {
        clamped.map(|w| w / sum)
    } else {
        [1.0, 0.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;

    fn unit_cube() -> MeshDescription {
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

    /// A 2 x 2 grid of quads on z = 0 with per-vertex UVs equal to (x, y) / 2.
    fn uv_grid() -> MeshDescription {
        let mut positions = Vec::new();
        let mut uvs = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                positions.push(Vec3::new(x as f32, y as f32, 0.0));
                uvs.push(Vec2::new(x as f32 / 2.0, y as f32 / 2.0));
            }
        }
        let mut triangles = Vec::new();
        for y in 0..2_u32 {
            for x in 0..2_u32 {
                let i = y * 3 + x;
                triangles.push([i, i + 1, i + 4]);
                triangles.push([i, i + 4, i + 3]);
            }
        }
        MeshDescription::from_triangles(positions, &triangles)
            .with_attribute("uv", Attribute::new(Interpolation::Vertex, uvs))
    }

    #[test]
    fn empty_mesh_finds_nothing() {
        let evaluator = MeshEvaluator::new(&MeshDescription::from_triangles(Vec::new(), &[])).unwrap();
        assert!(evaluator.closest_point(Vec3::ZERO).is_none());
        assert!(evaluator.intersection(Vec3::ZERO, Vec3::X, f32::INFINITY).is_none());
        assert!(evaluator.intersections(Vec3::ZERO, Vec3::X, f32::INFINITY).is_empty());
        assert_eq!(evaluator.signed_distance(Vec3::ZERO), Ok(None));
        assert_eq!(evaluator.volume(), 0.0);
        assert_eq!(evaluator.surface_area(), 0.0);
        assert!(matches!(
            evaluator.point_at_uv(Vec2::ZERO),
            Err(MeshError::MissingUvs { .. })
        ));
    }

    #[test]
    fn cube_closest_points() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let r = evaluator.closest_point(Vec3::new(0.5, 0.5, 3.0)).unwrap();
        assert!((r.point - Vec3::new(0.5, 0.5, 1.0)).length() < 1e-6);
        assert_eq!(r.normal, Vec3::Z);
        assert!(r.uv.is_none());

        let r = evaluator.closest_point(Vec3::new(2.0, 2.0, 2.0)).unwrap();
        assert!((r.point - Vec3::ONE).length() < 1e-6);

        let inside = evaluator.closest_point(Vec3::new(0.5, 0.9, 0.5)).unwrap();
        assert!((inside.point.y - 1.0).abs() < 1e-6);
        assert_eq!(Some(inside), evaluator.closest_point(Vec3::new(0.5, 0.9, 0.5)));
    }

    #[test]
    fn cube_mass_properties() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        assert!((evaluator.volume() - 1.0).abs() < 1e-5);
        assert!((evaluator.surface_area() - 6.0).abs() < 1e-5);
        assert!((evaluator.center_of_gravity() - Vec3::splat(0.5)).length() < 1e-5);
        let inertia = evaluator.inertia_tensor();
        assert!((inertia.x_axis.x - 1.0 / 6.0).abs() < 1e-5);
        // Cached.
        assert!(core::ptr::eq(evaluator.mass_properties(), evaluator.mass_properties()));
    }

    #[test]
    fn cube_signed_distance() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let d = |p: Vec3| evaluator.signed_distance(p).unwrap().unwrap();
        assert!((d(Vec3::splat(0.5)) + 0.5).abs() < 1e-5);
        assert!((d(Vec3::new(0.5, 0.5, 1.5)) - 0.5).abs() < 1e-5);
        assert!((d(Vec3::new(0.2, 0.3, 0.1)) + 0.1).abs() < 1e-5);
        // Closest features are an edge and a vertex.
        assert!((d(Vec3::new(1.5, 0.5, 1.5)) - 0.5_f32.sqrt()).abs() < 1e-5);
        assert!((d(Vec3::splat(-1.0)) - 3.0_f32.sqrt()).abs() < 1e-5);
        // Diagonal points, where a face-normal test can pick the wrong sign.
        assert!(d(Vec3::new(0.999, 0.999, 0.5)) < 0.0);
        assert!(d(Vec3::new(1.001, 1.001, 0.5)) > 0.0);
        assert!(d(Vec3::new(1.0, 0.5, 0.5)).abs() < 1e-6);
    }

    #[test]
    fn non_manifold_only_affects_signed_distance() {
        let mut desc = unit_cube();
        desc.vertices_per_face.pop();
        desc.vertex_ids.truncate(33);
        let evaluator = MeshEvaluator::new(&desc).unwrap();
        assert!(matches!(
            evaluator.signed_distance(Vec3::ZERO),
            Err(MeshError::NonManifold { triangle_count: 1, .. })
        ));
        // Reported again, from the cache.
        assert!(evaluator.signed_distance(Vec3::ONE).is_err());
        assert!(evaluator.closest_point(Vec3::ZERO).is_some());
        assert!(evaluator.volume().is_finite());
    }

    #[test]
    fn rays_through_cube() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let origin = Vec3::new(0.25, 0.5, -1.0);
        let first = evaluator.intersection(origin, Vec3::new(0.0, 0.0, 5.0), f32::INFINITY).unwrap();
        assert!((first.distance - 1.0).abs() < 1e-6);
        assert!(first.front_facing);
        assert!((first.result.point - Vec3::new(0.25, 0.5, 0.0)).length() < 1e-6);

        let all = evaluator.intersections(origin, Vec3::Z, f32::INFINITY);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].result.triangle, first.result.triangle);
        assert!((all[1].distance - 2.0).abs() < 1e-6);
        assert!(!all[1].front_facing);

        assert!(evaluator.intersection(origin, Vec3::Z, 0.5).is_none());
        assert_eq!(evaluator.intersections(origin, Vec3::Z, 1.5).len(), 1);
        assert!(evaluator.intersection(origin, Vec3::NEG_Z, f32::INFINITY).is_none());
        assert!(evaluator.intersection(origin, Vec3::ZERO, f32::INFINITY).is_none());
    }

    #[test]
    fn barycentric_position_blends_corners() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let r = evaluator.barycentric_position(2, [0.2, 0.3, 0.5]).unwrap();
        // Triangle 2 is vertices [4, 5, 6].
        let expected = Vec3::new(0.0, 0.0, 1.0) * 0.2 + Vec3::new(1.0, 0.0, 1.0) * 0.3 + Vec3::ONE * 0.5;
        assert!((r.point - expected).length() < 1e-6);
        assert_eq!(r.vertex_ids, [4, 5, 6]);
        assert!(matches!(
            evaluator.barycentric_position(12, [1.0, 0.0, 0.0]),
            Err(MeshError::TriangleOutOfRange { triangle: 12, .. })
        ));
    }

    #[test]
    fn uv_lookup_round_trips() {
        let evaluator = MeshEvaluator::new(&uv_grid()).unwrap();
        assert_eq!(
            evaluator.uv_bound(),
            Some(Aabb2D::new(0.0, 0.0, 1.0, 1.0))
        );
        for t in 0..evaluator.mesh().triangle_count() {
            let bary = [0.2, 0.3, 0.5];
            let on = evaluator.barycentric_position(t, bary).unwrap();
            let uv = on.uv.unwrap();
            let found = evaluator.point_at_uv(uv).unwrap().unwrap();
            assert_eq!(found.triangle, t);
            for k in 0..3 {
                assert!((found.bary[k] - bary[k]).abs() < 1e-4);
            }
            assert!((found.point - on.point).length() < 1e-4);
        }
        assert_eq!(evaluator.point_at_uv(Vec2::new(1.5, 0.5)), Ok(None));
    }

    #[test]
    fn uv_tie_break_prefers_smallest_triangle() {
        let evaluator = MeshEvaluator::new(&uv_grid()).unwrap();
        // On the shared diagonal of the first quad, both of its triangles contain the uv.
        let r = evaluator.point_at_uv(Vec2::new(0.25, 0.25)).unwrap().unwrap();
        assert_eq!(r.triangle, 0);
        // The center vertex touches triangles 0, 1, 3, 4, 6 and 7.
        let r = evaluator.point_at_uv(Vec2::new(0.5, 0.5)).unwrap().unwrap();
        assert_eq!(r.triangle, 0);
    }

    #[test]
    fn tangents_from_uvs() {
        let evaluator = MeshEvaluator::new(&uv_grid()).unwrap();
        let r = evaluator.closest_point(Vec3::new(0.3, 0.2, 1.0)).unwrap();
        let tangents = r.tangents.unwrap();
        assert!((tangents.u - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((tangents.v - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn constant_uvs_get_no_uv_tree() {
        let desc = uv_grid().with_attribute(
            "uv",
            Attribute::new(Interpolation::Constant, vec![Vec2::ONE]),
        );
        let evaluator = MeshEvaluator::new(&desc).unwrap();
        assert!(evaluator.uv_bound().is_none());
        assert!(evaluator.point_at_uv(Vec2::ONE).is_err());
        // Still sampled into results.
        let r = evaluator.closest_point(Vec3::ZERO).unwrap();
        assert_eq!(r.uv, Some(Vec2::ONE));
        assert!(r.tangents.is_none());
    }

    #[test]
    fn rebuild_keeps_answers() {
        let mut evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let p = Vec3::new(0.3, -0.4, 0.8);
        let before = evaluator.closest_point(p).unwrap();
        evaluator.set_max_leaf_size(1);
        assert_eq!(evaluator.config().max_leaf_size, 1);
        assert_eq!(evaluator.tree().max_leaf_size(), 1);
        let after = evaluator.closest_point(p).unwrap();
        assert!((before.point - after.point).length() < 1e-6);
    }

    #[test]
    fn zero_leaf_size_counts_as_one() {
        let config = EvaluatorConfig {
            max_leaf_size: 0,
            ..Default::default()
        };
        let mut evaluator = MeshEvaluator::with_config(&uv_grid(), config).unwrap();
        assert_eq!(evaluator.config().max_leaf_size, 1);
        assert_eq!(evaluator.tree().max_leaf_size(), 1);
        let r = evaluator.closest_point(Vec3::new(0.5, 1.5, 1.0)).unwrap();
        assert!((r.point - Vec3::new(0.5, 1.5, 0.0)).length() < 1e-6);
        assert!(evaluator.point_at_uv(Vec2::splat(0.25)).unwrap().is_some());

        evaluator.set_max_leaf_size(0);
        assert_eq!(evaluator.tree().max_leaf_size(), 1);
        evaluator.rebuild();
        assert!(evaluator.closest_point(Vec3::ZERO).is_some());
    }

    #[test]
    fn triangle_with_coincident_corners_is_still_found() {
        let desc = MeshDescription::from_triangles(vec![Vec3::ZERO, Vec3::ZERO, Vec3::X], &[[0, 1, 2]]);
        let evaluator = MeshEvaluator::new(&desc).unwrap();
        let r = evaluator.closest_point(Vec3::new(0.5, 1.0, 0.0)).unwrap();
        assert_eq!(r.triangle, 0);
        assert!((r.point - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
        assert!(r.bary.iter().all(|w| w.is_finite()));
        for p in [Vec3::new(-2.0, 0.3, 0.1), Vec3::new(4.0, -1.0, 2.0), Vec3::ZERO] {
            assert!(evaluator.closest_point(p).is_some(), "{p}");
        }
    }

    #[test]
    fn collapsed_triangles_keep_signs() {
        // A tetrahedron whose edge (1, 2) is split by a vertex lying exactly on vertex 1.
        let desc = MeshDescription::from_triangles(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z, Vec3::X],
            &[[0, 2, 4], [0, 4, 1], [0, 1, 3], [0, 3, 2], [1, 4, 3], [4, 2, 3]],
        );
        let evaluator = MeshEvaluator::new(&desc).unwrap();
        let d = |p: Vec3| evaluator.signed_distance(p).unwrap().unwrap();
        for p in [Vec3::splat(0.2), Vec3::new(0.9, 0.03, 0.03), Vec3::new(0.6, 0.1, 0.05)] {
            assert!(d(p) < 0.0, "{p}");
        }
        // Past the doubled corner.
        assert!((d(Vec3::new(1.5, -0.5, -0.5)) - 0.75_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn uv_tolerance_scales_with_triangle_size() {
        // One large UV triangle, so a small barycentric slack is a wide margin in UV units.
        let desc = MeshDescription::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 2]])
            .with_attribute(
                "uv",
                Attribute::new(
                    Interpolation::Vertex,
                    vec![Vec2::ZERO, Vec2::new(1000.0, 0.0), Vec2::new(0.0, 1000.0)],
                ),
            );
        let config = EvaluatorConfig::new().with_uv_epsilon(1e-4);
        let evaluator = MeshEvaluator::with_config(&desc, config).unwrap();

        // Weight -5e-5 on the second corner: within tolerance, though 0.05 outside the box.
        let r = evaluator.point_at_uv(Vec2::new(-0.05, 500.0)).unwrap().unwrap();
        assert_eq!(r.triangle, 0);
        assert!(r.bary.iter().all(|&w| w >= 0.0));
        assert!((r.bary.iter().sum::<f32>() - 1.0).abs() < 1e-6);

        // Weight -5e-4: outside.
        assert_eq!(evaluator.point_at_uv(Vec2::new(-0.5, 500.0)), Ok(None));
    }

    #[test]
    fn overlapping_triangles_and_sampling() {
        let desc = unit_cube().with_attribute(
            "id",
            Attribute::new(Interpolation::Uniform, (0..12).collect::<Vec<i32>>()),
        );
        let evaluator = MeshEvaluator::new(&desc).unwrap();
        let top = Aabb3D::new([0.1, 0.1, 0.9], [0.9, 0.9, 1.1]);
        assert_eq!(evaluator.triangles_overlapping(&top), vec![2, 3]);

        let r = evaluator.closest_point(Vec3::new(0.5, 0.5, 9.0)).unwrap();
        let id: i32 = evaluator.sample(&r, "id").unwrap();
        assert_eq!(id as usize, r.triangle);
    }

    #[test]
    fn evaluator_is_send_and_sync() {
        fn check<T: Send + Sync>() {}
        check::<MeshEvaluator>();
    }
}
