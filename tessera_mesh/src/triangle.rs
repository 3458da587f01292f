// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-triangle and single-box geometry.
//!
//! Barycentric weights are always `[w0, w1, w2]` for the triangle's corners in order,
//! so `w0 * a + w1 * b + w2 * c` reconstructs the point.

use glam::{Vec2, Vec3};
use tessera_index::{Aabb2D, Aabb3D};

/// Relative determinant threshold below which a ray counts as parallel to a triangle.
const PARALLEL_EPSILON: f32 = 1e-7;

/// Closest point on triangle `abc` to `p`, with its barycentric weights.
///
/// Voronoi-region walk from Ericson, "Real-Time Collision Detection", 5.1.5.
/// Zero-length edges never claim a region, so triangles with coincident corners fall
/// through to a vertex or to a proper edge. Triangles with no area at all are handled
/// as three segments.
pub fn closest_point(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (Vec3, [f32; 3]) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, [1.0, 0.0, 0.0]);
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, [0.0, 1.0, 0.0]);
    }

    let vc = d1 * d4 - d3 * d2;
    let ab_len2 = d1 - d3;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 && ab_len2 > 0.0 {
        let v = d1 / ab_len2;
        return (a + ab * v, [1.0 - v, v, 0.0]);
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, [0.0, 0.0, 1.0]);
    }

    let vb = d5 * d2 - d1 * d6;
    let ac_len2 = d2 - d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 && ac_len2 > 0.0 {
        let w = d2 / ac_len2;
        return (a + ac * w, [1.0 - w, 0.0, w]);
    }

    let va = d3 * d6 - d5 * d4;
    let bc_len2 = (d4 - d3) + (d5 - d6);
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 && bc_len2 > 0.0 {
        let w = (d4 - d3) / bc_len2;
        return (b + (c - b) * w, [0.0, 1.0 - w, w]);
    }

    let sum = va + vb + vc;
    if sum <= 0.0 || !sum.is_finite() {
        return closest_point_on_edges(p, a, b, c);
    }
    let denom = 1.0 / sum;
    let v = vb * denom;
    let w = vc * denom;
    (a + ab * v + ac * w, [1.0 - v - w, v, w])
}

/// Closest point on the boundary of a triangle with no interior.
fn closest_point_on_edges(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (Vec3, [f32; 3]) {
    let on_segment = |from: Vec3, to: Vec3| {
        let d = to - from;
        let len2 = d.length_squared();
        let s = if len2 > 0.0 {
            ((p - from).dot(d) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (from + d * s, s)
    };
    let (q_ab, s) = on_segment(a, b);
    let (q_bc, t) = on_segment(b, c);
    let (q_ca, u) = on_segment(c, a);
    [
        (q_ab, [1.0 - s, s, 0.0]),
        (q_bc, [0.0, 1.0 - t, t]),
        (q_ca, [u, 0.0, 1.0 - u]),
    ]
    .into_iter()
    .fold((a, [1.0, 0.0, 0.0]), |best, candidate| {
        if p.distance_squared(candidate.0) < p.distance_squared(best.0) {
            candidate
        } else {
            best
        }
    })
}

/// A ray/triangle hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleHit {
    /// Distance along the (unit) ray direction.
    pub t: f32,
    /// Barycentric weights of the hit point.
    pub bary: [f32; 3],
    /// Whether the ray arrived against the triangle's winding normal.
    pub front: bool,
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Both faces are hit. Only hits with `t >= 0` are reported; `direction` need not be
/// normalized but `t` is measured in its units.
pub fn intersect_ray(origin: Vec3, direction: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<TriangleHit> {
    let e1 = b - a;
    let e2 = c - a;

    let pvec = direction.cross(e2);
    let det = e1.dot(pvec);
    if det.abs() <= PARALLEL_EPSILON * e1.length() * e2.length() * direction.length() {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = origin - a;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(e1);
    let v = direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = e2.dot(qvec) * inv_det;
    if t < 0.0 {
        return None;
    }

    Some(TriangleHit {
        t,
        bary: [(1.0 - u - v).max(0.0), u, v],
        // det = -direction . (e1 x e2)
        front: det > 0.0,
    })
}

/// Barycentric weights of `p` with respect to the 2D triangle `abc`.
///
/// Returns `None` for a degenerate (zero-area) triangle. Weights may be negative when
/// `p` lies outside.
pub fn barycentric_2d(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> Option<[f32; 3]> {
    let ab = b - a;
    let ac = c - a;
    let det = ab.perp_dot(ac);
    if det == 0.0 {
        return None;
    }
    let ap = p - a;
    let v = ap.perp_dot(ac) / det;
    let w = ab.perp_dot(ap) / det;
    Some([1.0 - v - w, v, w])
}

/// Unit normal following the winding `a -> b -> c`; zero for degenerate triangles.
#[inline]
pub fn normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Area of triangle `abc`.
#[inline]
pub fn area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    0.5 * (b - a).cross(c - a).length()
}

/// Interior angle at `a` of triangle `abc`, in radians.
#[inline]
pub fn angle_at(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (b - a).angle_between(c - a)
}

/// Blend three values with barycentric weights.
#[inline]
pub fn interpolate(v: [Vec3; 3], bary: [f32; 3]) -> Vec3 {
    v[0] * bary[0] + v[1] * bary[1] + v[2] * bary[2]
}

/// Squared distance from `p` to the nearest point of `bound`; zero inside.
pub fn distance_squared_to_box(p: Vec3, bound: &Aabb3D<f32>) -> f32 {
    let lo = Vec3::from_array(bound.min());
    let hi = Vec3::from_array(bound.max());
    let d = (lo - p).max(Vec3::ZERO).max(p - hi);
    d.length_squared()
}

/// Entry distance of a ray into `bound` if it enters before `t_max`.
///
/// Slab test. Axes where the ray is parallel to the slab reject the ray when the origin
/// is outside the slab and are ignored otherwise, so flat boxes (for example the bound of
/// an axis-aligned triangle) are handled. The returned distance is clamped to zero when
/// the origin is inside.
pub fn intersect_ray_box(origin: Vec3, direction: Vec3, bound: &Aabb3D<f32>, t_max: f32) -> Option<f32> {
    let lo = bound.min();
    let hi = bound.max();
    let mut t_enter = 0.0_f32;
    let mut t_exit = t_max;
    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d == 0.0 {
            if o < lo[axis] || o > hi[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let t0 = (lo[axis] - o) * inv;
        let t1 = (hi[axis] - o) * inv;
        let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        t_enter = t_enter.max(near);
        t_exit = t_exit.min(far);
        if t_enter > t_exit {
            return None;
        }
    }
    Some(t_enter)
}

/// The tight bound of triangle `abc`.
pub fn bound(a: Vec3, b: Vec3, c: Vec3) -> Aabb3D<f32> {
    let lo = a.min(b).min(c);
    let hi = a.max(b).max(c);
    Aabb3D::new(lo.to_array(), hi.to_array())
}

/// The tight bound of 2D triangle `abc`.
pub fn bound_2d(a: Vec2, b: Vec2, c: Vec2) -> Aabb2D<f32> {
    let lo = a.min(b).min(c);
    let hi = a.max(b).max(c);
    Aabb2D::new(lo.x, lo.y, hi.x, hi.y)
}
