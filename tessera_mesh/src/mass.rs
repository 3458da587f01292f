// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Volume, center of gravity and inertia of a closed triangle mesh.
//!
//! Uses Eberly's polyhedral mass properties: each triangle contributes closed-form
//! surface integrals (divergence theorem), accumulated in `f64`. The mesh is treated
//! as a solid of unit density. Results are meaningful for closed, consistently wound
//! meshes; outward winding gives a positive volume.

use glam::{DMat3, DVec3, Mat3, Vec3};

use crate::snapshot::MeshSnapshot;

/// Mass properties of a unit-density solid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MassProperties {
    /// Signed volume; negative for inward-wound meshes.
    pub volume: f32,
    /// Center of gravity.
    pub center_of_gravity: Vec3,
    /// Inertia tensor about the center of gravity.
    pub inertia_tensor: Mat3,
}

impl MassProperties {
    /// Integrate over every triangle of `mesh`.
    ///
    /// A mesh enclosing no volume (for example an open sheet) reports zero volume and
    /// inertia, and its area-weighted centroid as the center of gravity.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Results are reported in f32 like the mesh positions."
    )]
    pub fn compute(mesh: &MeshSnapshot) -> Self {
        // 1, x, y, z, x², y², z², xy, yz, zx
        let mut integral = [0.0_f64; 10];
        for t in 0..mesh.triangle_count() {
            let [p0, p1, p2] = mesh.corners(t).map(|p| p.as_dvec3());
            let d = (p1 - p0).cross(p2 - p0);
            let (f1x, f2x, f3x, g0x, g1x, g2x) = subexpressions(p0.x, p1.x, p2.x);
            let (_, f2y, f3y, g0y, g1y, g2y) = subexpressions(p0.y, p1.y, p2.y);
            let (_, f2z, f3z, g0z, g1z, g2z) = subexpressions(p0.z, p1.z, p2.z);

            integral[0] += d.x * f1x;
            integral[1] += d.x * f2x;
            integral[2] += d.y * f2y;
            integral[3] += d.z * f2z;
            integral[4] += d.x * f3x;
            integral[5] += d.y * f3y;
            integral[6] += d.z * f3z;
            integral[7] += d.x * (p0.y * g0x + p1.y * g1x + p2.y * g2x);
            integral[8] += d.y * (p0.z * g0y + p1.z * g1y + p2.z * g2y);
            integral[9] += d.z * (p0.x * g0z + p1.x * g1z + p2.x * g2z);
        }
        const SCALE: [f64; 10] = [
            1.0 / 6.0,
            1.0 / 24.0,
            1.0 / 24.0,
            1.0 / 24.0,
            1.0 / 60.0,
            1.0 / 60.0,
            1.0 / 60.0,
            1.0 / 120.0,
            1.0 / 120.0,
            1.0 / 120.0,
        ];
        for (value, scale) in integral.iter_mut().zip(SCALE) {
            *value *= scale;
        }

        let mass = integral[0];
        let scale = mesh.bound().volume().max(f64::MIN_POSITIVE);
        if mass.abs() <= 1e-12 * scale || mesh.triangle_count() == 0 {
            log::debug!("mass properties: mesh encloses no volume");
            return Self {
                volume: 0.0,
                center_of_gravity: surface_centroid(mesh).as_vec3(),
                inertia_tensor: Mat3::ZERO,
            };
        }

        let c = DVec3::new(integral[1], integral[2], integral[3]) / mass;
        let xx = integral[5] + integral[6] - mass * (c.y * c.y + c.z * c.z);
        let yy = integral[4] + integral[6] - mass * (c.z * c.z + c.x * c.x);
        let zz = integral[4] + integral[5] - mass * (c.x * c.x + c.y * c.y);
        let xy = -(integral[7] - mass * c.x * c.y);
        let yz = -(integral[8] - mass * c.y * c.z);
        let xz = -(integral[9] - mass * c.z * c.x);
        let inertia = DMat3::from_cols(
            DVec3::new(xx, xy, xz),
            DVec3::new(xy, yy, yz),
            DVec3::new(xz, yz, zz),
        );

        log::debug!("mass properties: volume {mass}, center of gravity {c}");
        Self {
            volume: mass as f32,
            center_of_gravity: c.as_vec3(),
            inertia_tensor: inertia.as_mat3(),
        }
    }
}

/// Total surface area, accumulated in `f64`.
pub(crate) fn surface_area(mesh: &MeshSnapshot) -> f64 {
    (0..mesh.triangle_count())
        .map(|t| {
            let [a, b, c] = mesh.corners(t).map(|p| p.as_dvec3());
            0.5 * (b - a).cross(c - a).length()
        })
        .sum()
}

fn surface_centroid(mesh: &MeshSnapshot) -> DVec3 {
    let mut weighted = DVec3::ZERO;
    let mut total = 0.0;
    for t in 0..mesh.triangle_count() {
        let [a, b, c] = mesh.corners(t).map(|p| p.as_dvec3());
        let area = 0.5 * (b - a).cross(c - a).length();
        weighted += (a + b + c) / 3.0 * area;
        total += area;
    }
    if total > 0.0 {
        weighted / total
    } else {
        DVec3::ZERO
    }
}

#[inline]
fn subexpressions(w0: f64, w1: f64, w2: f64) -> (f64, f64, f64, f64, f64, f64) {
    let temp0 = w0 + w1;
    let f1 = temp0 + w2;
    let temp1 = w0 * w0;
    let temp2 = temp1 + w1 * temp0;
    let f2 = temp2 + w2 * f1;
    let f3 = w0 * temp1 + w1 * temp2 + w2 * f2;
    let g0 = f2 + w0 * (f1 + w0);
    let g1 = f2 + w1 * (f1 + w1);
    let g2 = f2 + w2 * (f1 + w2);
    (f1, f2, f3, g0, g1, g2)
}
