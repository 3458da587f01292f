// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable triangle meshes and attribute sampling.

use std::collections::BTreeMap;

use glam::Vec3;
use tessera_index::Aabb3D;

use crate::attribute::{Attribute, AttributeData, AttributeValue, Interpolation};
use crate::error::{MeshError, Result};

/// Name of the position attribute.
pub const POSITION: &str = "P";

/// A polygon mesh as handed over by the caller.
///
/// This is the unvalidated input to [`MeshSnapshot::new`]. Faces are described by their
/// vertex counts and a flat list of vertex ids; only triangles are accepted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshDescription {
    /// Vertex count of each face.
    pub vertices_per_face: Vec<u32>,
    /// Vertex ids of every face, concatenated.
    pub vertex_ids: Vec<u32>,
    /// Named attributes, including [`POSITION`].
    pub attributes: BTreeMap<String, Attribute>,
}

impl MeshDescription {
    /// A triangle mesh with per-vertex positions.
    pub fn from_triangles(positions: Vec<Vec3>, triangles: &[[u32; 3]]) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            POSITION.to_owned(),
            Attribute::new(Interpolation::Vertex, positions),
        );
        Self {
            vertices_per_face: vec![3; triangles.len()],
            vertex_ids: triangles.iter().flatten().copied().collect(),
            attributes,
        }
    }

    /// Add or replace an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }
}

/// A validated, immutable triangle mesh.
///
/// All attribute sizes and index lists have been checked against the topology, so
/// sampling never goes out of bounds.
#[derive(Clone, Debug)]
pub struct MeshSnapshot {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    attributes: BTreeMap<String, Attribute>,
    bound: Aabb3D<f32>,
}

impl MeshSnapshot {
    /// Validate `desc` and take a private copy of it.
    pub fn new(desc: &MeshDescription) -> Result<Self> {
        let p = desc
            .attributes
            .get(POSITION)
            .ok_or(MeshError::MissingPositions)?;
        let point_values = match (&p.data, p.interpolation) {
            (AttributeData::Vec3(v), Interpolation::Vertex | Interpolation::Varying) => v,
            _ => {
                return Err(MeshError::PositionsNotVec3 {
                    name: POSITION.to_owned(),
                });
            }
        };

        for (face, &vertex_count) in desc.vertices_per_face.iter().enumerate() {
            if vertex_count != 3 {
                return Err(MeshError::NonTriangularFace { face, vertex_count });
            }
        }
        let expected = desc.vertices_per_face.len() * 3;
        if desc.vertex_ids.len() != expected {
            return Err(MeshError::VertexIdsMismatch {
                expected,
                got: desc.vertex_ids.len(),
            });
        }

        let vertex_count = p.element_count();
        let triangle_count = desc.vertices_per_face.len();
        for (name, attribute) in &desc.attributes {
            validate_attribute(name, attribute, vertex_count, triangle_count)?;
        }

        if let Some(&id) = desc.vertex_ids.iter().find(|&&id| id as usize >= vertex_count) {
            return Err(MeshError::VertexIdOutOfRange { id, vertex_count });
        }

        let positions: Vec<Vec3> = (0..vertex_count)
            .map(|i| point_values[p.value_index(i)])
            .collect();
        let triangles: Vec<[u32; 3]> = desc
            .vertex_ids
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        let mut bound = Aabb3D::inverted();
        for v in &positions {
            bound.extend_point(v.to_array());
        }

        log::debug!(
            "mesh snapshot: {} vertices, {} triangles, {} attributes",
            positions.len(),
            triangles.len(),
            desc.attributes.len()
        );

        Ok(Self {
            positions,
            triangles,
            attributes: desc.attributes.clone(),
            bound,
        })
    }

    /// Vertex positions, resolved through the position indices if any.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex id triples, one per triangle.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Vertex ids of triangle `index`.
    pub fn triangle(&self, index: usize) -> Result<[u32; 3]> {
        self.triangles
            .get(index)
            .copied()
            .ok_or(MeshError::TriangleOutOfRange {
                triangle: index,
                triangle_count: self.triangles.len(),
            })
    }

    /// Corner positions of triangle `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn corners(&self, index: usize) -> [Vec3; 3] {
        self.triangles[index].map(|v| self.positions[v as usize])
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Look up an attribute.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Attribute names in sorted order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Bound of all positions. Inverted (see [`Aabb3D::inverted`]) when there are none.
    #[inline]
    pub fn bound(&self) -> Aabb3D<f32> {
        self.bound
    }

    /// Sample attribute `name` at barycentric `bary` on `triangle`.
    pub fn sample<T: AttributeValue>(&self, name: &str, triangle: usize, bary: [f32; 3]) -> Result<T> {
        let attribute = self.attribute(name).ok_or_else(|| MeshError::MissingAttribute {
            name: name.to_owned(),
        })?;
        self.triangle(triangle)?;
        self.sample_attribute(attribute, triangle, bary)
            .ok_or_else(|| MeshError::AttributeTypeMismatch {
                name: name.to_owned(),
                expected: T::TYPE_NAME,
                got: attribute.data.type_name(),
            })
    }

    /// Sample a validated attribute at barycentric `bary` on `triangle`.
    ///
    /// This is the one place interpolation is defined:
    ///
    /// - [`Constant`][Interpolation::Constant]: the single value.
    /// - [`Uniform`][Interpolation::Uniform]: the triangle's value.
    /// - [`Vertex`][Interpolation::Vertex] / [`Varying`][Interpolation::Varying]: the
    ///   triangle's three vertex values blended by `bary`.
    /// - [`FaceVarying`][Interpolation::FaceVarying]: the triangle's three corner values
    ///   (elements `3 * triangle + corner`) blended by `bary`.
    ///
    /// Returns `None` if the attribute does not hold `T` values or `triangle` is out of
    /// range. `attribute` must have been validated against this mesh, as every attribute
    /// reached through [`attribute`][Self::attribute] has.
    pub fn sample_attribute<T: AttributeValue>(
        &self,
        attribute: &Attribute,
        triangle: usize,
        bary: [f32; 3],
    ) -> Option<T> {
        let values = attribute.values::<T>()?;
        let ids = *self.triangles.get(triangle)?;
        let at = |element: usize| values[attribute.value_index(element)];
        Some(match attribute.interpolation {
            Interpolation::Constant => at(0),
            Interpolation::Uniform => at(triangle),
            Interpolation::Vertex | Interpolation::Varying => T::blend(
                [at(ids[0] as usize), at(ids[1] as usize), at(ids[2] as usize)],
                bary,
            ),
            Interpolation::FaceVarying => {
                let base = triangle * 3;
                T::blend([at(base), at(base + 1), at(base + 2)], bary)
            }
        })
    }

    /// Read string attribute `name` for `triangle`.
    ///
    /// Strings cannot be blended, so only constant and uniform string attributes can be read.
    pub fn sample_str(&self, name: &str, triangle: usize) -> Result<&str> {
        let attribute = self.attribute(name).ok_or_else(|| MeshError::MissingAttribute {
            name: name.to_owned(),
        })?;
        self.triangle(triangle)?;
        let AttributeData::String(values) = &attribute.data else {
            return Err(MeshError::AttributeTypeMismatch {
                name: name.to_owned(),
                expected: "String",
                got: attribute.data.type_name(),
            });
        };
        let element = match attribute.interpolation {
            Interpolation::Constant => 0,
            Interpolation::Uniform => triangle,
            interpolation => {
                return Err(MeshError::NotInterpolable {
                    name: name.to_owned(),
                    interpolation,
                });
            }
        };
        Ok(&values[attribute.value_index(element)])
    }
}

fn validate_attribute(
    name: &str,
    attribute: &Attribute,
    vertex_count: usize,
    triangle_count: usize,
) -> Result<()> {
    let len = attribute.data.len();
    if let Some(indices) = &attribute.indices {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= len) {
            return Err(MeshError::AttributeIndexOutOfRange {
                name: name.to_owned(),
                index,
                len,
            });
        }
    }
    let expected = attribute
        .interpolation
        .element_count(vertex_count, triangle_count);
    let got = attribute.element_count();
    if got != expected {
        return Err(MeshError::AttributeSizeMismatch {
            name: name.to_owned(),
            interpolation: attribute.interpolation,
            expected,
            got,
        });
    }
    Ok(())
}
