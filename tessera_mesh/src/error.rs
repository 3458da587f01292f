// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for mesh construction and queries.

use thiserror::Error;

use crate::attribute::Interpolation;

/// Errors raised while building a [`MeshSnapshot`][crate::MeshSnapshot] or answering a query.
///
/// Expected misses (an empty mesh, a UV outside every triangle, a ray that hits nothing)
/// are reported as `None` by the query methods, not as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// The mesh has no `"P"` attribute.
    #[error("mesh has no \"P\" attribute")]
    MissingPositions,

    /// The position attribute is not per-vertex `Vec3` data.
    #[error("position attribute \"{name}\" must be per-vertex Vec3 data")]
    PositionsNotVec3 {
        /// Attribute name.
        name: String,
    },

    /// A face does not have exactly three vertices.
    #[error("face {face} has {vertex_count} vertices; only triangles are supported")]
    NonTriangularFace {
        /// Face index.
        face: usize,
        /// Number of vertices on the face.
        vertex_count: u32,
    },

    /// The face vertex counts and the vertex id list disagree.
    #[error("faces reference {expected} vertex ids but {got} were given")]
    VertexIdsMismatch {
        /// Sum of the per-face vertex counts.
        expected: usize,
        /// Length of the vertex id list.
        got: usize,
    },

    /// A vertex id points past the end of the positions.
    #[error("vertex id {id} out of range for {vertex_count} vertices")]
    VertexIdOutOfRange {
        /// Offending id.
        id: u32,
        /// Number of positions.
        vertex_count: usize,
    },

    /// An attribute has the wrong number of elements for its interpolation.
    #[error("attribute \"{name}\" ({interpolation}) has {got} elements, expected {expected}")]
    AttributeSizeMismatch {
        /// Attribute name.
        name: String,
        /// Declared interpolation.
        interpolation: Interpolation,
        /// Element count required by the mesh topology.
        expected: usize,
        /// Element count provided.
        got: usize,
    },

    /// An indexed attribute refers past the end of its values.
    #[error("attribute \"{name}\" index {index} out of range for {len} values")]
    AttributeIndexOutOfRange {
        /// Attribute name.
        name: String,
        /// Offending index.
        index: u32,
        /// Number of stored values.
        len: usize,
    },

    /// No attribute with this name.
    #[error("no attribute named \"{name}\"")]
    MissingAttribute {
        /// Attribute name.
        name: String,
    },

    /// The attribute holds a different value type than requested.
    #[error("attribute \"{name}\" holds {got} values, not {expected}")]
    AttributeTypeMismatch {
        /// Attribute name.
        name: String,
        /// Requested value type.
        expected: &'static str,
        /// Stored value type.
        got: &'static str,
    },

    /// The attribute's values cannot be blended (string data on vertices or corners).
    #[error("attribute \"{name}\" cannot be interpolated with {interpolation} interpolation")]
    NotInterpolable {
        /// Attribute name.
        name: String,
        /// Declared interpolation.
        interpolation: Interpolation,
    },

    /// A triangle index past the end of the mesh.
    #[error("triangle {triangle} out of range for {triangle_count} triangles")]
    TriangleOutOfRange {
        /// Offending index.
        triangle: usize,
        /// Number of triangles.
        triangle_count: usize,
    },

    /// A UV query on a mesh without usable UV data.
    #[error("mesh has no usable UV attribute \"{name}\" (Vec2 on vertices or corners)")]
    MissingUvs {
        /// Configured UV attribute name.
        name: String,
    },

    /// Signed distance needs every edge shared by exactly two triangles.
    #[error("edge {edge:?} is shared by {triangle_count} triangles; mesh is not a closed manifold")]
    NonManifold {
        /// The edge as an ordered vertex id pair.
        edge: (u32, u32),
        /// Number of triangles using the edge.
        triangle_count: usize,
    },
}

/// Result type alias for mesh operations.
pub type Result<T> = core::result::Result<T, MeshError>;
