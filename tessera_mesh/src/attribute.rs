// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named per-mesh data and how it varies over the surface.

use core::fmt;

use glam::{Vec2, Vec3};

/// How an attribute's elements map onto the mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// One value for the whole mesh.
    Constant,
    /// One value per triangle.
    Uniform,
    /// One value per vertex, blended across triangles.
    Vertex,
    /// One value per vertex, blended linearly. Sampled exactly like [`Vertex`][Self::Vertex].
    Varying,
    /// One value per triangle corner; allows discontinuities such as UV seams.
    FaceVarying,
}

impl Interpolation {
    /// Whether sampling blends three values with barycentric weights.
    #[inline]
    pub const fn is_blended(self) -> bool {
        matches!(self, Self::Vertex | Self::Varying | Self::FaceVarying)
    }

    /// Number of elements this interpolation needs on a mesh of the given size.
    #[inline]
    pub const fn element_count(self, vertex_count: usize, triangle_count: usize) -> usize {
        match self {
            Self::Constant => 1,
            Self::Uniform => triangle_count,
            Self::Vertex | Self::Varying => vertex_count,
            Self::FaceVarying => triangle_count * 3,
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Constant => "constant",
            Self::Uniform => "uniform",
            Self::Vertex => "vertex",
            Self::Varying => "varying",
            Self::FaceVarying => "face-varying",
        })
    }
}

/// Typed storage for attribute values.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeData {
    /// Scalars.
    Float(Vec<f32>),
    /// Integers.
    Int(Vec<i32>),
    /// 2D vectors, typically UVs.
    Vec2(Vec<Vec2>),
    /// 3D vectors, positions, normals or colors.
    Vec3(Vec<Vec3>),
    /// Strings; cannot be blended.
    String(Vec<String>),
}

impl AttributeData {
    /// Number of stored values.
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Vec2(v) => v.len(),
            Self::Vec3(v) => v.len(),
            Self::String(v) => v.len(),
        }
    }

    /// Whether no values are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the value type, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => f32::TYPE_NAME,
            Self::Int(_) => i32::TYPE_NAME,
            Self::Vec2(_) => Vec2::TYPE_NAME,
            Self::Vec3(_) => Vec3::TYPE_NAME,
            Self::String(_) => "String",
        }
    }
}

impl From<Vec<f32>> for AttributeData {
    fn from(v: Vec<f32>) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<i32>> for AttributeData {
    fn from(v: Vec<i32>) -> Self {
        Self::Int(v)
    }
}

impl From<Vec<Vec2>> for AttributeData {
    fn from(v: Vec<Vec2>) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec<Vec3>> for AttributeData {
    fn from(v: Vec<Vec3>) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec<String>> for AttributeData {
    fn from(v: Vec<String>) -> Self {
        Self::String(v)
    }
}

/// A named attribute's values, interpolation and optional index list.
///
/// With indices, element `i` of the interpolation domain reads `data[indices[i]]`, which
/// lets many elements share one value (a handful of UVs shared across corners, a palette
/// of per-face ids, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    /// How elements map onto the mesh.
    pub interpolation: Interpolation,
    /// Stored values.
    pub data: AttributeData,
    /// Optional element-to-value indirection.
    pub indices: Option<Vec<u32>>,
}

impl Attribute {
    /// A direct (non-indexed) attribute.
    pub fn new(interpolation: Interpolation, data: impl Into<AttributeData>) -> Self {
        Self {
            interpolation,
            data: data.into(),
            indices: None,
        }
    }

    /// An indexed attribute.
    pub fn indexed(interpolation: Interpolation, data: impl Into<AttributeData>, indices: Vec<u32>) -> Self {
        Self {
            interpolation,
            data: data.into(),
            indices: Some(indices),
        }
    }

    /// Number of domain elements described: the index count when indexed, else the value count.
    pub fn element_count(&self) -> usize {
        self.indices.as_ref().map_or_else(|| self.data.len(), Vec::len)
    }

    /// Position in [`data`][Self::data] of domain element `element`.
    #[inline]
    pub fn value_index(&self, element: usize) -> usize {
        match &self.indices {
            Some(indices) => indices[element] as usize,
            None => element,
        }
    }

    /// The stored values, if they are of type `T`.
    #[inline]
    pub fn values<T: AttributeValue>(&self) -> Option<&[T]> {
        T::values(&self.data)
    }
}

/// Value types that can be read out of an [`AttributeData`] and blended.
pub trait AttributeValue: Copy + fmt::Debug + Send + Sync + 'static {
    /// Short type name for error messages.
    const TYPE_NAME: &'static str;

    /// Borrow the matching variant's values.
    fn values(data: &AttributeData) -> Option<&[Self]>;

    /// Weighted sum of three values; weights sum to one.
    fn blend(values: [Self; 3], weights: [f32; 3]) -> Self;
}

impl AttributeValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn values(data: &AttributeData) -> Option<&[Self]> {
        match data {
            AttributeData::Float(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    fn blend(v: [Self; 3], w: [f32; 3]) -> Self {
        v[0] * w[0] + v[1] * w[1] + v[2] * w[2]
    }
}

impl AttributeValue for i32 {
    const TYPE_NAME: &'static str = "i32";

    fn values(data: &AttributeData) -> Option<&[Self]> {
        match data {
            AttributeData::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Blends in `f64` and rounds to the nearest integer.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "A convex blend of i32 values stays inside the i32 range."
    )]
    #[inline]
    fn blend(v: [Self; 3], w: [f32; 3]) -> Self {
        let sum = f64::from(v[0]) * f64::from(w[0])
            + f64::from(v[1]) * f64::from(w[1])
            + f64::from(v[2]) * f64::from(w[2]);
        sum.round() as Self
    }
}

impl AttributeValue for Vec2 {
    const TYPE_NAME: &'static str = "Vec2";

    fn values(data: &AttributeData) -> Option<&[Self]> {
        match data {
            AttributeData::Vec2(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    fn blend(v: [Self; 3], w: [f32; 3]) -> Self {
        v[0] * w[0] + v[1] * w[1] + v[2] * w[2]
    }
}

impl AttributeValue for Vec3 {
    const TYPE_NAME: &'static str = "Vec3";

    fn values(data: &AttributeData) -> Option<&[Self]> {
        match data {
            AttributeData::Vec3(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    fn blend(v: [Self; 3], w: [f32; 3]) -> Self {
        v[0] * w[0] + v[1] * w[1] + v[2] * w[2]
    }
}
