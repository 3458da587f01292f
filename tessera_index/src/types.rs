// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in 2D.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Minimum x
    pub min_x: T,
    /// Minimum y
    pub min_y: T,
    /// Maximum x
    pub max_x: T,
    /// Maximum y
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    #[inline(always)]
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether this AABB contains the point.
    #[inline]
    pub fn contains_point(&self, x: T, y: T) -> bool {
        self.min_x <= x && self.min_y <= y && x <= self.max_x && y <= self.max_y
    }

    /// Determines whether this AABB overlaps with another in any way.
    ///
    /// Note that the edge of the AABB is considered to be part of itself, meaning
    /// that two AABBs that share an edge are considered to overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_index::Aabb2D;
    ///
    /// let aabb1 = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
    /// let aabb2 = Aabb2D::new(10.0, 0.0, 20.0, 10.0);
    /// assert!(aabb1.overlaps(&aabb2));
    ///
    /// let aabb3 = Aabb2D::new(11.0, 0.0, 20.0, 10.0);
    /// assert!(!aabb1.overlaps(&aabb3));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// The smallest AABB enclosing two AABBs.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: min_t(self.min_x, other.min_x),
            min_y: min_t(self.min_y, other.min_y),
            max_x: max_t(self.max_x, other.max_x),
            max_y: max_t(self.max_y, other.max_y),
        }
    }

    /// Return true if the AABB is flat or inverted on some axis. Assumes no NaN.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }

    /// Return true if `min <= max` on every axis (degenerate boxes are valid).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// An inverted AABB that acts as the identity for [`union`][Self::union].
    #[inline]
    pub fn inverted() -> Self {
        Self::new(T::highest(), T::highest(), T::lowest(), T::lowest())
    }
}

/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb3D<T> {
    /// Minimum x
    pub min_x: T,
    /// Minimum y
    pub min_y: T,
    /// Minimum z
    pub min_z: T,
    /// Maximum x
    pub max_x: T,
    /// Maximum y
    pub max_y: T,
    /// Maximum z
    pub max_z: T,
}

impl<T: Copy> Aabb3D<T> {
    /// Create a new AABB from min/max corners.
    #[inline(always)]
    pub const fn new(min: [T; 3], max: [T; 3]) -> Self {
        Self {
            min_x: min[0],
            min_y: min[1],
            min_z: min[2],
            max_x: max[0],
            max_y: max[1],
            max_z: max[2],
        }
    }

    /// The minimum corner.
    #[inline]
    pub const fn min(&self) -> [T; 3] {
        [self.min_x, self.min_y, self.min_z]
    }

    /// The maximum corner.
    #[inline]
    pub const fn max(&self) -> [T; 3] {
        [self.max_x, self.max_y, self.max_z]
    }
}

impl<T: Copy + PartialOrd> Aabb3D<T> {
    /// Whether this AABB contains the point (boundary included).
    #[inline]
    pub fn contains_point(&self, p: [T; 3]) -> bool {
        self.min_x <= p[0]
            && self.min_y <= p[1]
            && self.min_z <= p[2]
            && p[0] <= self.max_x
            && p[1] <= self.max_y
            && p[2] <= self.max_z
    }

    /// Determines whether this AABB overlaps with another; shared faces count as overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
            && self.min_z <= other.max_z
            && self.max_z >= other.min_z
    }

    /// The smallest AABB enclosing two AABBs.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: min_t(self.min_x, other.min_x),
            min_y: min_t(self.min_y, other.min_y),
            min_z: min_t(self.min_z, other.min_z),
            max_x: max_t(self.max_x, other.max_x),
            max_y: max_t(self.max_y, other.max_y),
            max_z: max_t(self.max_z, other.max_z),
        }
    }

    /// Grow this AABB so that it contains the point.
    #[inline]
    pub fn extend_point(&mut self, p: [T; 3]) {
        self.min_x = min_t(self.min_x, p[0]);
        self.min_y = min_t(self.min_y, p[1]);
        self.min_z = min_t(self.min_z, p[2]);
        self.max_x = max_t(self.max_x, p[0]);
        self.max_y = max_t(self.max_y, p[1]);
        self.max_z = max_t(self.max_z, p[2]);
    }

    /// Return true if the AABB is empty or inverted (no volume). Assumes no NaN.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y || self.max_z <= self.min_z
    }

    /// Return true if `min <= max` on every axis (flat boxes are valid).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y && self.min_z <= self.max_z
    }
}

impl<T: Scalar> Aabb3D<T> {
    /// An inverted AABB that acts as the identity for [`union`][Self::union].
    #[inline]
    pub fn inverted() -> Self {
        Self::new([T::highest(); 3], [T::lowest(); 3])
    }

    /// The tightest AABB around a set of points; inverted if `points` is empty.
    pub fn from_points(points: &[[T; 3]]) -> Self {
        let mut out = Self::inverted();
        for &p in points {
            out.extend_point(p);
        }
        out
    }

    /// Compute the volume of an AABB using the scalar's widened accumulator type.
    #[inline]
    pub fn volume(&self) -> T::Acc {
        let w = T::max(T::sub(self.max_x, self.min_x), T::zero());
        let h = T::max(T::sub(self.max_y, self.min_y), T::zero());
        let d = T::max(T::sub(self.max_z, self.min_z), T::zero());
        T::widen(w) * T::widen(h) * T::widen(d)
    }
}

/// Dimension-agnostic view of an axis-aligned box, as consumed by [`KdTree`][crate::KdTree].
///
/// Implemented for [`Aabb2D`] and [`Aabb3D`] over every [`Scalar`]. The tree only needs
/// unions, overlap/containment tests for pruning, and per-axis extent and center for
/// choosing and partitioning along a cut axis.
pub trait Bounds: Copy + Debug {
    /// Coordinate type.
    type Scalar: Scalar;

    /// Point type accepted by [`contains`][Bounds::contains].
    type Point: Copy + Debug;

    /// Number of axes.
    const DIMENSIONS: usize;

    /// The identity for [`union`][Bounds::union]; overlaps and contains nothing.
    fn empty() -> Self;

    /// The smallest box enclosing both boxes.
    fn union(&self, other: &Self) -> Self;

    /// Whether the boxes overlap (touching counts).
    fn overlaps(&self, other: &Self) -> bool;

    /// Whether the box contains the point (boundary included).
    fn contains(&self, point: Self::Point) -> bool;

    /// `max - min` along `axis`.
    fn extent(&self, axis: usize) -> Self::Scalar;

    /// Midpoint along `axis`.
    fn center(&self, axis: usize) -> Self::Scalar;
}

impl<T: Scalar> Bounds for Aabb2D<T> {
    type Scalar = T;
    type Point = [T; 2];
    const DIMENSIONS: usize = 2;

    #[inline]
    fn empty() -> Self {
        Self::inverted()
    }

    #[inline]
    fn union(&self, other: &Self) -> Self {
        Self::union(self, other)
    }

    #[inline]
    fn overlaps(&self, other: &Self) -> bool {
        Self::overlaps(self, other)
    }

    #[inline]
    fn contains(&self, point: [T; 2]) -> bool {
        self.contains_point(point[0], point[1])
    }

    #[inline]
    fn extent(&self, axis: usize) -> T {
        match axis {
            0 => T::sub(self.max_x, self.min_x),
            _ => T::sub(self.max_y, self.min_y),
        }
    }

    #[inline]
    fn center(&self, axis: usize) -> T {
        match axis {
            0 => T::mid(self.min_x, self.max_x),
            _ => T::mid(self.min_y, self.max_y),
        }
    }
}

impl<T: Scalar> Bounds for Aabb3D<T> {
    type Scalar = T;
    type Point = [T; 3];
    const DIMENSIONS: usize = 3;

    #[inline]
    fn empty() -> Self {
        Self::inverted()
    }

    #[inline]
    fn union(&self, other: &Self) -> Self {
        Self::union(self, other)
    }

    #[inline]
    fn overlaps(&self, other: &Self) -> bool {
        Self::overlaps(self, other)
    }

    #[inline]
    fn contains(&self, point: [T; 3]) -> bool {
        self.contains_point(point)
    }

    #[inline]
    fn extent(&self, axis: usize) -> T {
        match axis {
            0 => T::sub(self.max_x, self.min_x),
            1 => T::sub(self.max_y, self.min_y),
            _ => T::sub(self.max_z, self.min_z),
        }
    }

    #[inline]
    fn center(&self, axis: usize) -> T {
        match axis {
            0 => T::mid(self.min_x, self.max_x),
            1 => T::mid(self.min_y, self.max_y),
            _ => T::mid(self.min_z, self.max_z),
        }
    }
}

/// Numeric scalar abstraction for AABBs used by the tree.
///
/// This trait provides the minimal set of operations required for extents and
/// centroid ordering, and an associated widened accumulator type for box volumes
/// (e.g., f32→f64, i64→i128).
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Widened accumulator type for volumes.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Sub<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Smallest representable value (minus infinity for floats).
    fn lowest() -> Self;

    /// Largest representable value (infinity for floats).
    fn highest() -> Self;

    /// Max of the two scalar values.
    fn max(a: Self, b: Self) -> Self;

    /// Min of the two scalar values.
    fn min(a: Self, b: Self) -> Self;

    /// Midpoint between a and b (used for centroid ordering).
    fn mid(a: Self, b: Self) -> Self;

    /// Convert a scalar to the accumulator type.
    fn widen(v: Self) -> Self::Acc;
}

impl Scalar for f32 {
    type Acc = f64;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline(always)]
    fn lowest() -> Self {
        Self::NEG_INFINITY
    }

    #[inline(always)]
    fn highest() -> Self {
        Self::INFINITY
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        Self::min(a, b)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as f64
    }
}

impl Scalar for f64 {
    type Acc = Self;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline(always)]
    fn lowest() -> Self {
        Self::NEG_INFINITY
    }

    #[inline(always)]
    fn highest() -> Self {
        Self::INFINITY
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        Self::min(a, b)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline(always)]
    fn widen(v: Self) -> Self::Acc {
        v
    }
}

impl Scalar for i64 {
    type Acc = i128;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline(always)]
    fn zero() -> Self {
        0
    }

    #[inline(always)]
    fn lowest() -> Self {
        Self::MIN
    }

    #[inline(always)]
    fn highest() -> Self {
        Self::MAX
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        core::cmp::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        core::cmp::min(a, b)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        // Average without overflow: (a & b) + ((a ^ b) >> 1)
        (a & b) + ((a ^ b) >> 1)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as i128
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}
