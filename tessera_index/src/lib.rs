// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessera Index: a generic KD-tree over axis-aligned bounding boxes.
//!
//! Tessera Index is the spatial building block underneath mesh queries, but it
//! knows nothing about meshes.
//!
//! - Build a [`KdTree`] over a slice of [`Aabb2D`] or [`Aabb3D`] boxes.
//! - Query by point or overlapping box with callback visitors.
//! - Walk the tree yourself through [`KdTree::root`], [`KdTree::low_child`],
//!   [`KdTree::high_child`] and [`KdTree::members`] for ordered searches
//!   (nearest first, first ray hit, ...).
//!
//! The tree stores `u32` handles into the caller's box slice rather than the boxes
//! themselves. [`BoxIndex`] couples a tree with a borrowed slice when that is more
//! convenient. Rebuilding is always wholesale; there are no incremental updates.
//!
//! It is generic over the scalar type `T` through [`Scalar`], with widened
//! accumulators (f32→f64, f64→f64, i64→i128) for box volumes.
//!
//! # Example
//!
//! ```rust
//! use tessera_index::{Aabb3D, BoxIndex, KdTree, DEFAULT_MAX_LEAF_SIZE};
//!
//! let boxes = vec![
//!     Aabb3D::new([0.0_f32, 0.0, 0.0], [1.0, 1.0, 1.0]),
//!     Aabb3D::new([2.0, 0.0, 0.0], [3.0, 1.0, 1.0]),
//!     Aabb3D::new([0.5, 0.5, 0.5], [2.5, 0.75, 0.75]),
//! ];
//!
//! let tree = KdTree::build(&boxes, DEFAULT_MAX_LEAF_SIZE);
//! let mut hits = Vec::new();
//! tree.visit_containing(&boxes, [2.25, 0.6, 0.6], |h| hits.push(h));
//! hits.sort_unstable();
//! assert_eq!(hits, [1, 2]);
//!
//! // Or let the index hold on to the boxes.
//! let index = BoxIndex::new(&boxes);
//! let query = Aabb3D::new([-1.0, -1.0, -1.0], [0.25, 0.25, 0.25]);
//! assert_eq!(index.query_overlapping(&query).collect::<Vec<_>>(), [0]);
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Debug builds may assert.

#![no_std]

extern crate alloc;

mod tree;
mod types;
mod view;

pub use tree::{DEFAULT_MAX_LEAF_SIZE, KdTree, Node, NodeKind};
pub use types::{Aabb2D, Aabb3D, Bounds, Scalar};
pub use view::BoxIndex;
