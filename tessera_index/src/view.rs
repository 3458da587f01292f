// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`KdTree`] bundled with the boxes it was built over.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::tree::{DEFAULT_MAX_LEAF_SIZE, KdTree};
use crate::types::Bounds;

/// A KD-tree borrowing its boxes.
///
/// The borrow keeps the boxes alive and unchanged for as long as the index exists,
/// so hits always refer to the slice the tree describes.
#[derive(Clone)]
pub struct BoxIndex<'a, B> {
    boxes: &'a [B],
    tree: KdTree<B>,
}

impl<B: Bounds> Debug for BoxIndex<'_, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoxIndex")
            .field("boxes", &self.boxes.len())
            .field("tree", &self.tree)
            .finish()
    }
}

impl<'a, B: Bounds> BoxIndex<'a, B> {
    /// Index `boxes` with [`DEFAULT_MAX_LEAF_SIZE`].
    pub fn new(boxes: &'a [B]) -> Self {
        Self::with_max_leaf_size(boxes, DEFAULT_MAX_LEAF_SIZE)
    }

    /// Index `boxes` with a custom leaf capacity.
    pub fn with_max_leaf_size(boxes: &'a [B], max_leaf_size: usize) -> Self {
        Self {
            boxes,
            tree: KdTree::build(boxes, max_leaf_size),
        }
    }

    /// Point the index at a new slice and rebuild.
    pub fn rebuild(&mut self, boxes: &'a [B]) {
        self.boxes = boxes;
        self.tree.rebuild(boxes);
    }

    /// The indexed boxes.
    pub fn boxes(&self) -> &'a [B] {
        self.boxes
    }

    /// The underlying tree.
    pub fn tree(&self) -> &KdTree<B> {
        &self.tree
    }

    /// Visit handles of boxes overlapping `query`.
    pub fn visit_overlapping<F: FnMut(usize)>(&self, query: &B, f: F) {
        self.tree.visit_overlapping(self.boxes, query, f);
    }

    /// Visit handles of boxes containing `point`.
    pub fn visit_containing<F: FnMut(usize)>(&self, point: B::Point, f: F) {
        self.tree.visit_containing(self.boxes, point, f);
    }

    /// Handles of boxes overlapping `query`.
    pub fn query_overlapping(&self, query: &B) -> impl Iterator<Item = usize> + use<B> {
        let mut out = Vec::new();
        self.visit_overlapping(query, |h| out.push(h));
        out.into_iter()
    }

    /// Handles of boxes containing `point`.
    pub fn query_containing(&self, point: B::Point) -> impl Iterator<Item = usize> + use<B> {
        let mut out = Vec::new();
        self.visit_containing(point, |h| out.push(h));
        out.into_iter()
    }

    /// Number of indexed boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether the index holds no boxes.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
