// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Implicit KD-tree over axis-aligned boxes.
//!
//! Nodes live in one flat arena. The root is slot `0` and the children of slot `i`
//! are `2i + 1` (low side of the cut) and `2i + 2` (high side). Each leaf owns a
//! contiguous run of a permutation array of box handles, so the tree never stores
//! or copies the boxes themselves.
//!
//! Every split is a median split on box centers along the axis where the node's
//! bound is widest, which keeps sibling subtrees within one element of each other
//! and the arena close to dense.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use smallvec::SmallVec;

use crate::types::{Bounds, Scalar};

/// Leaf capacity used when none is specified.
pub const DEFAULT_MAX_LEAF_SIZE: usize = 4;

/// What a node of a [`KdTree`] is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A leaf covering `permutation[start..end]`.
    Leaf {
        /// First member in the permutation array.
        start: u32,
        /// One past the last member.
        end: u32,
    },
    /// An interior node cut along `axis`.
    Branch {
        /// Axis of the cut, `0..B::DIMENSIONS`.
        axis: u8,
    },
}

/// A node of a [`KdTree`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Node<B> {
    /// Union of the bounds of every box below this node.
    pub bound: B,
    /// Leaf or branch.
    pub kind: NodeKind,
}

impl<B: Bounds> Node<B> {
    fn vacant() -> Self {
        Self {
            bound: B::empty(),
            kind: NodeKind::Leaf { start: 0, end: 0 },
        }
    }
}

/// A static KD-tree of box handles.
///
/// The tree is built over a caller-owned slice of boxes and reports hits as indices
/// into that slice. Queries take the slice again; passing a slice other than the one
/// the tree was built over (or the one it was last [rebuilt][KdTree::rebuild] over)
/// gives meaningless results. [`BoxIndex`][crate::BoxIndex] ties the two together.
///
/// Besides the visitor queries, the tree exposes its structure ([`root`][Self::root],
/// [`low_child`][Self::low_child], [`members`][Self::members], ...) so callers can
/// write their own ordered searches, such as nearest-first branch and bound.
#[derive(Clone)]
pub struct KdTree<B> {
    nodes: Vec<Node<B>>,
    permutation: Vec<u32>,
    max_leaf_size: usize,
    node_count: usize,
}

impl<B: Bounds> Debug for KdTree<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KdTree")
            .field("len", &self.permutation.len())
            .field("node_count", &self.node_count)
            .field("arena", &self.nodes.len())
            .field("max_leaf_size", &self.max_leaf_size)
            .finish_non_exhaustive()
    }
}

impl<B: Bounds> KdTree<B> {
    /// Build a tree over `boxes` with at most `max_leaf_size` boxes per leaf.
    ///
    /// A `max_leaf_size` of zero is treated as one. Building over an empty slice gives
    /// a tree with a single empty leaf, which answers every query with no hits.
    pub fn build(boxes: &[B], max_leaf_size: usize) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            permutation: Vec::new(),
            max_leaf_size: max_leaf_size.max(1),
            node_count: 0,
        };
        tree.rebuild(boxes);
        tree
    }

    /// Rebuild the whole tree over `boxes`, reusing the existing allocations.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Box handles are u32; more than u32::MAX boxes is unsupported."
    )]
    pub fn rebuild(&mut self, boxes: &[B]) {
        debug_assert!(
            u32::try_from(boxes.len()).is_ok(),
            "KdTree supports at most u32::MAX boxes"
        );
        self.nodes.clear();
        self.permutation.clear();
        self.permutation.extend(0..boxes.len() as u32);
        self.node_count = 0;
        self.build_node(boxes, 0, 0, boxes.len());
    }

    /// Change the leaf capacity and rebuild over `boxes`; zero is treated as one.
    pub fn set_max_leaf_size(&mut self, boxes: &[B], max_leaf_size: usize) {
        self.max_leaf_size = max_leaf_size.max(1);
        self.rebuild(boxes);
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Permutation offsets fit in u32 because handle count does."
    )]
    fn build_node(&mut self, boxes: &[B], slot: usize, start: usize, end: usize) {
        let bound = self.permutation[start..end]
            .iter()
            .fold(B::empty(), |acc, &h| acc.union(&boxes[h as usize]));

        if end - start <= self.max_leaf_size {
            self.put(
                slot,
                Node {
                    bound,
                    kind: NodeKind::Leaf {
                        start: start as u32,
                        end: end as u32,
                    },
                },
            );
            return;
        }

        let axis = major_axis(&bound);
        let half = (end - start) / 2;
        self.permutation[start..end].select_nth_unstable_by(half, |&a, &b| {
            let ca = boxes[a as usize].center(axis);
            let cb = boxes[b as usize].center(axis);
            ca.partial_cmp(&cb).unwrap_or(Ordering::Equal)
        });

        self.put(
            slot,
            Node {
                bound,
                kind: NodeKind::Branch { axis: axis as u8 },
            },
        );
        let mid = start + half;
        self.build_node(boxes, 2 * slot + 1, start, mid);
        self.build_node(boxes, 2 * slot + 2, mid, end);
    }

    fn put(&mut self, slot: usize, node: Node<B>) {
        if self.nodes.len() <= slot {
            self.nodes.resize(slot + 1, Node::vacant());
        }
        self.nodes[slot] = node;
        self.node_count += 1;
    }

    /// Visit the handles of boxes accepted by `accept`.
    ///
    /// `accept` is asked about node bounds first; a rejected node prunes its whole
    /// subtree. At surviving leaves each member box is tested and reported if accepted.
    /// The predicate must be monotone: accepting a box must imply accepting every box
    /// that encloses it.
    pub fn visit<A, F>(&self, boxes: &[B], mut accept: A, mut f: F)
    where
        A: FnMut(&B) -> bool,
        F: FnMut(usize),
    {
        let mut stack: SmallVec<[usize; 32]> = SmallVec::new();
        stack.push(self.root());
        while let Some(i) = stack.pop() {
            let node = &self.nodes[i];
            if !accept(&node.bound) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, end } => {
                    for &h in &self.permutation[start as usize..end as usize] {
                        if accept(&boxes[h as usize]) {
                            f(h as usize);
                        }
                    }
                }
                NodeKind::Branch { .. } => {
                    stack.push(2 * i + 2);
                    stack.push(2 * i + 1);
                }
            }
        }
    }

    /// Visit the handles of boxes that overlap `query` (touching counts).
    pub fn visit_overlapping<F: FnMut(usize)>(&self, boxes: &[B], query: &B, f: F) {
        self.visit(boxes, |b| b.overlaps(query), f);
    }

    /// Visit the handles of boxes that contain `point` (boundary included).
    pub fn visit_containing<F: FnMut(usize)>(&self, boxes: &[B], point: B::Point, f: F) {
        self.visit(boxes, |b| b.contains(point), f);
    }

    /// The root slot. Always `0`, present even for an empty tree.
    #[inline]
    pub const fn root(&self) -> usize {
        0
    }

    /// The node in `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is outside the arena. Slots reached from [`root`][Self::root]
    /// through [`low_child`][Self::low_child] and [`high_child`][Self::high_child] are
    /// always valid.
    #[inline]
    pub fn node(&self, slot: usize) -> &Node<B> {
        &self.nodes[slot]
    }

    /// Bound of the node in `slot`. See [`node`][Self::node] for panics.
    #[inline]
    pub fn bound(&self, slot: usize) -> &B {
        &self.nodes[slot].bound
    }

    /// Whether the node in `slot` is a leaf.
    #[inline]
    pub fn is_leaf(&self, slot: usize) -> bool {
        matches!(self.nodes[slot].kind, NodeKind::Leaf { .. })
    }

    /// Low-side child of a branch, `None` for leaves.
    #[inline]
    pub fn low_child(&self, slot: usize) -> Option<usize> {
        (!self.is_leaf(slot)).then_some(2 * slot + 1)
    }

    /// High-side child of a branch, `None` for leaves.
    #[inline]
    pub fn high_child(&self, slot: usize) -> Option<usize> {
        (!self.is_leaf(slot)).then_some(2 * slot + 2)
    }

    /// Box handles owned by a leaf; empty for branches.
    #[inline]
    pub fn members(&self, slot: usize) -> &[u32] {
        match self.nodes[slot].kind {
            NodeKind::Leaf { start, end } => &self.permutation[start as usize..end as usize],
            NodeKind::Branch { .. } => &[],
        }
    }

    /// The permutation array; leaves own contiguous runs of it.
    #[inline]
    pub fn permutation(&self) -> &[u32] {
        &self.permutation
    }

    /// Number of live nodes (leaves and branches).
    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of boxes the tree was built over.
    #[inline]
    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    /// Whether the tree was built over no boxes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    /// Leaf capacity.
    #[inline]
    pub fn max_leaf_size(&self) -> usize {
        self.max_leaf_size
    }
}

/// Axis along which `bound` is widest; ties go to the lowest axis.
fn major_axis<B: Bounds>(bound: &B) -> usize {
    let mut axis = 0;
    let mut widest = bound.extent(0);
    for a in 1..B::DIMENSIONS {
        let e = bound.extent(a);
        if e > widest {
            widest = e;
            axis = a;
        }
    }
    debug_assert!(
        widest >= <B::Scalar as Scalar>::zero(),
        "major_axis called on an inverted bound"
    );
    axis
}
