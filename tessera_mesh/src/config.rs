// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evaluator configuration.

use tessera_index::DEFAULT_MAX_LEAF_SIZE;

/// Tuning knobs for a [`MeshEvaluator`][crate::MeshEvaluator].
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorConfig {
    /// Maximum triangles per KD-tree leaf (both the 3D and the UV tree).
    pub max_leaf_size: usize,
    /// Name of the `Vec2` attribute used for UV queries.
    pub uv_name: String,
    /// Barycentric weight at or below which a closest point is treated as lying on an edge
    /// or vertex when choosing the normal for the sign of a signed distance.
    pub feature_epsilon: f32,
    /// How far outside a triangle, in barycentric units, a UV may fall and still count
    /// as inside it.
    ///
    /// Every weight of the UV may be as low as `-uv_epsilon`, so the margin in UV units
    /// grows with the size of the triangle in UV space.
    pub uv_epsilon: f32,
}

impl EvaluatorConfig {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set [`max_leaf_size`][Self::max_leaf_size]; zero is treated as one.
    pub fn with_max_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.max_leaf_size = max_leaf_size.max(1);
        self
    }

    /// Set [`uv_name`][Self::uv_name].
    pub fn with_uv_name(mut self, uv_name: impl Into<String>) -> Self {
        self.uv_name = uv_name.into();
        self
    }

    /// Set [`feature_epsilon`][Self::feature_epsilon].
    pub fn with_feature_epsilon(mut self, feature_epsilon: f32) -> Self {
        self.feature_epsilon = feature_epsilon;
        self
    }

    /// Set [`uv_epsilon`][Self::uv_epsilon].
    pub fn with_uv_epsilon(mut self, uv_epsilon: f32) -> Self {
        self.uv_epsilon = uv_epsilon;
        self
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_leaf_size: DEFAULT_MAX_LEAF_SIZE,
            uv_name: "uv".to_owned(),
            feature_epsilon: 1e-4,
            uv_epsilon: 1e-6,
        }
    }
}
