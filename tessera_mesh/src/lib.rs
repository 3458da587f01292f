// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessera Mesh: spatial queries against a triangle mesh.
//!
//! A [`MeshDescription`] carries face topology and named attributes ("primitive
//! variables"), one of which must be the `"P"` positions. [`MeshSnapshot`] validates it
//! into an immutable triangle mesh, and [`MeshEvaluator`] indexes that mesh with a
//! [`KdTree`][tessera_index::KdTree] to answer:
//!
//! - closest point to a point in space;
//! - first hit and all hits along a ray;
//! - the point at a UV coordinate;
//! - the point at given barycentric weights on a triangle;
//! - signed distance, using angle-weighted pseudo-normals (closed manifold meshes only);
//! - volume, center of gravity, inertia and surface area, computed once and cached.
//!
//! Every query returns a [`QueryResult`] from which further attributes can be sampled
//! with the mesh's interpolation rules (see [`Interpolation`]).
//!
//! # Example
//!
//! ```rust
//! use tessera_mesh::glam::{Vec2, Vec3};
//! use tessera_mesh::{Attribute, Interpolation, MeshDescription, MeshEvaluator};
//!
//! // A unit square in the z = 0 plane, split along its diagonal.
//! let desc = MeshDescription::from_triangles(
//!     vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
//!     &[[0, 1, 2], [0, 2, 3]],
//! )
//! .with_attribute(
//!     "uv",
//!     Attribute::new(
//!         Interpolation::Vertex,
//!         vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y],
//!     ),
//! )
//! .with_attribute(
//!     "temperature",
//!     Attribute::new(Interpolation::Vertex, vec![0.0_f32, 10.0, 20.0, 10.0]),
//! );
//!
//! let evaluator = MeshEvaluator::new(&desc)?;
//!
//! let at = evaluator.point_at_uv(Vec2::new(0.75, 0.25))?.unwrap();
//! assert!((at.point - Vec3::new(0.75, 0.25, 0.0)).length() < 1e-5);
//!
//! let temperature: f32 = evaluator.sample(&at, "temperature")?;
//! assert!((temperature - 10.0).abs() < 1e-4);
//!
//! assert!((evaluator.surface_area() - 1.0).abs() < 1e-6);
//! # Ok::<(), tessera_mesh::MeshError>(())
//! ```
//!
//! ## Features
//!
//! - `rayon`: [`MeshEvaluator::closest_points`] and [`MeshEvaluator::signed_distances`]
//!   for batches of query points.
//!
//! ### Float semantics
//!
//! Positions and attribute values are assumed free of NaNs.

mod adjacency;
pub mod attribute;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod mass;
pub mod result;
pub mod snapshot;
pub mod triangle;

pub use attribute::{Attribute, AttributeData, AttributeValue, Interpolation};
pub use config::EvaluatorConfig;
pub use error::{MeshError, Result};
pub use evaluator::MeshEvaluator;
pub use mass::MassProperties;
pub use result::{QueryResult, RayHit, Tangents};
pub use snapshot::{MeshDescription, MeshSnapshot, POSITION};

pub use glam;
pub use tessera_index::{Aabb2D, Aabb3D};
