// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Terrace Height Field: a terrain collision shape accelerated by a bounding volume
//! hierarchy.
//!
//! - A [`HeightField`] is a grid of altitude samples over a rectangular footprint,
//!   closed below by a floor altitude.
//! - Each grid cell is split along its south-west/north-east diagonal into two convex
//!   [`Bin`]s, tested exactly against the query shape with parry's narrow phase.
//! - A hierarchy of bounding volumes over the cells (boxes or spheres, see
//!   [`terrace_bounds`]) prunes cells that cannot be reached under the request's
//!   security margin.
//!
//! Heights can be replaced wholesale or one sample at a time; the hierarchy is refit in
//! place so queries always see current volumes. The stored local AABB is recomputed on
//! demand with [`HeightField::compute_local_aabb`].
//!
//! # Example
//!
//! ```rust
//! use terrace_hfield::na::{DMatrix, Isometry3};
//! use terrace_hfield::{AabbHeightField, CollisionRequest, CollisionResult, Shape};
//!
//! // A 2×1 plateau at altitude 1 over a floor at 0.
//! let heights = DMatrix::from_element(11, 21, 1.0);
//! let hfield = AabbHeightField::new(2.0, 1.0, heights, 0.0).unwrap();
//!
//! // A ball sunk 0.05 into the surface, collecting one contact per cell at most.
//! let ball = Shape::sphere(0.5).unwrap();
//! let pose = Isometry3::translation(0.0, 0.0, 1.45);
//! let request = CollisionRequest::all_contacts(&hfield);
//! let mut result = CollisionResult::new();
//! hfield.collide(&Isometry3::identity(), &ball, &pose, &request, &mut result);
//! assert!(result.is_collision());
//! let deepest = result
//!     .contacts
//!     .iter()
//!     .map(|c| c.penetration_depth)
//!     .fold(f64::NEG_INFINITY, f64::max);
//! assert!((deepest - 0.05).abs() < 1e-6);
//!
//! // A negative margin demands deeper interpenetration.
//! let strict = CollisionRequest::default().with_security_margin(-0.1);
//! let mut result = CollisionResult::new();
//! hfield.collide(&Isometry3::identity(), &ball, &pose, &strict, &mut result);
//! assert!(!result.is_collision());
//! ```
//!
//! ## Security margin
//!
//! A pair at signed distance `d` collides when `d - security_margin <= distance_tolerance`.
//! Touching objects therefore collide at a zero margin. Reported penetration depths are
//! `-d`, independent of the margin; the distance lower bound is `d - security_margin`.

pub mod cell;
pub mod error;
pub mod grid;
pub mod heightfield;
pub mod narrow;
pub mod request;
pub mod shape;
pub mod traversal;

pub use parry3d_f64::na;

pub use cell::{Bin, BinGeometry, BinSide, Cell, CellBoundary, Face, FaceKind};
pub use error::{HeightFieldError, HeightFieldResult, ShapeError};
pub use grid::{HEIGHT_TOLERANCE, HeightFieldGrid};
pub use heightfield::{AabbHeightField, HeightField, SphereHeightField};
pub use narrow::collide_shapes;
pub use request::{
    CollisionRequest, CollisionResult, Contact, DEFAULT_DISTANCE_TOLERANCE, QueryStats,
    RequestFlags,
};
pub use shape::Shape;
pub use traversal::collide_shape_heightfield;
