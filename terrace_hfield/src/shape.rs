// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Convex shapes that can be tested against a height field.

use parry3d_f64::bounding_volume::Aabb;
use parry3d_f64::math::{Isometry, Point, Real, Vector};
use parry3d_f64::shape::{Ball, ConvexPolyhedron, Cuboid, Shape as ParryShape, SupportMap};

use crate::error::ShapeError;

/// A convex query shape.
#[derive(Clone, Debug)]
pub enum Shape {
    /// Sphere centered on its local origin.
    Sphere(Ball),
    /// Box centered on its local origin.
    Cuboid(Cuboid),
    /// Convex hull of a point set.
    Convex(ConvexPolyhedron),
}

impl Shape {
    /// A sphere of the given radius.
    pub fn sphere(radius: Real) -> Result<Self, ShapeError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ShapeError::InvalidRadius(radius));
        }
        Ok(Self::Sphere(Ball::new(radius)))
    }

    /// A box with the given half extents.
    pub fn cuboid(half_extents: Vector<Real>) -> Result<Self, ShapeError> {
        if !half_extents.iter().all(|h| h.is_finite() && *h > 0.0) {
            return Err(ShapeError::InvalidHalfExtents);
        }
        Ok(Self::Cuboid(Cuboid::new(half_extents)))
    }

    /// A box with the given side lengths.
    pub fn box_from_sides(x: Real, y: Real, z: Real) -> Result<Self, ShapeError> {
        Self::cuboid(Vector::new(x, y, z) / 2.0)
    }

    /// The convex hull of `points`.
    pub fn convex_hull(points: &[Point<Real>]) -> Result<Self, ShapeError> {
        let degenerate = ShapeError::DegenerateHull {
            points: points.len(),
        };
        if points.len() < 4 || points.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(degenerate);
        }
        ConvexPolyhedron::from_convex_hull(points)
            .map(Self::Convex)
            .ok_or(degenerate)
    }

    /// The shape as a parry shape for the narrow phase.
    pub fn as_parry(&self) -> &dyn ParryShape {
        match self {
            Self::Sphere(s) => s,
            Self::Cuboid(c) => c,
            Self::Convex(c) => c,
        }
    }

    /// World-space bounding box at `pose`.
    pub fn compute_aabb(&self, pose: &Isometry<Real>) -> Aabb {
        self.as_parry().compute_aabb(pose)
    }

    /// The point of the shape at `pose` furthest along `dir`.
    pub fn support_point(&self, pose: &Isometry<Real>, dir: &Vector<Real>) -> Point<Real> {
        match self {
            Self::Sphere(s) => s.support_point(pose, dir),
            Self::Cuboid(c) => c.support_point(pose, dir),
            Self::Convex(c) => c.support_point(pose, dir),
        }
    }
}

impl From<Ball> for Shape {
    fn from(ball: Ball) -> Self {
        Self::Sphere(ball)
    }
}

impl From<Cuboid> for Shape {
    fn from(cuboid: Cuboid) -> Self {
        Self::Cuboid(cuboid)
    }
}
