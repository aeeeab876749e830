// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding sphere volume.

use crate::types::{Aabb3D, Scalar, distance_squared, max_t};
use crate::volume::BoundingVolume;

/// A sphere given by its center and radius.
///
/// Spheres are rotation invariant, which makes them cheap to test against shapes whose
/// orientation changes between queries, at the price of looser fits on flat cells.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingSphere<T> {
    /// Center of the sphere.
    pub center: [T; 3],
    /// Radius of the sphere, never negative.
    pub radius: T,
}

impl<T> BoundingSphere<T> {
    /// Create a new sphere.
    pub const fn new(center: [T; 3], radius: T) -> Self {
        Self { center, radius }
    }
}

impl<T: Scalar> BoundingSphere<T> {
    fn center_distance(&self, other: &Self) -> T {
        T::sqrt(distance_squared(self.center, other.center))
    }
}

impl<T: Scalar> BoundingVolume<T> for BoundingSphere<T> {
    fn from_point(p: [T; 3]) -> Self {
        Self::new(p, T::zero())
    }

    fn merge(&self, other: &Self) -> Self {
        let d = self.center_distance(other);
        if d + other.radius <= self.radius {
            return *self;
        }
        if d + self.radius <= other.radius {
            return *other;
        }
        // Both radii are too small to contain the other sphere, so d > 0 here.
        let radius = T::mid(d + self.radius, other.radius);
        let t = (radius - self.radius) / d;
        let c = self.center;
        let o = other.center;
        Self::new(
            [
                c[0] + (o[0] - c[0]) * t,
                c[1] + (o[1] - c[1]) * t,
                c[2] + (o[2] - c[2]) * t,
            ],
            radius,
        )
    }

    fn contains(&self, p: [T; 3]) -> bool {
        distance_squared(self.center, p) <= self.radius * self.radius
    }

    fn overlaps(&self, other: &Self) -> bool {
        let r = self.radius + other.radius;
        distance_squared(self.center, other.center) <= r * r
    }

    fn distance_lower_bound(&self, other: &Self) -> T {
        T::max_zero(self.center_distance(other) - self.radius - other.radius)
    }

    fn inflated(&self, amount: T) -> Self {
        Self::new(self.center, T::max_zero(self.radius + amount))
    }

    fn aabb(&self) -> Aabb3D<T> {
        let [x, y, z] = self.center;
        let r = self.radius;
        Aabb3D::new(x - r, y - r, z - r, x + r, y + r, z + r)
    }

    /// Centered on the points' bounding box, with the radius reaching the farthest point.
    fn from_points(points: &[[T; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Aabb3D::from_point(*first);
        for p in rest {
            bounds.include_point(*p);
        }
        let center = bounds.center();
        let radius_sq = points.iter().fold(T::zero(), |acc, p| {
            max_t(acc, distance_squared(center, *p))
        });
        Some(Self::new(center, T::sqrt(radius_sq)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_containing_sphere() {
        let big = BoundingSphere::new([0.0, 0.0, 0.0], 10.0);
        let small = BoundingSphere::new([1.0, 1.0, 1.0], 1.0);
        assert_eq!(big.merge(&small), big);
        assert_eq!(small.merge(&big), big);
    }

    #[test]
    fn merge_encloses_both() {
        let a = BoundingSphere::new([-2.0, 0.0, 0.0], 1.0);
        let b = BoundingSphere::new([2.0, 0.0, 0.0], 1.0);
        let m = a.merge(&b);
        assert_eq!(m.center, [0.0, 0.0, 0.0]);
        assert_eq!(m.radius, 3.0);
        assert!(m.contains([-3.0, 0.0, 0.0]));
        assert!(m.contains([3.0, 0.0, 0.0]));
    }

    #[test]
    fn from_points_contains_all() {
        let pts = [
            [0.0_f64, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 2.0, 0.0],
            [0.0, 0.0, 3.0],
        ];
        let s = BoundingSphere::from_points(&pts).unwrap();
        assert!(pts.iter().all(|p| s.contains(*p)));
        assert!(BoundingSphere::<f64>::from_points(&[]).is_none());
    }

    #[test]
    fn overlap_and_distance() {
        let a = BoundingSphere::new([0.0, 0.0, 0.0], 1.0);
        let b = BoundingSphere::new([3.0, 0.0, 0.0], 1.0);
        assert!(!a.overlaps(&b));
        assert_eq!(a.distance_lower_bound(&b), 1.0);
        assert!(a.inflated(1.0).overlaps(&b));
        assert_eq!(a.aabb(), Aabb3D::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0));
    }
}
