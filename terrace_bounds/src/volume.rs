// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding volume abstraction used by [`Hierarchy`](crate::Hierarchy).

use core::fmt::Debug;

use crate::types::{Aabb3D, Scalar};

/// Capabilities a bounding volume must provide to parameterize a hierarchy.
///
/// Implementations must be conservative: `overlaps` may report overlap for disjoint
/// volumes, but never the reverse, and `distance_lower_bound` must never exceed the
/// true separation of anything the volumes enclose.
pub trait BoundingVolume<T: Scalar>: Copy + Debug + PartialEq {
    /// The smallest volume of this type holding a single point.
    fn from_point(p: [T; 3]) -> Self;

    /// The union of two volumes.
    fn merge(&self, other: &Self) -> Self;

    /// Whether the point is inside the volume (boundary inclusive).
    fn contains(&self, p: [T; 3]) -> bool;

    /// Whether two volumes overlap (touching counts as overlapping).
    fn overlaps(&self, other: &Self) -> bool;

    /// A non-negative lower bound on the distance between the two volumes.
    fn distance_lower_bound(&self, other: &Self) -> T;

    /// The volume grown by `amount` in every direction.
    fn inflated(&self, amount: T) -> Self;

    /// Axis-aligned box enclosing the volume.
    fn aabb(&self) -> Aabb3D<T>;

    /// A volume enclosing all `points`, or `None` when there are none.
    fn from_points(points: &[[T; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(
            rest.iter()
                .fold(Self::from_point(*first), |acc, p| acc.merge(&Self::from_point(*p))),
        )
    }
}

impl<T: Scalar> BoundingVolume<T> for Aabb3D<T> {
    fn from_point(p: [T; 3]) -> Self {
        Self::from_point(p)
    }

    fn merge(&self, other: &Self) -> Self {
        self.union(other)
    }

    fn contains(&self, p: [T; 3]) -> bool {
        self.contains_point(p)
    }

    fn overlaps(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }

    fn distance_lower_bound(&self, other: &Self) -> T {
        self.distance(other)
    }

    fn inflated(&self, amount: T) -> Self {
        Self::inflated(self, amount)
    }

    fn aabb(&self) -> Aabb3D<T> {
        *self
    }

    fn from_points(points: &[[T; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut acc = Self::from_point(*first);
        for p in rest {
            acc.include_point(*p);
        }
        Some(acc)
    }
}
