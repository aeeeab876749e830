// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};

/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3D<T> {
    /// Minimum x
    pub min_x: T,
    /// Minimum y
    pub min_y: T,
    /// Minimum z (bottom)
    pub min_z: T,
    /// Maximum x
    pub max_x: T,
    /// Maximum y
    pub max_y: T,
    /// Maximum z (top)
    pub max_z: T,
}

impl<T> Aabb3D<T> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: T, min_y: T, min_z: T, max_x: T, max_y: T, max_z: T) -> Self {
        Self {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }
}

impl<T: Copy> Aabb3D<T> {
    /// A degenerate AABB holding a single point.
    pub const fn from_point(p: [T; 3]) -> Self {
        Self::new(p[0], p[1], p[2], p[0], p[1], p[2])
    }

    /// Minimum corner.
    pub const fn min(&self) -> [T; 3] {
        [self.min_x, self.min_y, self.min_z]
    }

    /// Maximum corner.
    pub const fn max(&self) -> [T; 3] {
        [self.max_x, self.max_y, self.max_z]
    }
}

impl<T: Copy + PartialOrd> Aabb3D<T> {
    /// Whether this AABB contains the point (boundary inclusive).
    pub fn contains_point(&self, p: [T; 3]) -> bool {
        le(self.min_x, p[0])
            && le(self.min_y, p[1])
            && le(self.min_z, p[2])
            && le(p[0], self.max_x)
            && le(p[1], self.max_y)
            && le(p[2], self.max_z)
    }

    /// Whether `other` lies entirely inside this AABB.
    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.contains_point(other.min()) && self.contains_point(other.max())
    }

    /// The intersection of two AABBs.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min_x: max_t(self.min_x, other.min_x),
            min_y: max_t(self.min_y, other.min_y),
            min_z: max_t(self.min_z, other.min_z),
            max_x: min_t(self.max_x, other.max_x),
            max_y: min_t(self.max_y, other.max_y),
            max_z: min_t(self.max_z, other.max_z),
        }
    }

    /// The smallest AABB enclosing both.
    pub fn union(&self, other: &Self) -> Self {
        union_aabb(*self, *other)
    }

    /// Grow the AABB to include `p`.
    pub fn include_point(&mut self, p: [T; 3]) {
        *self = union_aabb(*self, Self::from_point(p));
    }

    /// Return true if the AABB is inverted on any axis. Touching boxes intersect in a
    /// flat, non-empty AABB. Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        lt(self.max_x, self.min_x) || lt(self.max_y, self.min_y) || lt(self.max_z, self.min_z)
    }
}

impl<T: Scalar> Aabb3D<T> {
    /// Center of the box.
    pub fn center(&self) -> [T; 3] {
        [
            T::mid(self.min_x, self.max_x),
            T::mid(self.min_y, self.max_y),
            T::mid(self.min_z, self.max_z),
        ]
    }

    /// Grow (or, for negative amounts, shrink) every face by `amount`.
    pub fn inflated(&self, amount: T) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            min_z: self.min_z - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
            max_z: self.max_z + amount,
        }
    }

    /// Euclidean distance between the two boxes, zero when they touch or overlap.
    pub fn distance(&self, other: &Self) -> T {
        let gap = |a_min: T, a_max: T, b_min: T, b_max: T| {
            max_t(T::max_zero(b_min - a_max), T::max_zero(a_min - b_max))
        };
        let dx = gap(self.min_x, self.max_x, other.min_x, other.max_x);
        let dy = gap(self.min_y, self.max_y, other.min_y, other.max_y);
        let dz = gap(self.min_z, self.max_z, other.min_z, other.max_z);
        T::sqrt(dx * dx + dy * dy + dz * dz)
    }

    /// The eight corners, min corner first.
    pub fn corners(&self) -> [[T; 3]; 8] {
        let (a, b) = (self.min(), self.max());
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [a[0], b[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [a[0], b[1], b[2]],
            [b[0], b[1], b[2]],
        ]
    }
}

/// Numeric scalar abstraction for 3D bounding volumes.
///
/// This trait provides the minimal set of operations volumes need beyond the arithmetic
/// operators: a zero, midpoints for centers, clamping, and square roots for distances.
pub trait Scalar:
    Copy
    + PartialOrd
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Max of the scalar value and zero.
    fn max_zero(v: Self) -> Self;

    /// Midpoint between a and b.
    fn mid(a: Self, b: Self) -> Self;

    /// Square root (of a non-negative value).
    fn sqrt(v: Self) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline]
    fn sqrt(v: Self) -> Self {
        v.sqrt()
    }
}

impl Scalar for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline]
    fn sqrt(v: Self) -> Self {
        v.sqrt()
    }
}

/// Squared Euclidean length of `b - a`.
#[inline]
pub fn distance_squared<T: Scalar>(a: [T; 3], b: [T; 3]) -> T {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    dx * dx + dy * dy + dz * dz
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

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}
pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

pub(crate) fn union_aabb<T: PartialOrd + Copy>(a: Aabb3D<T>, b: Aabb3D<T>) -> Aabb3D<T> {
    Aabb3D {
        min_x: min_t(a.min_x, b.min_x),
        min_y: min_t(a.min_y, b.min_y),
        min_z: min_t(a.min_z, b.min_z),
        max_x: max_t(a.max_x, b.max_x),
        max_y: max_t(a.max_y, b.max_y),
        max_z: max_t(a.max_z, b.max_z),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_intersect_flat() {
        let a = Aabb3D::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let b = Aabb3D::new(1.0, 0.0, 0.0, 2.0, 1.0, 1.0);
        let i = a.intersect(&b);
        assert!(!i.is_empty());
        assert_eq!(i.min_x, 1.0);
        assert_eq!(i.max_x, 1.0);
        assert_eq!(a.distance(&b), 0.0);
    }

    #[test]
    fn distance_is_euclidean_gap() {
        let a = Aabb3D::new(0.0_f64, 0.0, 0.0, 1.0, 1.0, 1.0);
        let b = Aabb3D::new(4.0, 5.0, 0.5, 6.0, 6.0, 0.75);
        // Gaps: 3 in x, 4 in y, overlapping in z.
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn inflate_and_contain() {
        let a = Aabb3D::new(0.0_f32, 0.0, 0.0, 1.0, 1.0, 1.0);
        let big = a.inflated(0.5);
        assert!(big.contains_aabb(&a));
        assert!(!a.contains_aabb(&big));
        assert!(big.contains_point([-0.5, 1.5, 0.0]));
        assert!(a.inflated(-0.6).is_empty());
    }

    #[test]
    fn union_and_include() {
        let mut a = Aabb3D::from_point([1.0, 2.0, 3.0]);
        a.include_point([-1.0, 4.0, 0.0]);
        assert_eq!(a, Aabb3D::new(-1.0, 2.0, 0.0, 1.0, 4.0, 3.0));
        let b = Aabb3D::new(0.0, 0.0, 0.0, 0.5, 0.5, 0.5);
        let u = a.union(&b);
        assert_eq!(u, Aabb3D::new(-1.0, 0.0, 0.0, 1.0, 4.0, 3.0));
        assert_eq!(u.center(), [0.0, 2.0, 1.5]);
        assert!(u.corners().iter().all(|c| u.contains_point(*c)));
    }
}
