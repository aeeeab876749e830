// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision request and result containers.

use core::ops::AddAssign;

use bitflags::bitflags;
use parry3d_f64::math::{Point, Real, Vector};
use terrace_bounds::{BoundingVolume, GridCell};

use crate::cell::BinSide;
use crate::heightfield::HeightField;

bitflags! {
    /// What a collision query should compute.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RequestFlags: u8 {
        /// Collect contacts (position, normal, depth). Without it the query stops at the
        /// first collision.
        const CONTACT              = 0b0000_0001;
        /// Track a lower bound on the separation distance.
        const DISTANCE_LOWER_BOUND = 0b0000_0010;
    }
}

impl Default for RequestFlags {
    fn default() -> Self {
        Self::CONTACT | Self::DISTANCE_LOWER_BOUND
    }
}

/// Default for [`CollisionRequest::distance_tolerance`].
pub const DEFAULT_DISTANCE_TOLERANCE: Real = 1e-6;

/// Parameters of a collision query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionRequest {
    /// What to compute.
    pub flags: RequestFlags,
    /// Maximum number of contacts to report. Values below 1 behave as 1.
    pub num_max_contacts: usize,
    /// Signed distance under which two objects are reported as colliding.
    ///
    /// Positive values report collisions before the objects touch, negative values
    /// require them to interpenetrate by at least the magnitude.
    pub security_margin: Real,
    /// Slack absorbing rounding in the collision decision.
    pub distance_tolerance: Real,
}

impl Default for CollisionRequest {
    fn default() -> Self {
        Self {
            flags: RequestFlags::default(),
            num_max_contacts: 1,
            security_margin: 0.0,
            distance_tolerance: DEFAULT_DISTANCE_TOLERANCE,
        }
    }
}

impl CollisionRequest {
    /// A request collecting up to one contact per cell of `hfield`.
    pub fn all_contacts<BV: BoundingVolume<Real>>(hfield: &HeightField<BV>) -> Self {
        Self::default().with_max_contacts(hfield.grid().cell_rows() * hfield.grid().cell_cols())
    }

    /// Set the security margin.
    #[must_use]
    pub fn with_security_margin(mut self, margin: Real) -> Self {
        self.security_margin = margin;
        self
    }

    /// Set the contact budget.
    #[must_use]
    pub fn with_max_contacts(mut self, n: usize) -> Self {
        self.num_max_contacts = n;
        self
    }

    /// Set the flags.
    #[must_use]
    pub fn with_flags(mut self, flags: RequestFlags) -> Self {
        self.flags = flags;
        self
    }

    pub(crate) fn max_contacts(&self) -> usize {
        self.num_max_contacts.max(1)
    }

    pub(crate) fn wants_contacts(&self) -> bool {
        self.flags.contains(RequestFlags::CONTACT)
    }

    pub(crate) fn wants_lower_bound(&self) -> bool {
        self.flags.contains(RequestFlags::DISTANCE_LOWER_BOUND)
    }

    /// How far beyond the surface pairs must be examined: the margin plus tolerance,
    /// never negative.
    pub(crate) fn reach(&self) -> Real {
        (self.security_margin + self.distance_tolerance).max(0.0)
    }

    /// Whether a pair at `distance` counts as colliding.
    pub(crate) fn is_colliding(&self, distance: Real) -> bool {
        distance - self.security_margin <= self.distance_tolerance
    }
}

/// A contact between two objects, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Point between the two surfaces.
    pub position: Point<Real>,
    /// Unit normal pointing from the first object toward the second.
    pub normal: Vector<Real>,
    /// Interpenetration depth: positive when overlapping, negative when separated.
    pub penetration_depth: Real,
    /// Height-field cell responsible for the contact.
    pub cell: Option<GridCell>,
    /// Half of the cell responsible for the contact.
    pub bin: Option<BinSide>,
}

/// Counters accumulated by a query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Node volumes tested against the query volume.
    pub bv_tests: usize,
    /// Subtrees skipped.
    pub pruned: usize,
    /// Leaves reached.
    pub leaf_tests: usize,
    /// Bins tested with the exact narrow phase.
    pub bin_tests: usize,
}

impl AddAssign for QueryStats {
    fn add_assign(&mut self, other: Self) {
        self.bv_tests += other.bv_tests;
        self.pruned += other.pruned;
        self.leaf_tests += other.leaf_tests;
        self.bin_tests += other.bin_tests;
    }
}

/// Output of a collision query.
///
/// A result may be reused across queries; contacts and the lower bound accumulate until
/// [`clear`](Self::clear).
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionResult {
    /// Contacts found, in traversal order.
    pub contacts: Vec<Contact>,
    /// Lower bound on the separation distance, shifted by the security margin.
    pub distance_lower_bound: Real,
    /// Query counters.
    pub stats: QueryStats,
}

impl Default for CollisionResult {
    fn default() -> Self {
        Self {
            contacts: Vec::new(),
            distance_lower_bound: Real::INFINITY,
            stats: QueryStats::default(),
        }
    }
}

impl CollisionResult {
    /// An empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any contact was found.
    pub fn is_collision(&self) -> bool {
        !self.contacts.is_empty()
    }

    /// Number of contacts.
    pub fn num_contacts(&self) -> usize {
        self.contacts.len()
    }

    /// Contact `i`, if any.
    pub fn contact(&self, i: usize) -> Option<&Contact> {
        self.contacts.get(i)
    }

    /// Lower the distance bound to `d` if it is smaller.
    pub fn update_distance_lower_bound(&mut self, d: Real) {
        if d < self.distance_lower_bound {
            self.distance_lower_bound = d;
        }
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        self.contacts.clear();
        self.distance_lower_bound = Real::INFINITY;
        self.stats = QueryStats::default();
    }
}
