// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Height-field versus shape traversal.
//!
//! The shape is expressed in the height field's frame and bounded by a volume of the
//! height field's type. The hierarchy is walked from the root; nodes whose volume,
//! grown by the request's reach, misses the shape volume are pruned. At leaves the cell
//! is split into its two bins and each bin is tested exactly. Bins squashed onto the floor
//! keep their surface triangle, so terrain at floor level still blocks shapes.

use parry3d_f64::math::{Isometry, Real};
use terrace_bounds::{BoundingVolume, Visit};
use tracing::trace;

use crate::heightfield::HeightField;
use crate::narrow;
use crate::request::{CollisionRequest, CollisionResult, Contact, QueryStats};
use crate::shape::Shape;

/// Collide `hf` at `hf_pose` with `shape` at `shape_pose`.
///
/// With `flip`, the shape is the first object of the pair and normals are reversed.
pub(crate) fn collide<BV: BoundingVolume<Real>>(
    hf: &HeightField<BV>,
    hf_pose: &Isometry<Real>,
    shape: &Shape,
    shape_pose: &Isometry<Real>,
    request: &CollisionRequest,
    result: &mut CollisionResult,
    flip: bool,
) -> usize {
    let max_contacts = request.max_contacts();
    let start = result.contacts.len();
    if start >= max_contacts {
        return 0;
    }
    let pose_local = hf_pose.inv_mul(shape_pose);
    let shape_aabb = shape.compute_aabb(&pose_local);
    let corners = shape_aabb.vertices().map(|p| [p.x, p.y, p.z]);
    let Some(shape_bv) = BV::from_points(&corners) else {
        return 0;
    };

    let reach = request.reach();
    let margin = request.security_margin;
    let identity = Isometry::identity();
    let mut stats = QueryStats::default();

    hf.hierarchy().traverse(|_, node| {
        stats.bv_tests += 1;
        if !node.bv.inflated(reach).overlaps(&shape_bv) {
            stats.pruned += 1;
            if request.wants_lower_bound() {
                result.update_distance_lower_bound(node.bv.distance_lower_bound(&shape_bv) - margin);
            }
            return Visit::Prune;
        }
        let Some(index) = node.cell() else {
            return Visit::Descend;
        };
        let Some(cell) = hf.cell(index) else {
            return Visit::Prune;
        };
        stats.leaf_tests += 1;

        for bin in cell.bins() {
            let geometry = bin.geometry();
            if geometry.is_flat() {
                trace!(row = index.row, col = index.col, side = ?bin.side, "flat bin");
            }
            stats.bin_tests += 1;
            let Some(mut prox) = narrow::proximity(
                &identity,
                geometry.as_parry(),
                &pose_local,
                shape.as_parry(),
                request,
            ) else {
                continue;
            };
            narrow::correct_inactive_face(&bin, shape, &pose_local, &mut prox);
            if request.wants_lower_bound() {
                result.update_distance_lower_bound(prox.distance - margin);
            }
            if let Some(w) = prox.witness
                && request.is_colliding(prox.distance)
            {
                let normal = hf_pose.rotation * w.normal;
                result.contacts.push(Contact {
                    position: hf_pose * w.position,
                    normal: if flip { -normal } else { normal },
                    penetration_depth: -prox.distance,
                    cell: Some(index),
                    bin: Some(bin.side),
                });
                if result.contacts.len() >= max_contacts || !request.wants_contacts() {
                    return Visit::Stop;
                }
            }
        }
        Visit::Descend
    });

    let added = result.contacts.len() - start;
    trace!(
        bv_tests = stats.bv_tests,
        pruned = stats.pruned,
        leaf_tests = stats.leaf_tests,
        bin_tests = stats.bin_tests,
        contacts = added,
        "height field query"
    );
    result.stats += stats;
    added
}

/// Collide `shape` at `shape_pose` with `hf` at `hf_pose`.
///
/// Same as [`HeightField::collide`] with the pair swapped: normals point from the shape
/// toward the height field.
pub fn collide_shape_heightfield<BV: BoundingVolume<Real>>(
    shape: &Shape,
    shape_pose: &Isometry<Real>,
    hf: &HeightField<BV>,
    hf_pose: &Isometry<Real>,
    request: &CollisionRequest,
    result: &mut CollisionResult,
) -> usize {
    collide(hf, hf_pose, shape, shape_pose, request, result, true)
}
