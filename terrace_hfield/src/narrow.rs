// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exact convex-convex tests, delegated to parry.

use parry3d_f64::math::{Isometry, Point, Real, Vector};
use parry3d_f64::na;
use parry3d_f64::query;
use parry3d_f64::shape::Shape as ParryShape;
use tracing::warn;

use crate::cell::Bin;
use crate::request::{CollisionRequest, CollisionResult, Contact};
use crate::shape::Shape;

/// Where and along which direction two shapes meet, in the frame of the query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Witness {
    /// Midpoint between the closest (or deepest) points.
    pub(crate) position: Point<Real>,
    /// Unit normal from the first shape toward the second.
    pub(crate) normal: Vector<Real>,
    /// Closest (or deepest) point on the first shape.
    pub(crate) surface: Point<Real>,
}

/// Signed separation of a pair, with a witness when the pair is within reach.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Proximity {
    /// Signed distance, negative when interpenetrating.
    pub(crate) distance: Real,
    pub(crate) witness: Option<Witness>,
}

/// Measure a pair of shapes.
///
/// Pairs closer than the request's reach come back with a witness. Farther pairs only
/// report their distance, and only when the request tracks a lower bound; otherwise they
/// are `None`, as are pairs parry cannot handle.
pub(crate) fn proximity(
    pos1: &Isometry<Real>,
    g1: &dyn ParryShape,
    pos2: &Isometry<Real>,
    g2: &dyn ParryShape,
    request: &CollisionRequest,
) -> Option<Proximity> {
    match query::contact(pos1, g1, pos2, g2, request.reach()) {
        Ok(Some(c)) => Some(Proximity {
            distance: c.dist,
            witness: Some(Witness {
                position: na::center(&c.point1, &c.point2),
                normal: c.normal1.into_inner(),
                surface: c.point1,
            }),
        }),
        Ok(None) if request.wants_lower_bound() => match query::distance(pos1, g1, pos2, g2) {
            Ok(distance) => Some(Proximity {
                distance,
                witness: None,
            }),
            Err(_) => {
                warn!(
                    shape1 = ?g1.shape_type(),
                    shape2 = ?g2.shape_type(),
                    "unsupported shape pair in distance query"
                );
                None
            }
        },
        Ok(None) => None,
        Err(_) => {
            warn!(
                shape1 = ?g1.shape_type(),
                shape2 = ?g2.shape_type(),
                "unsupported shape pair in contact query"
            );
            None
        }
    }
}

/// Slack, relative to the bin size, for deciding that a witness lies on a face.
const SURFACE_TOLERANCE: Real = 1e-6;

/// Re-measure an interpenetrating bin contact witnessed on a face the height field does not
/// expose.
///
/// Contacts witnessed on the top, the floor or an outer wall of the field are genuine, and
/// separated pairs already measure a true distance to part of the field. Otherwise the
/// shape is pushed out along whichever exposed direction of the bin (up, down, or through
/// an outer wall) takes the least travel.
pub(crate) fn correct_inactive_face(
    bin: &Bin,
    shape: &Shape,
    pose: &Isometry<Real>,
    prox: &mut Proximity,
) {
    let Some(witness) = prox.witness.as_mut() else {
        return;
    };
    let size = (bin.points[5] - bin.points[0]).norm();
    if prox.distance >= 0.0 || bin.exposes(&witness.surface, SURFACE_TOLERANCE * (1.0 + size))
    {
        return;
    }
    let mut best: Option<(Real, Vector<Real>, Point<Real>)> = None;
    for normal in bin.exposed_directions() {
        let extent = bin
            .points
            .iter()
            .map(|p| p.coords.dot(&normal))
            .fold(Real::NEG_INFINITY, Real::max);
        let deepest = shape.support_point(pose, &-normal);
        let distance = deepest.coords.dot(&normal) - extent;
        if best.is_none_or(|(d, ..)| distance > d) {
            best = Some((distance, normal, deepest));
        }
    }
    let Some((distance, normal, deepest)) = best else {
        return;
    };
    prox.distance = distance;
    witness.normal = normal;
    witness.position = deepest - normal * (distance / 2.0);
}

/// Collide two plain shapes with the same margin semantics as height-field queries.
///
/// Returns the number of contacts added to `result` (0 or 1).
pub fn collide_shapes(
    shape1: &Shape,
    pose1: &Isometry<Real>,
    shape2: &Shape,
    pose2: &Isometry<Real>,
    request: &CollisionRequest,
    result: &mut CollisionResult,
) -> usize {
    if result.contacts.len() >= request.max_contacts() {
        return 0;
    }
    result.stats.bin_tests += 1;
    let Some(prox) = proximity(pose1, shape1.as_parry(), pose2, shape2.as_parry(), request) else {
        return 0;
    };
    if request.wants_lower_bound() {
        result.update_distance_lower_bound(prox.distance - request.security_margin);
    }
    match prox.witness {
        Some(w) if request.is_colliding(prox.distance) => {
            result.contacts.push(Contact {
                position: w.position,
                normal: w.normal,
                penetration_depth: -prox.distance,
                cell: None,
                bin: None,
            });
            1
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, CellBoundary};
    use approx::assert_relative_eq;
    use terrace_bounds::GridCell;

    fn interior_cell() -> Cell {
        Cell {
            index: GridCell::new(1, 1),
            x0: 0.0,
            x1: 1.0,
            y0: 1.0,
            y1: 0.0,
            nw: 1.0,
            ne: 1.0,
            sw: 1.0,
            se: 1.0,
            floor: 0.0,
            boundary: CellBoundary::empty(),
        }
    }

    #[test]
    fn spheres_touching_count_at_zero_margin() {
        let ball = Shape::sphere(1.0).unwrap();
        let request = CollisionRequest::default();
        let mut result = CollisionResult::new();
        let added = collide_shapes(
            &ball,
            &Isometry::identity(),
            &ball,
            &Isometry::translation(2.0, 0.0, 0.0),
            &request,
            &mut result,
        );
        assert_eq!(added, 1);
        let c = result.contact(0).unwrap();
        assert_relative_eq!(c.normal, Vector::x(), epsilon = 1e-9);
        assert_relative_eq!(c.position, Point::new(1.0, 0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(c.penetration_depth, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn separated_pair_reports_shifted_lower_bound() {
        let ball = Shape::sphere(1.0).unwrap();
        let request = CollisionRequest::default().with_security_margin(0.25);
        let mut result = CollisionResult::new();
        let added = collide_shapes(
            &ball,
            &Isometry::identity(),
            &ball,
            &Isometry::translation(0.0, 0.0, 3.0),
            &request,
            &mut result,
        );
        assert_eq!(added, 0);
        assert_relative_eq!(result.distance_lower_bound, 0.75, epsilon = 1e-9);

        // Without the flag, far pairs are not measured at all.
        let mut quiet = CollisionResult::new();
        let request = request.with_flags(crate::request::RequestFlags::CONTACT);
        collide_shapes(
            &ball,
            &Isometry::identity(),
            &ball,
            &Isometry::translation(0.0, 0.0, 3.0),
            &request,
            &mut quiet,
        );
        assert_eq!(quiet.distance_lower_bound, Real::INFINITY);
    }

    #[test]
    fn inactive_face_contact_is_remeasured_along_surface() {
        let [bin, _] = interior_cell().bins();
        let ball = Shape::sphere(0.25).unwrap();
        // Sunk slightly into the surface next to the diagonal, witnessed on the diagonal.
        let pose = Isometry::translation(0.6, 0.4, 1.2);
        let surface = Point::new(0.5, 0.5, 0.9);
        assert!(!bin.exposes(&surface, 1e-9));
        let mut prox = Proximity {
            distance: -0.01,
            witness: Some(Witness {
                position: Point::new(0.5, 0.5, 1.0),
                normal: Vector::new(1.0, -1.0, 0.0).normalize(),
                surface,
            }),
        };
        correct_inactive_face(&bin, &ball, &pose, &mut prox);
        assert_relative_eq!(prox.distance, -0.05, epsilon = 1e-12);
        let w = prox.witness.unwrap();
        assert_relative_eq!(w.normal, Vector::z(), epsilon = 1e-12);
        assert_relative_eq!(w.position, Point::new(0.6, 0.4, 0.975), epsilon = 1e-12);
    }

    #[test]
    fn active_face_contact_is_kept() {
        let [bin, _] = interior_cell().bins();
        let ball = Shape::sphere(0.25).unwrap();
        let original = Proximity {
            distance: 0.1,
            witness: Some(Witness {
                position: Point::new(0.2, 0.8, 1.05),
                normal: Vector::z(),
                surface: Point::new(0.2, 0.8, 1.0),
            }),
        };
        let mut prox = original;
        correct_inactive_face(&bin, &ball, &Isometry::translation(0.2, 0.8, 1.35), &mut prox);
        assert_eq!(prox, original);
    }

    #[test]
    fn contact_on_outer_wall_edge_is_kept() {
        // An east edge cell in an inner row: the north-west bin reaches the east wall only
        // through its north-east edge, where the diagonal and the inner north side meet.
        let mut cell = interior_cell();
        cell.boundary = CellBoundary::EAST;
        let [bin, _] = cell.bins();
        let ball = Shape::sphere(0.25).unwrap();
        let pose = Isometry::translation(1.24, 0.95, 0.5);
        let original = Proximity {
            distance: -0.005,
            witness: Some(Witness {
                position: Point::new(1.0025, 0.999, 0.5),
                normal: Vector::new(0.98, -0.2, 0.0).normalize(),
                surface: Point::new(1.0, 1.0, 0.5),
            }),
        };
        let mut prox = original;
        correct_inactive_face(&bin, &ball, &pose, &mut prox);
        assert_eq!(prox, original);

        // The same edge inside the field is remeasured.
        cell.boundary = CellBoundary::empty();
        let [inner, _] = cell.bins();
        correct_inactive_face(&inner, &ball, &pose, &mut prox);
        assert_relative_eq!(prox.distance, -0.75, epsilon = 1e-12);
    }

    #[test]
    fn remeasured_contact_prefers_the_nearest_outer_wall() {
        let mut cell = interior_cell();
        cell.boundary = CellBoundary::EAST;
        let [bin, _] = cell.bins();
        let ball = Shape::sphere(0.25).unwrap();
        // Pressed 0.02 into the east wall but witnessed on the diagonal.
        let pose = Isometry::translation(1.23, 0.5, 0.5);
        let mut prox = Proximity {
            distance: -0.01,
            witness: Some(Witness {
                position: Point::new(0.75, 0.5, 0.5),
                normal: Vector::new(2.0, -1.0, 0.0).normalize(),
                surface: Point::new(0.7, 0.7, 0.5),
            }),
        };
        correct_inactive_face(&bin, &ball, &pose, &mut prox);
        assert_relative_eq!(prox.distance, -0.02, epsilon = 1e-12);
        let w = prox.witness.unwrap();
        assert_relative_eq!(w.normal, Vector::x(), epsilon = 1e-12);
        assert_relative_eq!(w.position, Point::new(0.99, 0.5, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn separated_pairs_are_not_remeasured() {
        let [bin, _] = interior_cell().bins();
        let ball = Shape::sphere(0.25).unwrap();
        let original = Proximity {
            distance: 0.02,
            witness: Some(Witness {
                position: Point::new(0.51, 0.49, 0.5),
                normal: Vector::new(1.0, -1.0, 0.0).normalize(),
                surface: Point::new(0.5, 0.5, 0.5),
            }),
        };
        let mut prox = original;
        correct_inactive_face(&bin, &ball, &Isometry::translation(0.7, 0.3, 0.5), &mut prox);
        assert_eq!(prox, original);
    }
}
