// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Terrace Bounds: bounding volumes and a bounding volume hierarchy over grid cells.
//!
//! - Two volume types implement the [`BoundingVolume`] capability trait:
//!   axis-aligned boxes ([`Aabb3D`]) and spheres ([`BoundingSphere`]).
//! - [`Hierarchy`] partitions a `cols × rows` grid of cells into a binary tree with one
//!   leaf per cell. Volumes can be refit in place, for the whole tree or a single cell.
//! - Traversal is driven by a visitor that decides per node whether to descend, prune or
//!   stop, which is all a collision query needs for early pruning.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//!
//! # Example
//!
//! ```rust
//! use terrace_bounds::{Aabb3D, AabbHierarchy, GridCell};
//!
//! // A 4×3 grid of unit cells with altitudes equal to the column index.
//! let mut tree = AabbHierarchy::build(4, 3, |c| {
//!     let (x, y) = (c.col as f64, c.row as f64);
//!     Aabb3D::new(x, y, 0.0, x + 1.0, y + 1.0, c.col as f64)
//! });
//! assert_eq!(tree.len(), 2 * 12 - 1);
//!
//! // Raise one cell and refit only its path to the root.
//! let cell = GridCell::new(1, 0);
//! tree.refit_cell(cell, Aabb3D::new(0.0, 1.0, 0.0, 1.0, 2.0, 10.0));
//! assert_eq!(tree.root_bv().unwrap().max_z, 10.0);
//!
//! let hits: Vec<_> = tree.query_point([0.5, 1.5, 9.0]).collect();
//! assert_eq!(hits, vec![cell]);
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Comparisons involving NaN
//! treat the volumes as disjoint.

pub mod hierarchy;
pub mod sphere;
pub mod types;
pub mod volume;

pub use hierarchy::{
    AabbHierarchy, CellSpan, GridCell, Hierarchy, Node, NodeIdx, NodeKind, SphereHierarchy,
    Visit,
};
pub use sphere::BoundingSphere;
pub use types::{Aabb3D, Scalar};
pub use volume::BoundingVolume;

#[cfg(test)]
mod tests {
    use super::*;

    fn column(cell: GridCell, top: f64) -> Aabb3D<f64> {
        let (x, y) = (cell.col as f64, cell.row as f64);
        Aabb3D::new(x, y, -1.0, x + 1.0, y + 1.0, top)
    }

    #[test]
    fn aabb_and_sphere_trees_agree_on_coarse_pruning() {
        let boxes = AabbHierarchy::build(6, 6, |c| column(c, 1.0));
        let spheres = SphereHierarchy::build(6, 6, |c| {
            BoundingSphere::from_points(&column(c, 1.0).corners()).unwrap()
        });
        // Far above the grid both roots reject the query volume.
        let query = Aabb3D::new(2.0, 2.0, 20.0, 3.0, 3.0, 21.0);
        assert!(!boxes.root_bv().unwrap().overlaps(&query));
        let query_sphere = BoundingSphere::from_points(&query.corners()).unwrap();
        assert!(!spheres.root_bv().unwrap().overlaps(&query_sphere));
        // The box bound is tight, the sphere bound only conservative.
        let d_box = boxes.root_bv().unwrap().distance_lower_bound(&query);
        let d_sphere = spheres.root_bv().unwrap().distance_lower_bound(&query_sphere);
        assert_eq!(d_box, 19.0);
        assert!(d_sphere <= d_box);
    }

    #[test]
    fn full_refit_tracks_new_cell_volumes() {
        let mut tree = AabbHierarchy::build(3, 5, |c| column(c, 1.0));
        tree.refit(|c| column(c, 2.0 + c.row as f64));
        assert_eq!(tree.root_bv().unwrap().max_z, 6.0);
        let leaf = tree.leaf(GridCell::new(0, 2)).unwrap();
        assert_eq!(tree.node(leaf).bv.max_z, 2.0);
    }
}
