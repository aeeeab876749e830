// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The height-field collision object.

use parry3d_f64::math::{Isometry, Real};
use parry3d_f64::na::DMatrix;
use terrace_bounds::{Aabb3D, BoundingVolume, GridCell, Hierarchy, Node};
use tracing::debug;

use crate::cell::Cell;
use crate::error::HeightFieldResult;
use crate::grid::HeightFieldGrid;
use crate::request::{CollisionRequest, CollisionResult};
use crate::shape::Shape;
use crate::traversal;

/// A terrain-like solid: altitude samples over a rectangular footprint centered on the
/// origin, closed below by a floor altitude.
///
/// The bounding volume hierarchy is built on construction and kept in sync with the
/// samples by every mutation, so queries never rebuild anything. Only the stored local
/// AABB lags behind: after [`update_heights`](Self::update_heights) or
/// [`set_height`](Self::set_height) it stays stale until
/// [`compute_local_aabb`](Self::compute_local_aabb).
///
/// Queries take `&self` and may run concurrently; mutations take `&mut self`.
#[derive(Clone, Debug)]
pub struct HeightField<BV: BoundingVolume<Real>> {
    grid: HeightFieldGrid,
    hierarchy: Hierarchy<Real, BV>,
    aabb_local: Aabb3D<Real>,
    aabb_current: bool,
}

impl<BV: BoundingVolume<Real>> HeightField<BV> {
    /// Build a height field of `x_dim × y_dim` over `heights` (`rows` along y, north first;
    /// `columns` along x, west first), closed below at `min_height`.
    pub fn new(
        x_dim: Real,
        y_dim: Real,
        heights: DMatrix<Real>,
        min_height: Real,
    ) -> HeightFieldResult<Self> {
        let grid = HeightFieldGrid::new(x_dim, y_dim, heights, min_height)?;
        let hierarchy: Hierarchy<Real, BV> =
            Hierarchy::build(grid.cell_cols(), grid.cell_rows(), |c| leaf_volume(&grid, c));
        debug!(
            rows = grid.rows(),
            cols = grid.cols(),
            nodes = hierarchy.len(),
            "built height field hierarchy"
        );
        let mut this = Self {
            grid,
            hierarchy,
            aabb_local: Aabb3D::from_point([0.0; 3]),
            aabb_current: false,
        };
        this.store_local_aabb();
        Ok(this)
    }

    /// Replace every sample and refit the hierarchy.
    ///
    /// `heights` must have the current shape and stay above the floor; on error nothing
    /// changes. The stored local AABB is left stale.
    pub fn update_heights(&mut self, heights: DMatrix<Real>) -> HeightFieldResult<()> {
        self.grid.replace_heights(heights)?;
        let grid = &self.grid;
        self.hierarchy.refit(|c| leaf_volume(grid, c));
        self.aabb_current = false;
        debug!(
            rows = self.grid.rows(),
            cols = self.grid.cols(),
            max_height = self.grid.max_height(),
            "replaced height samples"
        );
        Ok(())
    }

    /// Replace the sample at `(row, col)` and refit only the cells around it.
    ///
    /// The resulting hierarchy is identical to a full refit. The stored local AABB is left
    /// stale.
    pub fn set_height(&mut self, row: usize, col: usize, value: Real) -> HeightFieldResult<()> {
        self.grid.set_height(row, col, value)?;
        for r in row.saturating_sub(1)..=row.min(self.grid.cell_rows() - 1) {
            for c in col.saturating_sub(1)..=col.min(self.grid.cell_cols() - 1) {
                let cell = GridCell::new(r, c);
                self.hierarchy.refit_cell(cell, leaf_volume(&self.grid, cell));
            }
        }
        self.aabb_current = false;
        Ok(())
    }

    /// Refit the hierarchy over the current samples and store the root's bounding box as
    /// the local AABB.
    pub fn compute_local_aabb(&mut self) {
        let grid = &self.grid;
        self.hierarchy.refit(|c| leaf_volume(grid, c));
        self.store_local_aabb();
        debug!(aabb = ?self.aabb_local, "computed local aabb");
    }

    fn store_local_aabb(&mut self) {
        self.aabb_local = self
            .hierarchy
            .root_bv()
            .map(|bv| bv.aabb())
            .unwrap_or(self.aabb_local);
        self.aabb_current = true;
    }

    /// Collide with `shape` at `shape_pose`, this height field being at `hf_pose`.
    ///
    /// Contacts are appended to `result` with normals pointing from the height field
    /// toward the shape. Returns the number of contacts added.
    pub fn collide(
        &self,
        hf_pose: &Isometry<Real>,
        shape: &Shape,
        shape_pose: &Isometry<Real>,
        request: &CollisionRequest,
        result: &mut CollisionResult,
    ) -> usize {
        traversal::collide(self, hf_pose, shape, shape_pose, request, result, false)
    }

    /// The cell at `index`, built from the current samples.
    pub fn cell(&self, index: GridCell) -> Option<Cell> {
        self.grid.cell(index)
    }

    /// Samples, footprint and coordinate arrays.
    pub fn grid(&self) -> &HeightFieldGrid {
        &self.grid
    }

    /// The bounding volume hierarchy.
    pub fn hierarchy(&self) -> &Hierarchy<Real, BV> {
        &self.hierarchy
    }

    /// Hierarchy nodes in pre-order, root first.
    pub fn nodes(&self) -> &[Node<BV>] {
        self.hierarchy.nodes()
    }

    /// The stored local AABB.
    pub fn aabb_local(&self) -> &Aabb3D<Real> {
        &self.aabb_local
    }

    /// Whether the stored local AABB reflects the current samples.
    pub fn local_aabb_is_current(&self) -> bool {
        self.aabb_current
    }

    /// Footprint extent along x.
    pub fn x_dim(&self) -> Real {
        self.grid.x_dim()
    }

    /// Footprint extent along y.
    pub fn y_dim(&self) -> Real {
        self.grid.y_dim()
    }

    /// x coordinate of every sample column, west to east.
    pub fn x_grid(&self) -> &[Real] {
        self.grid.x_grid()
    }

    /// y coordinate of every sample row, north to south.
    pub fn y_grid(&self) -> &[Real] {
        self.grid.y_grid()
    }

    /// The sample matrix.
    pub fn heights(&self) -> &DMatrix<Real> {
        self.grid.heights()
    }

    /// Floor altitude.
    pub fn min_height(&self) -> Real {
        self.grid.min_height()
    }

    /// Highest sample.
    pub fn max_height(&self) -> Real {
        self.grid.max_height()
    }

    /// Number of sample rows.
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Number of sample columns.
    pub fn cols(&self) -> usize {
        self.grid.cols()
    }
}

impl<BV: BoundingVolume<Real>> PartialEq for HeightField<BV> {
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid
            && self.hierarchy == other.hierarchy
            && self.aabb_local == other.aabb_local
    }
}

fn leaf_volume<BV: BoundingVolume<Real>>(grid: &HeightFieldGrid, cell: GridCell) -> BV {
    grid.cell(cell)
        .map(|c| c.bounding_volume())
        .unwrap_or_else(|| BV::from_point([0.0; 3]))
}

/// Height field over axis-aligned boxes.
pub type AabbHeightField = HeightField<Aabb3D<Real>>;

/// Height field over bounding spheres.
pub type SphereHeightField = HeightField<terrace_bounds::BoundingSphere<Real>>;
