// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Altitude samples over a rectangular footprint.

use parry3d_f64::math::Real;
use parry3d_f64::na::DMatrix;
use terrace_bounds::GridCell;

use crate::cell::{Cell, CellBoundary};
use crate::error::{HeightFieldError, HeightFieldResult};

/// Samples may dip this far below the floor before being rejected.
pub const HEIGHT_TOLERANCE: Real = 1e-6;

/// Sample matrix, footprint and derived coordinate arrays of a height field.
///
/// The footprint is centered on the origin. Columns run west to east along x and rows run
/// north to south, so `x_grid` increases and `y_grid` decreases with the index.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightFieldGrid {
    x_dim: Real,
    y_dim: Real,
    heights: DMatrix<Real>,
    min_height: Real,
    max_height: Real,
    x_grid: Vec<Real>,
    y_grid: Vec<Real>,
}

impl HeightFieldGrid {
    /// Validate the samples and derive the coordinate arrays.
    pub fn new(
        x_dim: Real,
        y_dim: Real,
        heights: DMatrix<Real>,
        min_height: Real,
    ) -> HeightFieldResult<Self> {
        if heights.nrows() < 2 || heights.ncols() < 2 {
            return Err(HeightFieldError::TooFewSamples {
                rows: heights.nrows(),
                cols: heights.ncols(),
            });
        }
        if !(x_dim.is_finite() && y_dim.is_finite() && x_dim > 0.0 && y_dim > 0.0) {
            return Err(HeightFieldError::InvalidDimensions { x_dim, y_dim });
        }
        if !min_height.is_finite() {
            return Err(HeightFieldError::NonFiniteFloor(min_height));
        }
        let max_height = validate_samples(&heights, min_height)?;
        let x_grid = linspace(-x_dim / 2.0, x_dim / 2.0, heights.ncols());
        let y_grid = linspace(y_dim / 2.0, -y_dim / 2.0, heights.nrows());
        Ok(Self {
            x_dim,
            y_dim,
            heights,
            min_height,
            max_height,
            x_grid,
            y_grid,
        })
    }

    /// Replace every sample; the new matrix must have the same shape.
    pub fn replace_heights(&mut self, heights: DMatrix<Real>) -> HeightFieldResult<()> {
        if heights.shape() != self.heights.shape() {
            return Err(HeightFieldError::ShapeMismatch {
                expected_rows: self.heights.nrows(),
                expected_cols: self.heights.ncols(),
                rows: heights.nrows(),
                cols: heights.ncols(),
            });
        }
        self.max_height = validate_samples(&heights, self.min_height)?;
        self.heights = heights;
        Ok(())
    }

    /// Replace a single sample.
    pub fn set_height(&mut self, row: usize, col: usize, value: Real) -> HeightFieldResult<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(HeightFieldError::SampleOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        validate_sample(row, col, value, self.min_height)?;
        let previous = self.heights[(row, col)];
        self.heights[(row, col)] = value;
        if value >= self.max_height {
            self.max_height = value;
        } else if previous >= self.max_height {
            self.max_height = self.heights.max();
        }
        Ok(())
    }

    /// The cell at `index`, built from the current samples.
    pub fn cell(&self, index: GridCell) -> Option<Cell> {
        if index.row >= self.cell_rows() || index.col >= self.cell_cols() {
            return None;
        }
        let (i, j) = (index.row, index.col);
        let mut boundary = CellBoundary::empty();
        boundary.set(CellBoundary::WEST, j == 0);
        boundary.set(CellBoundary::EAST, j + 1 == self.cell_cols());
        boundary.set(CellBoundary::NORTH, i == 0);
        boundary.set(CellBoundary::SOUTH, i + 1 == self.cell_rows());
        Some(Cell {
            index,
            x0: self.x_grid[j],
            x1: self.x_grid[j + 1],
            y0: self.y_grid[i],
            y1: self.y_grid[i + 1],
            nw: self.heights[(i, j)],
            ne: self.heights[(i, j + 1)],
            sw: self.heights[(i + 1, j)],
            se: self.heights[(i + 1, j + 1)],
            floor: self.min_height,
            boundary,
        })
    }

    /// Footprint extent along x.
    pub fn x_dim(&self) -> Real {
        self.x_dim
    }

    /// Footprint extent along y.
    pub fn y_dim(&self) -> Real {
        self.y_dim
    }

    /// Sample matrix, `rows × cols`.
    pub fn heights(&self) -> &DMatrix<Real> {
        &self.heights
    }

    /// Floor altitude closing the solid from below.
    pub fn min_height(&self) -> Real {
        self.min_height
    }

    /// Highest sample.
    pub fn max_height(&self) -> Real {
        self.max_height
    }

    /// x coordinate of every sample column.
    pub fn x_grid(&self) -> &[Real] {
        &self.x_grid
    }

    /// y coordinate of every sample row.
    pub fn y_grid(&self) -> &[Real] {
        &self.y_grid
    }

    /// Number of sample rows.
    pub fn rows(&self) -> usize {
        self.heights.nrows()
    }

    /// Number of sample columns.
    pub fn cols(&self) -> usize {
        self.heights.ncols()
    }

    /// Number of cell rows.
    pub fn cell_rows(&self) -> usize {
        self.rows() - 1
    }

    /// Number of cell columns.
    pub fn cell_cols(&self) -> usize {
        self.cols() - 1
    }
}

fn validate_sample(row: usize, col: usize, value: Real, min_height: Real) -> HeightFieldResult<()> {
    if !value.is_finite() {
        return Err(HeightFieldError::NonFiniteSample { row, col });
    }
    if value < min_height - HEIGHT_TOLERANCE {
        return Err(HeightFieldError::BelowFloor {
            row,
            col,
            value,
            min_height,
        });
    }
    Ok(())
}

/// Check every sample and return the maximum.
fn validate_samples(heights: &DMatrix<Real>, min_height: Real) -> HeightFieldResult<Real> {
    let mut max = Real::NEG_INFINITY;
    for col in 0..heights.ncols() {
        for row in 0..heights.nrows() {
            let value = heights[(row, col)];
            validate_sample(row, col, value, min_height)?;
            max = max.max(value);
        }
    }
    Ok(max)
}

/// `n >= 2` evenly spaced values, hitting both ends exactly.
fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    let step = (end - start) / (n - 1) as Real;
    let mut out: Vec<Real> = (0..n).map(|i| start + i as Real * step).collect();
    out[n - 1] = end;
    out
}
