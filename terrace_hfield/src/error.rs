// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for height-field construction and shape creation.

use thiserror::Error;

/// Errors raised when building or editing a height field.
///
/// Every fallible operation validates its input before touching any state, so an error
/// always leaves the height field as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeightFieldError {
    /// The sample matrix must have at least 2 rows and 2 columns.
    #[error("height field needs at least 2x2 samples, got {rows} rows x {cols} columns")]
    TooFewSamples {
        /// Number of sample rows (along y).
        rows: usize,
        /// Number of sample columns (along x).
        cols: usize,
    },

    /// Footprint dimensions must be finite and strictly positive.
    #[error("invalid footprint {x_dim} x {y_dim}: dimensions must be finite and positive")]
    InvalidDimensions {
        /// Extent along x.
        x_dim: f64,
        /// Extent along y.
        y_dim: f64,
    },

    /// A sample is NaN or infinite.
    #[error("sample ({row}, {col}) is not finite")]
    NonFiniteSample {
        /// Row of the offending sample.
        row: usize,
        /// Column of the offending sample.
        col: usize,
    },

    /// The floor altitude is NaN or infinite.
    #[error("floor altitude {0} is not finite")]
    NonFiniteFloor(f64),

    /// A sample lies below the floor altitude.
    #[error("sample ({row}, {col}) = {value} lies below the floor altitude {min_height}")]
    BelowFloor {
        /// Row of the offending sample.
        row: usize,
        /// Column of the offending sample.
        col: usize,
        /// The sample value.
        value: f64,
        /// The floor altitude.
        min_height: f64,
    },

    /// Replacement samples must keep the current grid shape.
    #[error("expected {expected_rows} x {expected_cols} samples, got {rows} x {cols}")]
    ShapeMismatch {
        /// Rows of the current grid.
        expected_rows: usize,
        /// Columns of the current grid.
        expected_cols: usize,
        /// Rows supplied.
        rows: usize,
        /// Columns supplied.
        cols: usize,
    },

    /// A single-sample edit addressed a sample outside the grid.
    #[error("sample ({row}, {col}) is outside the {rows} x {cols} grid")]
    SampleOutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Rows of the grid.
        rows: usize,
        /// Columns of the grid.
        cols: usize,
    },
}

/// Result alias for height-field operations.
pub type HeightFieldResult<T> = Result<T, HeightFieldError>;

/// Errors raised when creating a query shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// Sphere radius must be finite and positive.
    #[error("sphere radius {0} must be finite and positive")]
    InvalidRadius(f64),

    /// Box half extents must be finite and positive.
    #[error("box half extents must be finite and positive")]
    InvalidHalfExtents,

    /// The points do not span a volume.
    #[error("convex hull of {points} points is degenerate")]
    DegenerateHull {
        /// Number of points supplied.
        points: usize,
    },
}
