//! The ndarray-interp-sparse crate turns 2D grid interpolation
//! into a precomputed sparse linear operator.
//!
//! Interpolating the same query points against many different fields
//! repeats the same index and weight bookkeeping every time. [`InterpMatrix`]
//! does that work once and stores the result as a sparse matrix `M`
//! of shape `(queries, grid points)`, so every later evaluation is a single
//! sparse matrix-vector product.
//!
//! The supported methods are nearest neighbour, bilinear and bicubic
//! (Keys convolution) interpolation on uniformly spaced Cartesian grids.
//! See [`Method`] and the [`stencil`] module for the individual strategies
//! and the [`boundary`] module for the bicubic wall treatment.
//!
//! ```rust
//! # use ndarray::*;
//! # use ndarray_interp_sparse::*;
//! # use approx::*;
//! let grid = RefGrid::from_vectors(array![0.0, 1.0, 2.0], array![0.0, 1.0, 2.0]).unwrap();
//! let interp = InterpMatrix::builder(grid)
//!     .method(Method::Linear)
//!     .build(&array![0.5, 1.5], &array![0.5, 0.25])
//!     .unwrap();
//!
//! // field[[i, j]] = x_i + 10 * y_j
//! let field = array![
//!     [0.0, 10.0, 20.0],
//!     [1.0, 11.0, 21.0],
//!     [2.0, 12.0, 22.0],
//! ];
//! let result = interp.apply(&field).unwrap();
//! # assert_abs_diff_eq!(result, array![5.5, 4.0], epsilon = 1e-12);
//! ```
use thiserror::Error;

pub mod assembly;
pub mod boundary;
pub mod grid;
pub mod locate;
mod operator;
pub mod stencil;
pub mod vector_extensions;

pub use boundary::{BoundaryConditions, Wall, WallPolicy};
pub use grid::{GridLayout, IndexOrder, RefGrid};
pub use operator::{interp2_matrix, InterpMatrix, InterpMatrixBuilder};
pub use stencil::Method;

/// Errors raised while building an [`InterpMatrix`]
#[derive(Debug, Error)]
pub enum BuilderError {
    /// the method selector is not one of `nearest`, `linear` or `cubic`
    #[error("invalid interpolation method: {0}")]
    InvalidMethod(String),
    /// the boundary tables have the wrong shape, or an active wall has
    /// missing or out of grid targets
    #[error("malformed boundary conditions: {0}")]
    MalformedBoundaryConditions(String),
    /// the query coordinate arrays do not have the same number of elements
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// the grid cannot be reduced to two uniformly spaced, rising axes
    #[error("unsupported grid layout: {0}")]
    UnsupportedGridLayout(String),
    /// an axis is shorter than the method needs
    #[error("not enough data: {0}")]
    NotEnoughData(String),
    /// the sparse matrix could not be built from the triplets
    #[error("failed to assemble the sparse operator: {0}")]
    SparseCreation(String),
}

/// Errors raised while evaluating an [`InterpMatrix`] against field values
#[derive(Debug, Error)]
pub enum InterpolateError {
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
}
