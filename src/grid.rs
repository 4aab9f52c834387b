//! Reference grid normalization
//!
//! A [`RefGrid`] is always stored as two rising, uniformly spaced axes,
//! no matter whether it was described by two vectors, an ndgrid mesh
//! or a meshgrid mesh.

use ndarray::{Array1, ArrayBase, ArrayView2, Axis, Data, Dimension, Ix1, Ix2};
use tracing::warn;

use crate::{
    vector_extensions::{Monotonic, VectorExtensions},
    BuilderError,
};

/// The layout the grid was provided in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLayout {
    /// two 1D axis vectors
    Vectors,
    /// coordinate matrices with `X[i, j] = x[i]` and `Y[i, j] = y[j]`
    Ndgrid,
    /// coordinate matrices with `X[j, i] = x[i]` and `Y[j, i] = y[j]`
    Meshgrid,
}

/// Mapping from a grid point `(i, j)` to its column in the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexOrder {
    /// `col = i * ny + j`, the order of an `(nx, ny)` array in standard layout
    #[default]
    RowMajor,
    /// `col = i + j * nx`
    ColumnMajor,
}

impl IndexOrder {
    /// flat index of the grid point `(i, j)`
    #[inline]
    pub fn linear_index(self, i: usize, j: usize, nx: usize, ny: usize) -> usize {
        match self {
            IndexOrder::RowMajor => i * ny + j,
            IndexOrder::ColumnMajor => i + j * nx,
        }
    }

    /// inverse of [`linear_index`](IndexOrder::linear_index)
    #[inline]
    pub fn unravel(self, idx: usize, nx: usize, ny: usize) -> (usize, usize) {
        match self {
            IndexOrder::RowMajor => (idx / ny, idx % ny),
            IndexOrder::ColumnMajor => (idx % nx, idx / nx),
        }
    }
}

/// A uniformly spaced Cartesian reference grid
#[derive(Debug, Clone, PartialEq)]
pub struct RefGrid {
    x: Array1<f64>,
    y: Array1<f64>,
    dx: f64,
    dy: f64,
    layout: GridLayout,
}

impl RefGrid {
    /// Create the grid from two axis vectors.
    ///
    /// Both axes need at least two values and must be strictly monotonic rising
    /// with constant spacing.
    pub fn from_vectors<Sx, Sy>(
        x: ArrayBase<Sx, Ix1>,
        y: ArrayBase<Sy, Ix1>,
    ) -> Result<Self, BuilderError>
    where
        Sx: Data<Elem = f64>,
        Sy: Data<Elem = f64>,
    {
        Self::from_axes(x.to_owned(), y.to_owned(), GridLayout::Vectors)
    }

    /// Create the grid from two coordinate matrices.
    ///
    /// The layout (ndgrid or meshgrid) is detected automatically.
    /// Meshgrid input is accepted, but converted with a warning.
    pub fn from_mesh<Sx, Sy>(
        x: &ArrayBase<Sx, Ix2>,
        y: &ArrayBase<Sy, Ix2>,
    ) -> Result<Self, BuilderError>
    where
        Sx: Data<Elem = f64>,
        Sy: Data<Elem = f64>,
    {
        if x.shape() != y.shape() {
            return Err(BuilderError::UnsupportedGridLayout(format!(
                "coordinate matrices need the same shape. Got X: {:?}, Y: {:?}",
                x.shape(),
                y.shape()
            )));
        }
        let (x, y) = (x.view(), y.view());

        if is_ndgrid(x, y) {
            let xref = x.column(0).to_owned();
            let yref = y.row(0).to_owned();
            return Self::from_axes(xref, yref, GridLayout::Ndgrid);
        }
        if is_ndgrid(x.t(), y.t()) {
            warn!(
                shape = ?x.shape(),
                "meshgrid layout detected, converting to ndgrid axes"
            );
            let xref = x.row(0).to_owned();
            let yref = y.column(0).to_owned();
            return Self::from_axes(xref, yref, GridLayout::Meshgrid);
        }
        Err(BuilderError::UnsupportedGridLayout(
            "coordinate matrices are neither in ndgrid nor in meshgrid layout".into(),
        ))
    }

    /// Create the grid from coordinates of any dimensionality.
    ///
    /// 1D inputs, and 2D inputs with a singleton axis, are treated as axis vectors.
    /// Other 2D inputs are treated as coordinate meshes, see [`from_mesh`](RefGrid::from_mesh).
    pub fn from_coords<Sx, Sy, D>(
        x: &ArrayBase<Sx, D>,
        y: &ArrayBase<Sy, D>,
    ) -> Result<Self, BuilderError>
    where
        Sx: Data<Elem = f64>,
        Sy: Data<Elem = f64>,
        D: Dimension,
    {
        match (x.ndim(), y.ndim()) {
            (1, 1) => Self::from_vectors(
                Array1::from_iter(x.iter().copied()),
                Array1::from_iter(y.iter().copied()),
            ),
            (2, 2) => {
                let x2 = x.view().into_dimensionality::<Ix2>().map_err(layout_err)?;
                let y2 = y.view().into_dimensionality::<Ix2>().map_err(layout_err)?;
                let x_vector = x2.shape().contains(&1);
                let y_vector = y2.shape().contains(&1);
                if x_vector && y_vector {
                    Self::from_vectors(
                        Array1::from_iter(x2.iter().copied()),
                        Array1::from_iter(y2.iter().copied()),
                    )
                } else {
                    Self::from_mesh(&x2, &y2)
                }
            }
            (nx, ny) => Err(BuilderError::UnsupportedGridLayout(format!(
                "grid coordinates need to be 1D or 2D. Got x: {nx}D, y: {ny}D"
            ))),
        }
    }

    fn from_axes(x: Array1<f64>, y: Array1<f64>, layout: GridLayout) -> Result<Self, BuilderError> {
        use BuilderError::*;

        if x.len() < 2 || y.len() < 2 {
            return Err(NotEnoughData(format!(
                "each grid axis needs at least 2 values. Got x: {}, y: {}",
                x.len(),
                y.len()
            )));
        }
        if !matches!(x.monotonic_prop(), Monotonic::Rising { strict: true }) {
            return Err(UnsupportedGridLayout(
                "the x-axis needs to be strictly monotonic rising".into(),
            ));
        }
        if !matches!(y.monotonic_prop(), Monotonic::Rising { strict: true }) {
            return Err(UnsupportedGridLayout(
                "the y-axis needs to be strictly monotonic rising".into(),
            ));
        }
        if !x.is_linspaced() {
            return Err(UnsupportedGridLayout(
                "the x-axis needs to be uniformly spaced".into(),
            ));
        }
        if !y.is_linspaced() {
            return Err(UnsupportedGridLayout(
                "the y-axis needs to be uniformly spaced".into(),
            ));
        }

        let dx = x[1] - x[0];
        let dy = y[1] - y[0];
        Ok(RefGrid {
            x,
            y,
            dx,
            dy,
            layout,
        })
    }

    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// number of grid points
    pub fn n_points(&self) -> usize {
        self.nx() * self.ny()
    }

    /// the layout the grid was provided in
    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    /// is `x` inside `[x[0], x[nx - 1]]`
    pub fn is_in_x_range(&self, x: f64) -> bool {
        self.x[0] <= x && x <= self.x[self.nx() - 1]
    }

    /// is `y` inside `[y[0], y[ny - 1]]`
    pub fn is_in_y_range(&self, y: f64) -> bool {
        self.y[0] <= y && y <= self.y[self.ny() - 1]
    }

    /// The flattened coordinates of all grid points, ordered by their column
    /// in the operator.
    pub fn points(&self, order: IndexOrder) -> (Array1<f64>, Array1<f64>) {
        let (nx, ny) = (self.nx(), self.ny());
        let coords = (0..self.n_points()).map(|idx| order.unravel(idx, nx, ny));
        let xs = Array1::from_iter(coords.clone().map(|(i, _)| self.x[i]));
        let ys = Array1::from_iter(coords.map(|(_, j)| self.y[j]));
        (xs, ys)
    }
}

/// `x` varies only along axis 0 and `y` only along axis 1
fn is_ndgrid(x: ArrayView2<f64>, y: ArrayView2<f64>) -> bool {
    let x_first = x.column(0);
    let y_first = y.row(0);
    x.axis_iter(Axis(1)).all(|col| col == x_first)
        && y.axis_iter(Axis(0)).all(|row| row == y_first)
}

fn layout_err(err: ndarray::ShapeError) -> BuilderError {
    BuilderError::UnsupportedGridLayout(format!("{err}"))
}
