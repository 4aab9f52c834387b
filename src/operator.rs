use faer::sparse::SparseColMat;
use ndarray::{Array1, Array2, ArrayBase, Data, Dimension, Ix1, Ix2};
use tracing::debug;

use crate::{
    assembly::{assemble, locate_all, stencils, triplets},
    boundary::{BoundaryConditions, BoundaryResolver},
    grid::{IndexOrder, RefGrid},
    stencil::{Bicubic, Bilinear, Method, Nearest, StencilStrategy},
    BuilderError, InterpolateError,
};

/// A precomputed 2D interpolation operator.
///
/// Holds the sparse matrix `M` of shape `(queries, grid points)`. Row `q` contains
/// the weights needed to interpolate at query `q`, in the columns of the
/// grid points they belong to (see [`IndexOrder`]). Rows of queries outside
/// the grid are empty, their indices are listed in [`out_of_bounds`](InterpMatrix::out_of_bounds).
///
/// The operator is immutable once built, so it can be reused for any number of fields.
#[derive(Debug)]
pub struct InterpMatrix {
    matrix: SparseColMat<usize, f64>,
    out_of_bounds: Vec<usize>,
    grid: RefGrid,
    method: Method,
    order: IndexOrder,
}

impl InterpMatrix {
    /// Get the [`InterpMatrixBuilder`] for the reference `grid`
    pub fn builder(grid: RefGrid) -> InterpMatrixBuilder {
        InterpMatrixBuilder::new(grid)
    }

    /// the sparse operator
    pub fn matrix(&self) -> &SparseColMat<usize, f64> {
        &self.matrix
    }

    pub fn into_matrix(self) -> SparseColMat<usize, f64> {
        self.matrix
    }

    /// `(queries, grid points)`
    pub fn shape(&self) -> (usize, usize) {
        (self.matrix.nrows(), self.matrix.ncols())
    }

    /// number of stored entries
    pub fn nnz(&self) -> usize {
        let (symbolic, _) = self.matrix.parts();
        symbolic.col_ptr()[self.matrix.ncols()]
    }

    /// indices of the queries outside the grid, in ascending order
    pub fn out_of_bounds(&self) -> &[usize] {
        &self.out_of_bounds
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn grid(&self) -> &RefGrid {
        &self.grid
    }

    pub fn index_order(&self) -> IndexOrder {
        self.order
    }

    /// The flattened `(x, y)` coordinates of the grid points, in column order.
    pub fn reference_points(&self) -> (Array1<f64>, Array1<f64>) {
        self.grid.points(self.order)
    }

    /// Interpolate the field `values` at all queries.
    ///
    /// `values[[i, j]]` is the field value at the grid point `(x[i], y[j])`,
    /// so the shape has to be `(nx, ny)`.
    pub fn apply<S>(&self, values: &ArrayBase<S, Ix2>) -> Result<Array1<f64>, InterpolateError>
    where
        S: Data<Elem = f64>,
    {
        let (nx, ny) = (self.grid.nx(), self.grid.ny());
        if values.dim() != (nx, ny) {
            return Err(InterpolateError::ShapeMismatch(format!(
                "field needs shape ({nx}, {ny}), got {:?}",
                values.shape()
            )));
        }
        let flat = Array1::from_shape_fn(nx * ny, |col| {
            let (i, j) = self.order.unravel(col, nx, ny);
            values[[i, j]]
        });
        self.apply_flat(&flat)
    }

    /// Interpolate a field that is already flattened in column order,
    /// see [`reference_points`](InterpMatrix::reference_points).
    pub fn apply_flat<S>(&self, values: &ArrayBase<S, Ix1>) -> Result<Array1<f64>, InterpolateError>
    where
        S: Data<Elem = f64>,
    {
        let (nrows, ncols) = self.shape();
        if values.len() != ncols {
            return Err(InterpolateError::ShapeMismatch(format!(
                "flattened field needs {ncols} values, got {}",
                values.len()
            )));
        }
        let mut result = Array1::zeros(nrows);
        let (symbolic, weights) = self.matrix.parts();
        let col_ptr = symbolic.col_ptr();
        let row_idx = symbolic.row_idx();
        for col in 0..ncols {
            let value = values[col];
            for idx in col_ptr[col]..col_ptr[col + 1] {
                result[row_idx[idx]] += weights[idx] * value;
            }
        }
        Ok(result)
    }

    /// Interpolate several flattened fields at once.
    ///
    /// Each column of `values` (shape `(grid points, k)`) is one field,
    /// the result has shape `(queries, k)`.
    pub fn apply_many<S>(&self, values: &ArrayBase<S, Ix2>) -> Result<Array2<f64>, InterpolateError>
    where
        S: Data<Elem = f64>,
    {
        let (nrows, ncols) = self.shape();
        if values.nrows() != ncols {
            return Err(InterpolateError::ShapeMismatch(format!(
                "fields need {ncols} rows, got {}",
                values.nrows()
            )));
        }
        let mut result = Array2::zeros((nrows, values.ncols()));
        let (symbolic, weights) = self.matrix.parts();
        let col_ptr = symbolic.col_ptr();
        let row_idx = symbolic.row_idx();
        for col in 0..ncols {
            let field_row = values.row(col);
            for idx in col_ptr[col]..col_ptr[col + 1] {
                let mut target = result.row_mut(row_idx[idx]);
                target.scaled_add(weights[idx], &field_row);
            }
        }
        Ok(result)
    }

    /// The operator as a dense matrix
    pub fn to_dense(&self) -> Array2<f64> {
        let (nrows, ncols) = self.shape();
        let mut dense = Array2::zeros((nrows, ncols));
        let (symbolic, weights) = self.matrix.parts();
        let col_ptr = symbolic.col_ptr();
        let row_idx = symbolic.row_idx();
        for col in 0..ncols {
            for idx in col_ptr[col]..col_ptr[col + 1] {
                dense[[row_idx[idx], col]] += weights[idx];
            }
        }
        dense
    }
}

/// Create and configure an [`InterpMatrix`].
///
/// # Default configuration
/// Bilinear interpolation ([`Method::Linear`]), bicubic walls are extrapolated,
/// columns use [`IndexOrder::RowMajor`] and large batches are processed in parallel.
#[derive(Debug)]
pub struct InterpMatrixBuilder {
    grid: RefGrid,
    method: Method,
    boundary: Option<BoundaryConditions>,
    order: IndexOrder,
    parallel: bool,
}

impl InterpMatrixBuilder {
    pub fn new(grid: RefGrid) -> Self {
        InterpMatrixBuilder {
            grid,
            method: Method::default(),
            boundary: None,
            order: IndexOrder::default(),
            parallel: true,
        }
    }

    /// Set the interpolation method, default is [`Method::Linear`]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Redirect bicubic stencil points past the grid, see [`BoundaryConditions`].
    /// Only used by [`Method::Cubic`].
    pub fn boundary_conditions(mut self, conditions: BoundaryConditions) -> Self {
        self.boundary = Some(conditions);
        self
    }

    /// Set how grid points map to columns, default is [`IndexOrder::RowMajor`]
    pub fn index_order(mut self, order: IndexOrder) -> Self {
        self.order = order;
        self
    }

    /// Allow processing large batches on the rayon thread pool, default is `true`.
    /// The result does not depend on this setting.
    pub fn parallel(mut self, yes: bool) -> Self {
        self.parallel = yes;
        self
    }

    /// Compute the operator for the query points `(xq, yq)`.
    ///
    /// The query arrays can have any shape, they are flattened in logical order
    /// and need the same number of elements.
    pub fn build<Sx, Sy, Dx, Dy>(
        self,
        xq: &ArrayBase<Sx, Dx>,
        yq: &ArrayBase<Sy, Dy>,
    ) -> Result<InterpMatrix, BuilderError>
    where
        Sx: Data<Elem = f64>,
        Sy: Data<Elem = f64>,
        Dx: Dimension,
        Dy: Dimension,
    {
        if xq.len() != yq.len() {
            return Err(BuilderError::DimensionMismatch(format!(
                "query arrays need the same number of elements. Got x: {}, y: {}",
                xq.len(),
                yq.len()
            )));
        }
        let xq: Vec<f64> = xq.iter().copied().collect();
        let yq: Vec<f64> = yq.iter().copied().collect();

        match self.method {
            Method::Nearest => self.build_with(&Nearest, &xq, &yq),
            Method::Linear => self.build_with(&Bilinear, &xq, &yq),
            Method::Cubic => self.build_with(&Bicubic, &xq, &yq),
        }
    }

    fn build_with<S: StencilStrategy>(
        self,
        strategy: &S,
        xq: &[f64],
        yq: &[f64],
    ) -> Result<InterpMatrix, BuilderError> {
        let (nx, ny) = (self.grid.nx(), self.grid.ny());
        if nx < S::MINIMUM_DATA_LENGTH || ny < S::MINIMUM_DATA_LENGTH {
            return Err(BuilderError::NotEnoughData(format!(
                "{:?} interpolation needs at least {} grid points per axis. Got x: {nx}, y: {ny}",
                self.method,
                S::MINIMUM_DATA_LENGTH
            )));
        }
        if self.boundary.is_some() && !S::NEEDS_BOUNDARY {
            debug!(method = ?self.method, "boundary conditions are not used by this method");
        }

        let cells = locate_all(&self.grid, xq, yq, self.parallel)?;
        let resolver = if S::NEEDS_BOUNDARY {
            Some(BoundaryResolver::new(
                &self.grid,
                self.boundary.as_ref(),
                &cells,
            )?)
        } else {
            None
        };
        let stencils = stencils(strategy, &cells, resolver.as_ref(), self.parallel);
        let triplets = triplets(&stencils, &self.grid, self.order);
        let matrix = assemble(cells.len(), self.grid.n_points(), &triplets)?;

        let out_of_bounds: Vec<usize> = cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.in_bounds)
            .map(|(q, _)| q)
            .collect();
        debug!(
            method = ?self.method,
            queries = cells.len(),
            grid_points = self.grid.n_points(),
            out_of_bounds = out_of_bounds.len(),
            entries = triplets.len(),
            "assembled interpolation matrix"
        );

        let InterpMatrixBuilder {
            grid,
            method,
            order,
            ..
        } = self;
        Ok(InterpMatrix {
            matrix,
            out_of_bounds,
            grid,
            method,
            order,
        })
    }
}

/// Compute an [`InterpMatrix`] in one call.
///
/// - `x`, `y`: the reference grid as axis vectors or coordinate meshes,
///   see [`RefGrid::from_coords`]
/// - `xq`, `yq`: the query points, any shape with the same number of elements
/// - `method`: `"nearest"`, `"linear"` or `"cubic"`
/// - `boundary`: optional redirections for [`Method::Cubic`]
///
/// ```rust
/// # use ndarray::*;
/// # use ndarray_interp_sparse::*;
/// let x = array![0.0, 1.0, 2.0];
/// let y = array![0.0, 1.0, 2.0];
/// let interp = interp2_matrix(&x, &y, &array![-1.0, 0.5], &array![0.0, 0.5], "linear", None).unwrap();
///
/// assert_eq!(interp.out_of_bounds(), &[0]);
/// let dense = interp.to_dense();
/// assert_eq!(dense.row(0).sum(), 0.0);
/// assert_eq!(dense.row(1), array![0.25, 0.25, 0.0, 0.25, 0.25, 0.0, 0.0, 0.0, 0.0]);
/// ```
pub fn interp2_matrix<Sx, Sy, D, Sqx, Sqy, Dqx, Dqy>(
    x: &ArrayBase<Sx, D>,
    y: &ArrayBase<Sy, D>,
    xq: &ArrayBase<Sqx, Dqx>,
    yq: &ArrayBase<Sqy, Dqy>,
    method: &str,
    boundary: Option<BoundaryConditions>,
) -> Result<InterpMatrix, BuilderError>
where
    Sx: Data<Elem = f64>,
    Sy: Data<Elem = f64>,
    D: Dimension,
    Sqx: Data<Elem = f64>,
    Sqy: Data<Elem = f64>,
    Dqx: Dimension,
    Dqy: Dimension,
{
    let method: Method = method.parse()?;
    let grid = RefGrid::from_coords(x, y)?;
    let mut builder = InterpMatrix::builder(grid).method(method);
    if let Some(boundary) = boundary {
        builder = builder.boundary_conditions(boundary);
    }
    builder.build(xq, yq)
}
