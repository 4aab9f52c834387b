//! Binning of query points into reference cells

use crate::{grid::RefGrid, vector_extensions::VectorExtensions};

/// The reference cell enclosing one query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryCell {
    /// lower left x index, always in `0..nx - 1`
    pub i: usize,
    /// lower left y index, always in `0..ny - 1`
    pub j: usize,
    /// cell relative x coordinate, in `[0, 1]` for queries inside the grid
    pub x: f64,
    /// cell relative y coordinate, in `[0, 1]` for queries inside the grid
    pub y: f64,
    pub in_bounds: bool,
}

impl QueryCell {
    /// The cell of a query outside the grid.
    ///
    /// It still points at a valid cell, so every per query array stays aligned,
    /// but it never contributes any weight.
    pub const OUT_OF_BOUNDS: QueryCell = QueryCell {
        i: 0,
        j: 0,
        x: 0.0,
        y: 0.0,
        in_bounds: false,
    };
}

/// Find the cell of the query point `(xq, yq)`.
///
/// A query exactly on the upper edge of an axis belongs to the last cell
/// with a relative coordinate of `1.0`. Queries outside the grid (including `NaN`)
/// are reported as [`QueryCell::OUT_OF_BOUNDS`].
pub fn locate(grid: &RefGrid, xq: f64, yq: f64) -> QueryCell {
    if !grid.is_in_x_range(xq) || !grid.is_in_y_range(yq) {
        return QueryCell::OUT_OF_BOUNDS;
    }
    let i = grid.x().get_lower_index(xq);
    let j = grid.y().get_lower_index(yq);
    QueryCell {
        i,
        j,
        x: (xq - grid.x()[i]) / grid.dx(),
        y: (yq - grid.y()[j]) / grid.dy(),
        in_bounds: true,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::{locate, QueryCell};
    use crate::grid::RefGrid;

    fn grid() -> RefGrid {
        RefGrid::from_vectors(array![0.0, 1.0, 2.0, 3.0], array![-1.0, 1.0, 3.0]).unwrap()
    }

    #[test]
    fn inside() {
        let cell = locate(&grid(), 1.25, 2.0);
        assert_eq!((cell.i, cell.j), (1, 1));
        assert!(cell.in_bounds);
        assert_abs_diff_eq!(cell.x, 0.25, epsilon = f64::EPSILON);
        assert_abs_diff_eq!(cell.y, 0.5, epsilon = f64::EPSILON);
    }

    #[test]
    fn edges() {
        let cell = locate(&grid(), 0.0, -1.0);
        assert_eq!((cell.i, cell.j, cell.x, cell.y), (0, 0, 0.0, 0.0));
        assert!(cell.in_bounds);

        let cell = locate(&grid(), 3.0, 3.0);
        assert_eq!((cell.i, cell.j, cell.x, cell.y), (2, 1, 1.0, 1.0));
        assert!(cell.in_bounds);
    }

    #[test]
    fn outside() {
        assert_eq!(locate(&grid(), -0.1, 0.0), QueryCell::OUT_OF_BOUNDS);
        assert_eq!(locate(&grid(), 0.0, 3.5), QueryCell::OUT_OF_BOUNDS);
        assert_eq!(locate(&grid(), f64::NAN, 0.0), QueryCell::OUT_OF_BOUNDS);
    }
}
