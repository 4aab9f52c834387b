//! Boundary treatment for stencils reaching past the grid
//!
//! A bicubic stencil of a cell next to a wall needs one point outside the
//! grid on that axis. For each of the four walls one [`WallPolicy`] decides
//! what happens to that point:
//!
//!  - [`WallPolicy::Extrapolate`] (default) replaces the missing sample `f0`
//!    by the one sided estimate `2.5 f1 - 2.0 f2 + 0.5 f3` of the three nearest
//!    samples, i.e. the weight of the missing point is redistributed onto
//!    those points with the coefficients in [`EXTRAPOLATION`].
//!  - [`WallPolicy::Redirect`] moves the missing point to an explicit grid
//!    point taken from caller supplied [`BoundaryConditions`]. This can express
//!    periodic or mirrored boundaries.
//!
//! Walls are applied in the order bottom, top, left, right.
//! Redirection rewrites the points of the slots that are still past its wall.
//! Extrapolation works on the outermost row or column of stencil slots, no
//! matter where an earlier wall moved their points. At a corner this means:
//!
//!  - two extrapolating walls commute
//!  - of two redirecting walls the first one moves the corner point, the
//!    second one finds it inside the grid and leaves it alone
//!  - an extrapolating wall always takes the corner weight. If it comes first
//!    the weight is moved onto slots the redirecting wall rewrites later, if it
//!    comes second the weight leaves the already redirected corner point and
//!    lands on its neighbours, which the redirecting wall has rewritten too.
//!
//! Either way a mixed corner gives the same result as extrapolating a field
//! that was first padded by the redirecting wall.

use ndarray::{Array2, ArrayView1};
use tracing::debug;

use crate::{grid::RefGrid, locate::QueryCell, stencil::Stencil, BuilderError};

/// Redistribution coefficients for the weight of a missing point,
/// ordered from the nearest to the farthest of the three points next to it.
pub const EXTRAPOLATION: [f64; 3] = [2.5, -2.0, 0.5];

/// The four walls of the grid.
///
/// The discriminant is the column of the wall in the [`BoundaryConditions`] tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    /// lowest y index
    Bottom = 0,
    /// highest y index
    Top = 1,
    /// lowest x index
    Left = 2,
    /// highest x index
    Right = 3,
}

impl Wall {
    /// all walls in the order they are applied
    pub const ALL: [Wall; 4] = [Wall::Bottom, Wall::Top, Wall::Left, Wall::Right];

    pub fn column(self) -> usize {
        self as usize
    }

    /// does a query in `cell` need a point past this wall
    pub fn is_touched_by(self, cell: &QueryCell, grid: &RefGrid) -> bool {
        cell.in_bounds
            && match self {
                Wall::Bottom => cell.j == 0,
                Wall::Top => cell.j == grid.ny() - 2,
                Wall::Left => cell.i == 0,
                Wall::Right => cell.i == grid.nx() - 2,
            }
    }

    /// number of grid points along the wall
    fn len(self, grid: &RefGrid) -> usize {
        match self {
            Wall::Bottom | Wall::Top => grid.nx(),
            Wall::Left | Wall::Right => grid.ny(),
        }
    }
}

/// What happens to stencil points past a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallPolicy {
    Extrapolate,
    Redirect,
}

/// Caller supplied redirections for points past the grid.
///
/// Two integer tables of shape `(rows, 4)`, one holding x indices and one
/// holding y indices. Column `w` belongs to the wall with [`Wall::column`] `w`.
/// Row `r` holds the target of the missing point at position `r` along the wall:
/// the x index for the bottom and top wall, the y index for the left and right wall.
///
/// Target indices are **1-based**. A column pair containing only zeros
/// means "no redirection for this wall", the wall is extrapolated instead.
/// A wall with any nonzero entry needs valid targets in every row along the wall.
///
/// A corner point past two redirecting walls is looked up by the first wall
/// (bottom before top before left before right) in the row of the nearest
/// position along that wall. With periodic tables in both directions the point
/// `(-1, -1)` therefore goes to the bottom wall's row `0` target, `(0, ny - 1)`,
/// and not to the opposite corner.
///
/// ```rust
/// # use ndarray::*;
/// # use ndarray_interp_sparse::*;
/// // periodic in x on a grid with nx = 5: the point left of x index 1
/// // is x index 5 and the point right of x index 5 is x index 1
/// let ny = 4;
/// let mut i_table = Array2::zeros((ny, 4));
/// let mut j_table = Array2::zeros((ny, 4));
/// for row in 0..ny {
///     i_table[[row, Wall::Left.column()]] = 5;
///     i_table[[row, Wall::Right.column()]] = 1;
///     j_table[[row, Wall::Left.column()]] = row as i64 + 1;
///     j_table[[row, Wall::Right.column()]] = row as i64 + 1;
/// }
/// let bc = BoundaryConditions::new(i_table, j_table).unwrap();
/// assert!(bc.is_active(Wall::Left));
/// assert!(!bc.is_active(Wall::Bottom));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryConditions {
    i: Array2<i64>,
    j: Array2<i64>,
}

impl BoundaryConditions {
    pub fn new(i: Array2<i64>, j: Array2<i64>) -> Result<Self, BuilderError> {
        if i.ncols() != 4 || j.ncols() != 4 {
            return Err(BuilderError::MalformedBoundaryConditions(format!(
                "boundary tables need 4 columns (bottom, top, left, right). Got i: {}, j: {}",
                i.ncols(),
                j.ncols()
            )));
        }
        if i.shape() != j.shape() {
            return Err(BuilderError::MalformedBoundaryConditions(format!(
                "boundary tables need the same shape. Got i: {:?}, j: {:?}",
                i.shape(),
                j.shape()
            )));
        }
        Ok(BoundaryConditions { i, j })
    }

    /// Build the tables from the 1-based targets of each wall.
    ///
    /// `targets(wall, r)` returns the `(i, j)` target of the point at
    /// position `r` along `wall`, or `None` to leave the wall extrapolated.
    pub fn from_fn<F>(grid: &RefGrid, mut targets: F) -> Self
    where
        F: FnMut(Wall, usize) -> Option<(i64, i64)>,
    {
        let rows = grid.nx().max(grid.ny());
        let mut i = Array2::zeros((rows, 4));
        let mut j = Array2::zeros((rows, 4));
        for wall in Wall::ALL {
            for r in 0..wall.len(grid) {
                if let Some((ti, tj)) = targets(wall, r) {
                    i[[r, wall.column()]] = ti;
                    j[[r, wall.column()]] = tj;
                }
            }
        }
        BoundaryConditions { i, j }
    }

    /// does the table request redirection for `wall`
    pub fn is_active(&self, wall: Wall) -> bool {
        let col = wall.column();
        self.i.column(col).iter().any(|&v| v != 0) || self.j.column(col).iter().any(|&v| v != 0)
    }

    fn targets(&self, wall: Wall) -> (ArrayView1<'_, i64>, ArrayView1<'_, i64>) {
        (self.i.column(wall.column()), self.j.column(wall.column()))
    }

    fn validate(&self, wall: Wall, grid: &RefGrid) -> Result<(), BuilderError> {
        let len = wall.len(grid);
        if self.i.nrows() < len {
            return Err(BuilderError::MalformedBoundaryConditions(format!(
                "{wall:?} wall is active and needs {len} rows, got {}",
                self.i.nrows()
            )));
        }
        let (ti, tj) = self.targets(wall);
        for r in 0..len {
            let (i, j) = (ti[r], tj[r]);
            if i < 1 || i > grid.nx() as i64 || j < 1 || j > grid.ny() as i64 {
                return Err(BuilderError::MalformedBoundaryConditions(format!(
                    "{wall:?} wall, row {r}: target ({i}, {j}) is not inside the grid \
                     (1..={}, 1..={})",
                    grid.nx(),
                    grid.ny()
                )));
            }
        }
        Ok(())
    }
}

/// Applies the resolved wall policies to stencils.
#[derive(Debug)]
pub struct BoundaryResolver<'a> {
    grid: &'a RefGrid,
    policies: [Option<WallPolicy>; 4],
    conditions: Option<&'a BoundaryConditions>,
}

impl<'a> BoundaryResolver<'a> {
    /// Resolve the policy of every wall once for a batch of queries.
    ///
    /// A wall no query touches gets no policy. A touched wall is redirected
    /// when `conditions` has an entry for it, otherwise it is extrapolated.
    /// The tables of redirected walls are validated.
    pub fn new(
        grid: &'a RefGrid,
        conditions: Option<&'a BoundaryConditions>,
        cells: &[QueryCell],
    ) -> Result<Self, BuilderError> {
        let mut policies = [None; 4];
        for wall in Wall::ALL {
            if !cells.iter().any(|cell| wall.is_touched_by(cell, grid)) {
                continue;
            }
            let policy = match conditions {
                Some(bc) if bc.is_active(wall) => {
                    bc.validate(wall, grid)?;
                    WallPolicy::Redirect
                }
                _ => WallPolicy::Extrapolate,
            };
            debug!(?wall, ?policy, "resolved wall policy");
            policies[wall.column()] = Some(policy);
        }

        Ok(BoundaryResolver {
            grid,
            policies,
            conditions,
        })
    }

    /// the policy of `wall`, `None` if no query touches it
    pub fn policy(&self, wall: Wall) -> Option<WallPolicy> {
        self.policies[wall.column()]
    }

    /// Resolve all points of a 4x4 stencil that lie past a wall.
    pub fn resolve(&self, stencil: &mut Stencil, cell: &QueryCell) {
        if !cell.in_bounds || stencil.side() != 4 {
            return;
        }
        for wall in Wall::ALL {
            if !wall.is_touched_by(cell, self.grid) {
                continue;
            }
            match self.policies[wall.column()] {
                Some(WallPolicy::Extrapolate) => extrapolate(stencil, wall),
                Some(WallPolicy::Redirect) => self.redirect(stencil, wall),
                None => {}
            }
        }
    }

    fn redirect(&self, stencil: &mut Stencil, wall: Wall) {
        let Some(conditions) = self.conditions else {
            return;
        };
        let (ti, tj) = conditions.targets(wall);
        let (nx, ny) = (self.grid.nx() as isize, self.grid.ny() as isize);
        for a in 0..4 {
            for b in 0..4 {
                let (ix, iy) = stencil.point(a, b);
                let along = match wall {
                    Wall::Bottom if iy == -1 => ix.clamp(0, nx - 1),
                    Wall::Top if iy == ny => ix.clamp(0, nx - 1),
                    Wall::Left if ix == -1 => iy.clamp(0, ny - 1),
                    Wall::Right if ix == nx => iy.clamp(0, ny - 1),
                    _ => continue,
                };
                // tables are 1-based
                let along = along as usize;
                let target = (ti[along] as isize - 1, tj[along] as isize - 1);
                stencil.set_point(a, b, target);
            }
        }
    }
}

/// Move the weight of the points past `wall` onto the three points next to them.
pub fn extrapolate(stencil: &mut Stencil, wall: Wall) {
    // (missing slot, nearest three slots) along the axis normal to the wall
    let (missing, inner) = match wall {
        Wall::Bottom | Wall::Left => (0, [1, 2, 3]),
        Wall::Top | Wall::Right => (3, [2, 1, 0]),
    };
    for k in 0..4 {
        let slot = |s: usize| match wall {
            Wall::Bottom | Wall::Top => (k, s),
            Wall::Left | Wall::Right => (s, k),
        };
        let (a, b) = slot(missing);
        let w = stencil.weight(a, b);
        if w == 0.0 {
            continue;
        }
        for (coef, s) in EXTRAPOLATION.iter().zip(inner) {
            let (a, b) = slot(s);
            *stencil.weight_mut(a, b) += coef * w;
        }
        let (a, b) = slot(missing);
        *stencil.weight_mut(a, b) = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{Array, Array2};

    use super::{extrapolate, BoundaryConditions, BoundaryResolver, Wall, WallPolicy};
    use crate::{
        grid::RefGrid,
        locate::locate,
        stencil::{Bicubic, StencilStrategy},
        BuilderError,
    };

    fn grid() -> RefGrid {
        RefGrid::from_vectors(Array::linspace(0.0, 4.0, 5), Array::linspace(0.0, 3.0, 4)).unwrap()
    }

    #[test]
    fn extrapolate_bottom() {
        let grid = grid();
        let cell = locate(&grid, 1.3, 0.4);
        let mut stencil = Bicubic.stencil(&cell);
        let original = stencil;
        extrapolate(&mut stencil, Wall::Bottom);
        for a in 0..4 {
            let w0 = original.weight(a, 0);
            assert_eq!(stencil.weight(a, 0), 0.0);
            assert_abs_diff_eq!(stencil.weight(a, 1), original.weight(a, 1) + 2.5 * w0, epsilon = 1e-15);
            assert_abs_diff_eq!(stencil.weight(a, 2), original.weight(a, 2) - 2.0 * w0, epsilon = 1e-15);
            assert_abs_diff_eq!(stencil.weight(a, 3), original.weight(a, 3) + 0.5 * w0, epsilon = 1e-15);
        }
        assert_abs_diff_eq!(stencil.total_weight(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn extrapolate_right() {
        let grid = grid();
        let cell = locate(&grid, 3.6, 1.5);
        let mut stencil = Bicubic.stencil(&cell);
        let original = stencil;
        extrapolate(&mut stencil, Wall::Right);
        for b in 0..4 {
            let w3 = original.weight(3, b);
            assert_eq!(stencil.weight(3, b), 0.0);
            assert_abs_diff_eq!(stencil.weight(2, b), original.weight(2, b) + 2.5 * w3, epsilon = 1e-15);
            assert_abs_diff_eq!(stencil.weight(1, b), original.weight(1, b) - 2.0 * w3, epsilon = 1e-15);
            assert_abs_diff_eq!(stencil.weight(0, b), original.weight(0, b) + 0.5 * w3, epsilon = 1e-15);
        }
    }

    #[test]
    fn extrapolating_walls_commute() {
        let grid = grid();
        let cell = locate(&grid, 0.3, 0.8);
        let mut first = Bicubic.stencil(&cell);
        let mut second = first;
        extrapolate(&mut first, Wall::Bottom);
        extrapolate(&mut first, Wall::Left);
        extrapolate(&mut second, Wall::Left);
        extrapolate(&mut second, Wall::Bottom);
        for a in 0..4 {
            for b in 0..4 {
                assert_abs_diff_eq!(first.weight(a, b), second.weight(a, b), epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn policies() {
        let grid = grid();
        let cells = [locate(&grid, 0.5, 1.5), locate(&grid, 2.5, 1.5)];
        let bc = BoundaryConditions::from_fn(&grid, |wall, r| match wall {
            Wall::Left => Some((5, r as i64 + 1)),
            Wall::Top => Some((r as i64 + 1, 1)),
            _ => None,
        });
        let resolver = BoundaryResolver::new(&grid, Some(&bc), &cells).unwrap();
        assert_eq!(resolver.policy(Wall::Left), Some(WallPolicy::Redirect));
        // active in the table, but no query needs it
        assert_eq!(resolver.policy(Wall::Top), None);
        assert_eq!(resolver.policy(Wall::Right), None);
        assert_eq!(resolver.policy(Wall::Bottom), None);

        let resolver = BoundaryResolver::new(&grid, None, &cells).unwrap();
        assert_eq!(resolver.policy(Wall::Left), Some(WallPolicy::Extrapolate));
    }

    #[test]
    fn redirect_left() {
        let grid = grid();
        let cell = locate(&grid, 0.5, 1.5);
        let bc = BoundaryConditions::from_fn(&grid, |wall, r| match wall {
            Wall::Left => Some((5, r as i64 + 1)),
            _ => None,
        });
        let resolver = BoundaryResolver::new(&grid, Some(&bc), &[cell]).unwrap();
        let mut stencil = Bicubic.stencil(&cell);
        let original = stencil;
        resolver.resolve(&mut stencil, &cell);
        for b in 0..4 {
            let (_, iy) = original.point(0, b);
            assert_eq!(stencil.point(0, b), (4, iy));
            assert_eq!(stencil.weight(0, b), original.weight(0, b));
        }
    }

    #[test]
    fn resolve_only_touched_walls() {
        let grid = grid();
        let resolver = BoundaryResolver::new(
            &grid,
            None,
            &[locate(&grid, 0.1, 0.1), locate(&grid, 3.9, 2.9)],
        )
        .unwrap();
        for &(x, y) in &[(0.2, 0.3), (1.5, 1.5), (3.7, 2.2), (2.5, 0.5), (0.5, 2.5)] {
            let cell = locate(&grid, x, y);
            let mut stencil = Bicubic.stencil(&cell);
            let original = stencil;
            resolver.resolve(&mut stencil, &cell);
            let touched = Wall::ALL.iter().any(|wall| wall.is_touched_by(&cell, &grid));
            assert_eq!(stencil == original, !touched);
            for (ix, iy, w) in stencil.iter() {
                if w != 0.0 {
                    assert!((0..5).contains(&ix) && (0..4).contains(&iy));
                }
            }
            assert_abs_diff_eq!(stencil.total_weight(), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            BoundaryConditions::new(Array2::zeros((4, 3)), Array2::zeros((4, 3))),
            Err(BuilderError::MalformedBoundaryConditions(_))
        ));
        assert!(matches!(
            BoundaryConditions::new(Array2::zeros((4, 4)), Array2::zeros((5, 4))),
            Err(BuilderError::MalformedBoundaryConditions(_))
        ));

        let grid = grid();
        let cells = [locate(&grid, 1.5, 0.5)];
        // bottom wall active, but row 2 has no target
        let bc = BoundaryConditions::from_fn(&grid, |wall, r| match (wall, r) {
            (Wall::Bottom, 2) => None,
            (Wall::Bottom, r) => Some((r as i64 + 1, 4)),
            _ => None,
        });
        assert!(matches!(
            BoundaryResolver::new(&grid, Some(&bc), &cells),
            Err(BuilderError::MalformedBoundaryConditions(_))
        ));
        // target outside the grid
        let bc = BoundaryConditions::from_fn(&grid, |wall, r| match wall {
            Wall::Bottom => Some((r as i64 + 1, 9)),
            _ => None,
        });
        assert!(matches!(
            BoundaryResolver::new(&grid, Some(&bc), &cells),
            Err(BuilderError::MalformedBoundaryConditions(_))
        ));
    }
}
