//! Per query stencil evaluation and sparse matrix assembly
//!
//! Every query is handled independently of all others, so the
//! per query stages run on the rayon thread pool for large batches.
//! Results are always collected in query order, which keeps the assembled
//! operator bit-identical to a sequential run.

use faer::sparse::{SparseColMat, Triplet};
use rayon::prelude::*;

use crate::{
    boundary::BoundaryResolver,
    grid::{IndexOrder, RefGrid},
    locate::{locate, QueryCell},
    stencil::{Stencil, StencilStrategy},
    BuilderError,
};

/// Batches smaller than this are always processed on the calling thread.
pub const PAR_THRESHOLD: usize = 4096;

fn map_queries<T, F>(len: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel && len >= PAR_THRESHOLD {
        (0..len).into_par_iter().map(f).collect()
    } else {
        (0..len).map(f).collect()
    }
}

/// Locate all queries, `xq` and `yq` need the same length.
pub fn locate_all(
    grid: &RefGrid,
    xq: &[f64],
    yq: &[f64],
    parallel: bool,
) -> Result<Vec<QueryCell>, BuilderError> {
    if xq.len() != yq.len() {
        return Err(BuilderError::DimensionMismatch(format!(
            "query coordinates need the same length. Got x: {}, y: {}",
            xq.len(),
            yq.len()
        )));
    }
    Ok(map_queries(xq.len(), parallel, |q| locate(grid, xq[q], yq[q])))
}

/// Compute the stencil of every located query.
///
/// When a `resolver` is given, points past the grid are resolved
/// with the wall policies it holds.
pub fn stencils<S: StencilStrategy>(
    strategy: &S,
    cells: &[QueryCell],
    resolver: Option<&BoundaryResolver<'_>>,
    parallel: bool,
) -> Vec<Stencil> {
    map_queries(cells.len(), parallel, |q| {
        let cell = &cells[q];
        let mut stencil = strategy.stencil(cell);
        if let Some(resolver) = resolver {
            resolver.resolve(&mut stencil, cell);
        }
        stencil
    })
}

/// Convert stencils into `(row, column, value)` triplets.
///
/// Row `q` belongs to `stencils[q]`. Coordinates are clamped into the grid
/// before they are mapped to a column with `order`. Slots with a weight of
/// exactly zero are skipped, so queries outside the grid produce no triplets.
pub fn triplets(
    stencils: &[Stencil],
    grid: &RefGrid,
    order: IndexOrder,
) -> Vec<Triplet<usize, usize, f64>> {
    let (nx, ny) = (grid.nx(), grid.ny());
    let mut triplets = Vec::with_capacity(stencils.iter().map(Stencil::len).sum());
    for (row, stencil) in stencils.iter().enumerate() {
        for (ix, iy, weight) in stencil.iter() {
            if weight == 0.0 {
                continue;
            }
            let i = ix.clamp(0, nx as isize - 1) as usize;
            let j = iy.clamp(0, ny as isize - 1) as usize;
            triplets.push(Triplet::new(row, order.linear_index(i, j, nx, ny), weight));
        }
    }
    triplets
}

/// Build the `(nrows, ncols)` operator, duplicate entries are summed.
pub fn assemble(
    nrows: usize,
    ncols: usize,
    triplets: &[Triplet<usize, usize, f64>],
) -> Result<SparseColMat<usize, f64>, BuilderError> {
    SparseColMat::try_new_from_triplets(nrows, ncols, triplets)
        .map_err(|err| BuilderError::SparseCreation(format!("{err:?}")))
}
