//! Direct (non-matrix) interpolation used as the reference in the integration tests
#![allow(dead_code)]

use ndarray::{Array, Array1, Array2};
use rand::{distr::Uniform, rngs::StdRng, Rng, SeedableRng};

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn rand_field(nx: usize, ny: usize, seed: u64) -> Array2<f64> {
    let values: Vec<f64> = rng(seed)
        .sample_iter(Uniform::new_inclusive(-1.0, 1.0).unwrap())
        .take(nx * ny)
        .collect();
    Array::from_shape_vec((nx, ny), values).unwrap()
}

/// random points inside `[lo, hi]`
pub fn rand_queries(len: usize, lo: f64, hi: f64, seed: u64) -> Array1<f64> {
    Array::from_iter(
        rng(seed)
            .sample_iter(Uniform::new_inclusive(lo, hi).unwrap())
            .take(len),
    )
}

/// lower index and cell relative coordinate, the upper edge belongs to the last cell
pub fn cell(axis: &Array1<f64>, q: f64) -> (usize, f64) {
    let d = axis[1] - axis[0];
    let n = axis.len();
    let i = (((q - axis[0]) / d).floor() as usize).min(n - 2);
    (i, (q - axis[i]) / d)
}

pub fn bilinear(x: &Array1<f64>, y: &Array1<f64>, field: &Array2<f64>, xq: f64, yq: f64) -> f64 {
    let (i, t) = cell(x, xq);
    let (j, u) = cell(y, yq);
    let low = field[[i, j]] * (1.0 - t) + field[[i + 1, j]] * t;
    let high = field[[i, j + 1]] * (1.0 - t) + field[[i + 1, j + 1]] * t;
    low * (1.0 - u) + high * u
}

pub fn nearest(x: &Array1<f64>, y: &Array1<f64>, field: &Array2<f64>, xq: f64, yq: f64) -> f64 {
    let (i, t) = cell(x, xq);
    let (j, u) = cell(y, yq);
    field[[i + t.round() as usize, j + u.round() as usize]]
}

/// Keys cubic convolution kernel with `a = -1/2`
pub fn keys(s: f64) -> f64 {
    let s = s.abs();
    if s <= 1.0 {
        1.5 * s.powi(3) - 2.5 * s.powi(2) + 1.0
    } else if s < 2.0 {
        -0.5 * s.powi(3) + 2.5 * s.powi(2) - 4.0 * s + 2.0
    } else {
        0.0
    }
}

/// How the ghost points one step past the grid are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ghost {
    Extrapolate,
    Periodic,
    Mirror,
}

/// The field with one ghost point on each side of both axes.
/// `padded[[i + 1, j + 1]] == field[[i, j]]`.
///
/// Redirected ghosts are filled before extrapolated ones, and the second
/// axis is padded over the full range of the first.
pub fn padded(field: &Array2<f64>, x_ghost: Ghost, y_ghost: Ghost) -> Array2<f64> {
    let (nx, ny) = field.dim();
    let mut p = Array2::zeros((nx + 2, ny + 2));
    for i in 0..nx {
        for j in 0..ny {
            p[[i + 1, j + 1]] = field[[i, j]];
        }
    }
    let x_first = !(x_ghost == Ghost::Extrapolate && y_ghost != Ghost::Extrapolate);
    if x_first {
        pad_x(&mut p, x_ghost, 1..ny + 1);
        pad_y(&mut p, y_ghost, 0..nx + 2);
    } else {
        pad_y(&mut p, y_ghost, 1..nx + 1);
        pad_x(&mut p, x_ghost, 0..ny + 2);
    }
    p
}

fn ghost_values(inner: [f64; 3], far: f64, ghost: Ghost) -> f64 {
    // inner: nearest three points, far: the point on the opposite side
    match ghost {
        Ghost::Extrapolate => 2.5 * inner[0] - 2.0 * inner[1] + 0.5 * inner[2],
        Ghost::Periodic => far,
        Ghost::Mirror => inner[1],
    }
}

fn pad_x(p: &mut Array2<f64>, ghost: Ghost, range: std::ops::Range<usize>) {
    let n = p.nrows() - 2;
    for j in range {
        p[[0, j]] = ghost_values([p[[1, j]], p[[2, j]], p[[3, j]]], p[[n, j]], ghost);
        p[[n + 1, j]] = ghost_values([p[[n, j]], p[[n - 1, j]], p[[n - 2, j]]], p[[1, j]], ghost);
    }
}

fn pad_y(p: &mut Array2<f64>, ghost: Ghost, range: std::ops::Range<usize>) {
    let n = p.ncols() - 2;
    for i in range {
        p[[i, 0]] = ghost_values([p[[i, 1]], p[[i, 2]], p[[i, 3]]], p[[i, n]], ghost);
        p[[i, n + 1]] = ghost_values([p[[i, n]], p[[i, n - 1]], p[[i, n - 2]]], p[[i, 1]], ghost);
    }
}

/// Bicubic convolution on a padded field, valid for every query inside the grid
pub fn bicubic(x: &Array1<f64>, y: &Array1<f64>, padded: &Array2<f64>, xq: f64, yq: f64) -> f64 {
    let (i, t) = cell(x, xq);
    let (j, u) = cell(y, yq);
    let mut value = 0.0;
    for a in 0..4 {
        for b in 0..4 {
            let wx = keys(t - (a as f64 - 1.0));
            let wy = keys(u - (b as f64 - 1.0));
            // padded index of grid index i - 1 + a is i + a
            value += wx * wy * padded[[i + a, j + b]];
        }
    }
    value
}
