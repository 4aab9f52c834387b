//! Local interpolation stencils
//!
//! # Strategies
//!  - [`Nearest`] nearest neighbour, 2x2 stencil
//!  - [`Bilinear`] bilinear interpolation, 2x2 stencil
//!  - [`Bicubic`] bicubic convolution, 4x4 stencil
//!
//! All strategies are tensor products: the weight of the stencil slot `(a, b)`
//! is `wx[a] * wy[b]` where `wx` and `wy` are the per axis weights
//! returned by [`StencilStrategy::axis_weights`].

use std::{fmt::Debug, str::FromStr};

use crate::{locate::QueryCell, BuilderError};

mod bicubic;
mod bilinear;
mod nearest;

pub use bicubic::Bicubic;
pub use bilinear::Bilinear;
pub use nearest::Nearest;

/// number of stencil slots of the largest stencil
pub const MAX_STENCIL_LEN: usize = 16;

/// Per axis stencil weights, only the first `SIDE` values are used.
pub type AxisWeights = [f64; 4];

pub trait StencilStrategy: Debug + Sync {
    /// number of stencil points along each axis
    const SIDE: usize;
    /// offset of the first stencil point relative to the lower left index
    const ORIGIN: isize;
    /// minimum number of grid points along each axis
    const MINIMUM_DATA_LENGTH: usize;
    /// does the stencil reach outside the grid for cells next to a wall
    const NEEDS_BOUNDARY: bool;

    /// The weights along one axis for the cell relative coordinate `t`.
    ///
    /// When called by [`StencilStrategy::stencil`] `t` is in `[0, 1]`.
    fn axis_weights(&self, t: f64) -> AxisWeights;

    /// The full stencil of the query located in `cell`.
    ///
    /// Queries outside the grid get a stencil of the right size
    /// with all weights set to zero.
    fn stencil(&self, cell: &QueryCell) -> Stencil {
        let mut stencil = Stencil::new(Self::SIDE, cell.i, cell.j, Self::ORIGIN);
        if !cell.in_bounds {
            return stencil;
        }
        let wx = self.axis_weights(cell.x);
        let wy = self.axis_weights(cell.y);
        for a in 0..Self::SIDE {
            for b in 0..Self::SIDE {
                *stencil.weight_mut(a, b) = wx[a] * wy[b];
            }
        }
        stencil
    }
}

/// The weights and global grid coordinates of one query.
///
/// Slot `(a, b)` is stored at `a * side + b`. Coordinates are signed
/// because stencils near a wall can reach one point past the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    side: usize,
    weights: [f64; MAX_STENCIL_LEN],
    ix: [isize; MAX_STENCIL_LEN],
    iy: [isize; MAX_STENCIL_LEN],
}

impl Stencil {
    /// A zero weight stencil of `side x side` points whose first point is
    /// at `(i + origin, j + origin)`.
    pub fn new(side: usize, i: usize, j: usize, origin: isize) -> Self {
        debug_assert!(side * side <= MAX_STENCIL_LEN);
        let mut ix = [0; MAX_STENCIL_LEN];
        let mut iy = [0; MAX_STENCIL_LEN];
        for a in 0..side {
            for b in 0..side {
                ix[a * side + b] = i as isize + origin + a as isize;
                iy[a * side + b] = j as isize + origin + b as isize;
            }
        }
        Stencil {
            side,
            weights: [0.0; MAX_STENCIL_LEN],
            ix,
            iy,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn len(&self) -> usize {
        self.side * self.side
    }

    pub fn is_empty(&self) -> bool {
        self.side == 0
    }

    pub fn weight(&self, a: usize, b: usize) -> f64 {
        self.weights[a * self.side + b]
    }

    pub fn weight_mut(&mut self, a: usize, b: usize) -> &mut f64 {
        &mut self.weights[a * self.side + b]
    }

    /// global `(x, y)` grid coordinates of slot `(a, b)`
    pub fn point(&self, a: usize, b: usize) -> (isize, isize) {
        let slot = a * self.side + b;
        (self.ix[slot], self.iy[slot])
    }

    pub fn set_point(&mut self, a: usize, b: usize, (ix, iy): (isize, isize)) {
        let slot = a * self.side + b;
        self.ix[slot] = ix;
        self.iy[slot] = iy;
    }

    /// iterate over `(ix, iy, weight)` of all slots
    pub fn iter(&self) -> impl Iterator<Item = (isize, isize, f64)> + '_ {
        (0..self.len()).map(move |slot| (self.ix[slot], self.iy[slot], self.weights[slot]))
    }

    /// sum of all weights
    pub fn total_weight(&self) -> f64 {
        self.weights[..self.len()].iter().sum()
    }
}

/// The interpolation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    Nearest,
    #[default]
    Linear,
    Cubic,
}

impl Method {
    /// number of stencil slots per query
    pub fn stencil_len(self) -> usize {
        match self {
            Method::Nearest => Nearest::SIDE * Nearest::SIDE,
            Method::Linear => Bilinear::SIDE * Bilinear::SIDE,
            Method::Cubic => Bicubic::SIDE * Bicubic::SIDE,
        }
    }

    /// minimum number of grid points along each axis
    pub fn minimum_data_length(self) -> usize {
        match self {
            Method::Nearest => Nearest::MINIMUM_DATA_LENGTH,
            Method::Linear => Bilinear::MINIMUM_DATA_LENGTH,
            Method::Cubic => Bicubic::MINIMUM_DATA_LENGTH,
        }
    }
}

impl FromStr for Method {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Method::Nearest),
            "linear" | "bilinear" => Ok(Method::Linear),
            "cubic" | "bicubic" => Ok(Method::Cubic),
            other => Err(BuilderError::InvalidMethod(format!(
                "expected one of `nearest`, `linear`, `cubic`, got `{other}`"
            ))),
        }
    }
}
