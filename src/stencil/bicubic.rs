use num_traits::{cast, Float};

use super::{AxisWeights, StencilStrategy};

/// Bicubic convolution over the 4x4 neighbourhood of the enclosing cell.
///
/// Uses the Keys kernel with `a = -1/2`, which reproduces quadratic data
/// exactly. For cells next to a wall the stencil reaches one point
/// past the grid, see [`boundary`](crate::boundary) for how those points are
/// resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bicubic;

impl StencilStrategy for Bicubic {
    const SIDE: usize = 4;
    const ORIGIN: isize = -1;
    const MINIMUM_DATA_LENGTH: usize = 3;
    const NEEDS_BOUNDARY: bool = true;

    fn axis_weights(&self, t: f64) -> AxisWeights {
        Self::keys_weights(t)
    }
}

impl Bicubic {
    /// Keys convolution weights of the points at offsets `-1, 0, 1, 2`
    pub fn keys_weights<T: Float>(t: T) -> [T; 4] {
        let half: T = cast(0.5).unwrap_or_else(|| unimplemented!());
        let two: T = cast(2.0).unwrap_or_else(|| unimplemented!());
        let three: T = cast(3.0).unwrap_or_else(|| unimplemented!());
        let four: T = cast(4.0).unwrap_or_else(|| unimplemented!());
        let five: T = cast(5.0).unwrap_or_else(|| unimplemented!());

        let t2 = t * t;
        let tb = t - T::one();
        [
            -tb * tb * t * half,
            (three * t * t2 - five * t2 + two) * half,
            (-three * t * t2 + four * t2 + t) * half,
            t2 * tb * half,
        ]
    }
}
