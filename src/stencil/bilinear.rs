use num_traits::Float;

use super::{AxisWeights, StencilStrategy};

/// Bilinear interpolation over the four corners of the enclosing cell
#[derive(Debug, Clone, Copy, Default)]
pub struct Bilinear;

impl StencilStrategy for Bilinear {
    const SIDE: usize = 2;
    const ORIGIN: isize = 0;
    const MINIMUM_DATA_LENGTH: usize = 2;
    const NEEDS_BOUNDARY: bool = false;

    fn axis_weights(&self, t: f64) -> AxisWeights {
        let [w0, w1] = Self::calc_frac(t);
        [w0, w1, 0.0, 0.0]
    }
}

impl Bilinear {
    /// weights of the lower and upper point at the relative coordinate `t`
    pub(crate) fn calc_frac<T: Float>(t: T) -> [T; 2] {
        [T::one() - t, t]
    }
}
