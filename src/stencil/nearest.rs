use super::{AxisWeights, Bilinear, StencilStrategy};

/// Nearest neighbour interpolation.
///
/// The cell relative coordinates are rounded to `0` or `1` before the
/// bilinear weights are computed, so exactly one corner gets the weight `1`.
/// Ties are rounded away from zero: a query in the middle of two grid points
/// takes the upper one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nearest;

impl StencilStrategy for Nearest {
    const SIDE: usize = 2;
    const ORIGIN: isize = 0;
    const MINIMUM_DATA_LENGTH: usize = 2;
    const NEEDS_BOUNDARY: bool = false;

    fn axis_weights(&self, t: f64) -> AxisWeights {
        let [w0, w1] = Bilinear::calc_frac(t.round());
        [w0, w1, 0.0, 0.0]
    }
}
