//! This module contains the vector extensions trait

use ndarray::{ArrayBase, Data, Ix1};
use num_traits::{cast, Float};

pub trait VectorExtensions<T> {
    /// get the monotonic property of the vector
    fn monotonic_prop(&self) -> Monotonic;

    /// are the values linearly spaced
    ///
    /// The spacing of every neighbouring pair must match the spacing of the
    /// first pair within `sqrt(epsilon) * |step|`, plus a few ulps of the
    /// largest value so axes far from zero are not rejected for rounding.
    fn is_linspaced(&self) -> bool;

    /// Get the index of the value left of, or at `x`.
    ///
    /// The vector must be strictly monotonic rising and contain at least
    /// two values. This never returns the right most index, so `idx + 1`
    /// is always valid. Values outside the vector are clamped to the
    /// first or last interval.
    fn get_lower_index(&self, x: T) -> usize;
}

/// Describes the monotonic property of a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monotonic {
    Rising { strict: bool },
    Falling { strict: bool },
    NotMonotonic,
}

impl<S, T> VectorExtensions<T> for ArrayBase<S, Ix1>
where
    S: Data<Elem = T>,
    T: Float,
{
    fn monotonic_prop(&self) -> Monotonic {
        if self.len() <= 1 {
            return Monotonic::NotMonotonic;
        }

        let mut rising = true;
        let mut falling = true;
        let mut strict = true;
        for pair in self.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.is_nan() || b.is_nan() {
                return Monotonic::NotMonotonic;
            }
            if b > a {
                falling = false;
            } else if b < a {
                rising = false;
            } else {
                strict = false;
            }
        }

        match (rising, falling) {
            (true, false) => Monotonic::Rising { strict },
            (false, true) => Monotonic::Falling { strict },
            // all values equal
            (true, true) => Monotonic::Rising { strict: false },
            (false, false) => Monotonic::NotMonotonic,
        }
    }

    fn is_linspaced(&self) -> bool {
        if self.len() <= 2 {
            return true;
        }
        let four: T = cast(4.0).unwrap_or_else(|| unimplemented!());
        let step = self[1] - self[0];
        let magnitude = self[0].abs().max(self[self.len() - 1].abs());
        let tol = T::epsilon().sqrt() * step.abs() + four * T::epsilon() * magnitude;
        self.windows(2)
            .into_iter()
            .all(|pair| ((pair[1] - pair[0]) - step).abs() <= tol)
    }

    fn get_lower_index(&self, x: T) -> usize {
        let len = self.len();
        debug_assert!(len >= 2);
        if !(x > self[0]) {
            return 0;
        }
        if !(x < self[len - 1]) {
            return len - 2;
        }

        // bisection, invariant: self[low] <= x < self[high]
        let mut low = 0usize;
        let mut high = len - 1;
        while high - low > 1 {
            let mid = low + (high - low) / 2;
            if self[mid] <= x {
                low = mid;
            } else {
                high = mid;
            }
        }
        low
    }
}
