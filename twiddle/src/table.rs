use alloc::vec::Vec;
use core::f64::consts::PI;

use fftx_util::log2_ceil_usize;
use num_complex::Complex;
use num_traits::{AsPrimitive, Float};
use tracing::instrument;

use crate::TwiddleLevel;

/// Bits of the position product consumed per table level.
pub const TWIDDLE_RADIX_BITS: usize = 8;

/// Entries per table level.
pub const TWIDDLE_RADIX: usize = 1 << TWIDDLE_RADIX_BITS;

const DIGIT_MASK: usize = TWIDDLE_RADIX - 1;

/// Precomputed phase factors for a transform of length `N`, split into base-256 levels.
///
/// Entry `j` of level `k` is `exp(-2*pi*i * j * 256^k / N)`. A lookup for position `p` multiplies
/// one entry per level, picked by the base-256 digits of `p`, which avoids storing all `N` phases
/// while keeping every factor exact to the precision of `F`.
#[derive(Clone, Debug, PartialEq)]
pub struct TwiddleTable<F> {
    length: usize,
    levels: usize,
    values: Vec<Complex<F>>,
}

impl<F> TwiddleTable<F>
where
    F: Float + 'static,
    f64: AsPrimitive<F>,
{
    /// Builds the smallest table covering every position below `length`.
    ///
    /// # Panics
    /// Panics if `length` is zero.
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self::with_levels(length, Self::levels_for(length))
    }

    /// Number of base-256 levels needed to cover positions below `length`.
    #[must_use]
    pub const fn levels_for(length: usize) -> usize {
        let levels = log2_ceil_usize(length).div_ceil(TWIDDLE_RADIX_BITS);
        if levels == 0 { 1 } else { levels }
    }

    /// Builds a table with an explicit number of levels.
    ///
    /// Stages that fuse deeper lookups than the transform length needs (for instance a level-3
    /// rotation on a short transform) need the extra levels to exist.
    ///
    /// # Panics
    /// Panics if `length` is zero.
    #[must_use]
    #[instrument(level = "debug")]
    pub fn with_levels(length: usize, levels: usize) -> Self {
        assert!(length > 0, "twiddle table for an empty transform");

        let phi = -2.0 * PI / length as f64;
        let values = (0..levels)
            .flat_map(|level| {
                let step = 1usize << (level * TWIDDLE_RADIX_BITS);
                (0..TWIDDLE_RADIX).map(move |j| {
                    // Reduce before scaling so the angle stays small.
                    let (sin, cos) = Float::sin_cos(phi * ((step * j) % length) as f64);
                    Complex::new(cos.as_(), sin.as_())
                })
            })
            .collect();

        Self {
            length,
            levels,
            values,
        }
    }
}

impl<F: Float> TwiddleTable<F> {
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub const fn levels(&self) -> usize {
        self.levels
    }

    #[must_use]
    pub fn values(&self) -> &[Complex<F>] {
        &self.values
    }

    /// The phase factor `exp(-2*pi*i * position / N)`, assembled from `level.digits()` levels.
    ///
    /// Digits of `position` beyond the requested level are ignored.
    ///
    /// # Panics
    /// Panics if the table has fewer levels than `level` consumes.
    #[must_use]
    #[inline]
    pub fn phase(&self, level: TwiddleLevel, position: usize) -> Complex<F> {
        let mut u = position;
        let mut result = self.values[u & DIGIT_MASK];
        for k in 1..level.digits() {
            u >>= TWIDDLE_RADIX_BITS;
            result = result * self.values[k * TWIDDLE_RADIX + (u & DIGIT_MASK)];
        }
        result
    }
}
