use num_complex::Complex;
use num_traits::Float;

use crate::{Direction, TwiddleError, TwiddleSpec, TwiddleTable};

/// A per-element phase correction fused into the load phase of a tiled stage.
///
/// Kernels are generic over the rotation, so choosing [`NoTwiddle`] compiles the correction out
/// of the load loop entirely instead of testing a flag per element.
pub trait PhaseRotation<T>: Sync {
    /// Rotates `value` by the phase belonging to `position`, the product of the element's
    /// coordinates as the calling scheme defines them.
    fn rotate(&self, position: usize, value: T) -> T;

    /// The twiddle step this rotation performs, if any. Used to check scheme support before a
    /// launch.
    fn spec(&self) -> Option<TwiddleSpec> {
        None
    }
}

/// Plain data movement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoTwiddle;

impl<T> PhaseRotation<T> for NoTwiddle {
    #[inline(always)]
    fn rotate(&self, _position: usize, value: T) -> T {
        value
    }
}

/// Multiplies complex elements by the table phase at their position product.
#[derive(Copy, Clone, Debug)]
pub struct Twiddle<'a, F> {
    table: &'a TwiddleTable<F>,
    spec: TwiddleSpec,
}

impl<'a, F: Float> Twiddle<'a, F> {
    /// Pairs a table with a twiddle step, checking the table is deep enough for it.
    pub fn new(table: &'a TwiddleTable<F>, spec: TwiddleSpec) -> Result<Self, TwiddleError> {
        let required = spec.level.digits();
        if table.levels() < required {
            return Err(TwiddleError::TooFewLevels {
                level: spec.level,
                required,
                available: table.levels(),
            });
        }
        Ok(Self { table, spec })
    }

    #[must_use]
    pub const fn table(&self) -> &'a TwiddleTable<F> {
        self.table
    }
}

impl<F: Float + Sync> PhaseRotation<Complex<F>> for Twiddle<'_, F> {
    #[inline]
    fn rotate(&self, position: usize, value: Complex<F>) -> Complex<F> {
        let w = self.table.phase(self.spec.level, position);
        match self.spec.direction {
            Direction::Forward => value * w,
            Direction::Inverse => value * w.conj(),
        }
    }

    fn spec(&self) -> Option<TwiddleSpec> {
        Some(self.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TwiddleLevel;

    #[test]
    fn no_twiddle_is_identity() {
        assert_eq!(NoTwiddle.rotate(12345, 7u64), 7);
        let z = Complex::new(1.5f32, -2.0);
        assert_eq!(NoTwiddle.rotate(99, z), z);
        assert_eq!(PhaseRotation::<u8>::spec(&NoTwiddle), None);
    }

    #[test]
    fn forward_and_inverse_are_conjugate_rotations() {
        let table = TwiddleTable::<f64>::with_levels(360, 3);
        let fwd = Twiddle::new(&table, TwiddleSpec::new(TwiddleLevel::Three, Direction::Forward))
            .unwrap();
        let inv = Twiddle::new(&table, TwiddleSpec::new(TwiddleLevel::Three, Direction::Inverse))
            .unwrap();

        let one = Complex::new(1.0, 0.0);
        for p in [0, 1, 45, 90, 359, 1000, 70_000] {
            let a = fwd.rotate(p, one);
            let b = inv.rotate(p, one);
            assert!((a - b.conj()).norm() < 1e-12, "position {p}");
        }

        // A quarter turn: forward goes clockwise.
        let a = fwd.rotate(90, one);
        assert!((a - Complex::new(0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn rotation_is_a_complex_multiply() {
        let table = TwiddleTable::<f64>::with_levels(8, 2);
        let spec = TwiddleSpec::new(TwiddleLevel::Two, Direction::Forward);
        let tw = Twiddle::new(&table, spec).unwrap();
        let z = Complex::new(3.0, 4.0);
        // exp(-2*pi*i * 2/8) = -i, and (3 + 4i)(-i) = 4 - 3i
        let got = tw.rotate(2, z);
        assert!((got - Complex::new(4.0, -3.0)).norm() < 1e-12);
        assert_eq!(PhaseRotation::<Complex<f64>>::spec(&tw), Some(spec));
    }

    #[test]
    fn shallow_table_is_rejected() {
        let table = TwiddleTable::<f32>::new(4096);
        let err = Twiddle::new(&table, TwiddleSpec::new(TwiddleLevel::Four, Direction::Forward))
            .unwrap_err();
        assert_eq!(
            err,
            TwiddleError::TooFewLevels {
                level: TwiddleLevel::Four,
                required: 4,
                available: 2,
            }
        );
    }
}
