use fftx_twiddle::PhaseRotation;
use crate::{ElementSource, ElementWriter, UnitId};

/// Addressing of one tile moved through a `DIM_X x DIM_X` staging buffer by a
/// `DIM_X x DIM_Y` work-group.
///
/// The tile has `rows x cols` valid elements, possibly fewer than the staging buffer holds at the
/// edge of a matrix. Element `(r, c)` lives at `input_base + c + r * ld_in` and is written to
/// `output_base + r + c * ld_out`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct TileTransfer {
    pub input_base: usize,
    pub output_base: usize,
    pub rows: usize,
    pub cols: usize,
    pub ld_in: usize,
    pub ld_out: usize,
    /// Global row of the tile's first element, for twiddle positions.
    pub origin_row: usize,
    /// Global column of the tile's first element.
    pub origin_col: usize,
}

/// Maps a unit onto the square staging buffer: `DIM_X` units per staging row.
#[inline]
const fn staging_coords<const DIM_X: usize>(unit: UnitId) -> (usize, usize) {
    let tid = unit.x + unit.y * DIM_X;
    (tid % DIM_X, tid / DIM_X)
}

impl TileTransfer {
    /// Reads this unit's elements of the tile, rotates them, and stages them transposed.
    #[inline]
    pub(crate) fn load<T, R, S, const DIM_X: usize, const DIM_Y: usize>(
        &self,
        unit: UnitId,
        input: &S,
        rotation: &R,
        staging: &mut [[T; DIM_X]; DIM_X],
    ) where
        T: Copy,
        R: PhaseRotation<T>,
        S: ElementSource<T> + ?Sized,
    {
        let (tx, ty) = staging_coords::<DIM_X>(unit);
        if tx >= self.cols {
            return;
        }
        for row in (ty..self.rows).step_by(DIM_Y) {
            let value = input.read(self.input_base + tx + row * self.ld_in);
            let position = (self.origin_col + tx) * (self.origin_row + row);
            staging[tx][row] = rotation.rotate(position, value);
        }
    }

    /// Writes this unit's share of the staged tile back out, one output row per staging row.
    ///
    /// # Safety
    /// No other group may write the output region this tile covers.
    #[inline]
    pub(crate) unsafe fn store<T, W, const DIM_X: usize, const DIM_Y: usize>(
        &self,
        unit: UnitId,
        staging: &[[T; DIM_X]; DIM_X],
        output: &W,
    ) where
        T: Copy,
        W: ElementWriter<T>,
    {
        let (tx, ty) = staging_coords::<DIM_X>(unit);
        if tx >= self.rows {
            return;
        }
        for col in (ty..self.cols).step_by(DIM_Y) {
            let index = self.output_base + tx + col * self.ld_out;
            // SAFETY: forwarded from the caller.
            unsafe { output.write(index, staging[col][tx]) };
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use fftx_twiddle::NoTwiddle;
    use fftx_util::DisjointMut;

    use super::*;
    use crate::Dim2;

    fn run<const DIM_X: usize, const DIM_Y: usize>(
        transfer: &TileTransfer,
        input: &[u32],
        output: &mut [u32],
    ) {
        let mut staging = [[0; DIM_X]; DIM_X];
        let block = Dim2::new(DIM_X, DIM_Y);
        for unit in block.units() {
            transfer.load::<_, _, _, DIM_X, DIM_Y>(unit, input, &NoTwiddle, &mut staging);
        }
        let output = DisjointMut::new(output);
        for unit in block.units() {
            unsafe { transfer.store::<_, _, DIM_X, DIM_Y>(unit, &staging, &output) };
        }
    }

    #[test]
    fn full_tile_with_pitch() {
        // A 4x4 tile inside a 6-wide input and a 5-wide output.
        let input: Vec<u32> = (0..24).collect();
        let mut output = vec![u32::MAX; 20];
        let transfer = TileTransfer {
            input_base: 0,
            output_base: 0,
            rows: 4,
            cols: 4,
            ld_in: 6,
            ld_out: 5,
            origin_row: 0,
            origin_col: 0,
        };
        run::<4, 2>(&transfer, &input, &mut output);

        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(output[r + c * 5], input[c + r * 6]);
            }
            // Padding past the tile is left alone.
            assert_eq!(output[4 + r * 5], u32::MAX);
        }
    }

    #[test]
    fn partial_tile_touches_only_valid_elements() {
        // A 3x2 corner staged through an 8x8 buffer.
        let input: Vec<u32> = (1..=6).collect();
        let mut output = vec![0; 6];
        let transfer = TileTransfer {
            input_base: 0,
            output_base: 0,
            rows: 3,
            cols: 2,
            ld_in: 2,
            ld_out: 3,
            origin_row: 0,
            origin_col: 0,
        };
        run::<8, 2>(&transfer, &input, &mut output);
        assert_eq!(output, vec![1, 3, 5, 2, 4, 6]);
    }
}
