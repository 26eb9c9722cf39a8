use core::marker::PhantomData;

use fftx_layout::Side;
use fftx_twiddle::{PhaseRotation, TwiddleLevel};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::kernel::{self, TileKernel};
use crate::validate::{check_buffers, check_tile_aligned, check_twiddle};
use crate::{
    Dim2, Dim3, ElementSink, ElementSource, ElementWriter, GroupId, LARGE_TILE, LARGE_WORKGROUP,
    RESHAPE_FACTOR, TransposeError, TransposeResult, UnitId,
};

/// Extent of the block one pass of the work-group reads: 64 columns by 4 rows.
const TILE_EXTENT: Dim2 = Dim2::new(
    LARGE_WORKGROUP.x * RESHAPE_FACTOR,
    LARGE_WORKGROUP.y / RESHAPE_FACTOR,
);

/// Load passes per macro-tile.
const UNROLL: usize = 16;

/// Macro-tile height in elements.
const TILE_HEIGHT: usize = TILE_EXTENT.y * UNROLL;

/// How many store blocks one load block spans.
const TRANSPOSE_RATIO: usize = TILE_EXTENT.x / (TILE_EXTENT.y * UNROLL);

/// Output rows packed into one row of units on the store side.
const GROUPING_PER_Y: usize = UNROLL / TILE_EXTENT.y;

const _: () = assert!(TILE_EXTENT.x == LARGE_TILE && TILE_HEIGHT == LARGE_TILE);

/// Which grid axis walks which tile axis.
pub trait Traversal: Copy + Default + Send + Sync + 'static {
    /// `true` when the grid's x axis walks tile columns.
    const HORIZONTAL: bool;
}

/// Grid x walks tile columns; grid y walks tile rows, then batches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Horizontal;

/// Grid x walks tile rows; grid y walks tile columns, then batches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Vertical;

impl Traversal for Horizontal {
    const HORIZONTAL: bool = true;
}

impl Traversal for Vertical {
    const HORIZONTAL: bool = false;
}

/// Shape of a batch of row-major matrices placed a fixed distance apart.
///
/// Element `(r, c)` of matrix `b` is read from `b * dist_in + r * stride_in + c` and written to
/// `b * dist_out + c * stride_out + r`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectionalParams {
    pub rows: usize,
    pub cols: usize,
    pub batch_count: usize,
    pub stride_in: usize,
    pub stride_out: usize,
    pub dist_in: usize,
    pub dist_out: usize,
}

impl DirectionalParams {
    /// Densely packed matrices with no padding between rows or batches.
    #[must_use]
    pub const fn contiguous(rows: usize, cols: usize, batch_count: usize) -> Self {
        Self {
            rows,
            cols,
            batch_count,
            stride_in: cols,
            stride_out: rows,
            dist_in: rows * cols,
            dist_out: rows * cols,
        }
    }

    fn view(&self, side: Side) -> [(usize, usize); 3] {
        match side {
            Side::Input => [
                (self.cols, 1),
                (self.rows, self.stride_in),
                (self.batch_count, self.dist_in),
            ],
            Side::Output => [
                (self.rows, 1),
                (self.cols, self.stride_out),
                (self.batch_count, self.dist_out),
            ],
        }
    }
}

/// The large-tile transpose for batches addressed by distance, with the traversal direction
/// chosen by type.
///
/// Loads read 64-wide tile rows four at a time, as in [`crate::LargeTileTranspose`]; stores
/// regroup the units by their own ratio so output rows are written whole as well. A fused
/// rotation sees global position products and may be level 3 or 4.
#[derive(Debug)]
pub struct DirectionalTranspose<D, R> {
    params: DirectionalParams,
    rotation: R,
    num_groups_y: usize,
    _traversal: PhantomData<D>,
}

/// Per-group addressing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct DirectionalPlan {
    input_base: usize,
    output_base: usize,
    origin_row: usize,
    origin_col: usize,
}

impl<D: Traversal, R> DirectionalTranspose<D, R> {
    pub fn new(params: DirectionalParams, rotation: R) -> TransposeResult<Self> {
        check_tile_aligned(params.rows, LARGE_TILE)?;
        check_tile_aligned(params.cols, LARGE_TILE)?;
        if params.rows == 0 || params.cols == 0 {
            return Err(TransposeError::ZeroLength {
                dim: usize::from(params.rows == 0),
            });
        }
        if params.batch_count == 0 {
            return Err(TransposeError::EmptyBatch);
        }
        let num_groups_y = if D::HORIZONTAL {
            params.rows / LARGE_TILE
        } else {
            params.cols / LARGE_TILE
        };
        Ok(Self {
            params,
            rotation,
            num_groups_y,
            _traversal: PhantomData,
        })
    }

    #[must_use]
    pub const fn params(&self) -> &DirectionalParams {
        &self.params
    }

    /// Grid rows per matrix; the grid's y index divided by this is the batch index.
    #[must_use]
    pub const fn num_groups_y(&self) -> usize {
        self.num_groups_y
    }

    #[must_use]
    pub fn grid(&self) -> Dim3 {
        let along_x = if D::HORIZONTAL {
            self.params.cols
        } else {
            self.params.rows
        };
        Dim3::new(
            along_x / LARGE_TILE,
            self.num_groups_y * self.params.batch_count,
            1,
        )
    }

    pub fn validate(&self, input_len: usize, output_len: usize) -> TransposeResult<()> {
        check_buffers(
            &self.params.view(Side::Input),
            &self.params.view(Side::Output),
            input_len,
            output_len,
        )
    }

    pub fn launch<T>(&self, input: &[T], output: &mut [T]) -> TransposeResult<()>
    where
        T: Copy + Default + Send + Sync,
        R: PhaseRotation<T>,
    {
        self.launch_with::<T, _, _>(input, output)
    }

    #[instrument(level = "debug", skip_all)]
    pub fn launch_with<T, S, O>(&self, input: &S, output: &mut O) -> TransposeResult<()>
    where
        T: Copy + Default + Send + Sync,
        R: PhaseRotation<T>,
        S: ElementSource<T> + ?Sized,
        O: ElementSink<T> + ?Sized,
    {
        check_twiddle(
            self.rotation.spec(),
            &[TwiddleLevel::Three, TwiddleLevel::Four],
        )?;
        self.validate(input.element_count(), output.element_count())?;
        let grid = self.grid();
        debug!(
            horizontal = D::HORIZONTAL,
            num_groups_y = self.num_groups_y,
            ?grid,
            "directional transpose"
        );
        // SAFETY: every group stores one whole macro-tile of a non-overlapping output view.
        unsafe { kernel::launch::<T, _, _, _>(self, grid, input, output) };
        Ok(())
    }
}

impl<T, D, R> TileKernel<T> for DirectionalTranspose<D, R>
where
    T: Copy + Default,
    D: Traversal,
    R: PhaseRotation<T>,
{
    type Staging = [[T; LARGE_TILE]; LARGE_TILE];
    type Plan = DirectionalPlan;

    fn workgroup(&self) -> Dim2 {
        LARGE_WORKGROUP
    }

    fn plan(&self, group: GroupId) -> DirectionalPlan {
        let batch = group.y / self.num_groups_y;
        let within = group.y % self.num_groups_y;
        let (tile_row, tile_col) = if D::HORIZONTAL {
            (within, group.x)
        } else {
            (group.x, within)
        };
        let origin_row = tile_row * TILE_HEIGHT;
        let origin_col = tile_col * TILE_EXTENT.x;
        let p = &self.params;
        DirectionalPlan {
            input_base: batch * p.dist_in + origin_row * p.stride_in + origin_col,
            output_base: batch * p.dist_out + origin_col * p.stride_out + origin_row,
            origin_row,
            origin_col,
        }
    }

    #[inline]
    fn load<S: ElementSource<T> + ?Sized>(
        &self,
        plan: &DirectionalPlan,
        unit: UnitId,
        input: &S,
        staging: &mut Self::Staging,
    ) {
        let x = unit.x + LARGE_WORKGROUP.x * (unit.y % TILE_EXTENT.y);
        for pass in 0..UNROLL {
            let y = unit.y / TILE_EXTENT.y + pass * TILE_EXTENT.y;
            let value = input.read(plan.input_base + x + self.params.stride_in * y);
            let position = (plan.origin_col + x) * (plan.origin_row + y);
            staging[x][y] = self.rotation.rotate(position, value);
        }
    }

    #[inline]
    unsafe fn store<W: ElementWriter<T>>(
        &self,
        plan: &DirectionalPlan,
        unit: UnitId,
        staging: &Self::Staging,
        output: &W,
    ) {
        let x = unit.x + LARGE_WORKGROUP.x * (unit.y % GROUPING_PER_Y);
        for pass in 0..UNROLL {
            let y = unit.y / GROUPING_PER_Y + pass * (TILE_EXTENT.y * TRANSPOSE_RATIO);
            // SAFETY: forwarded from the caller.
            unsafe {
                output.write(
                    plan.output_base + x + self.params.stride_out * y,
                    staging[y][x],
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use fftx_twiddle::{Direction, NoTwiddle, Twiddle, TwiddleSpec, TwiddleTable};
    use itertools::iproduct;
    use num_complex::Complex;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn check<D: Traversal>(params: DirectionalParams) {
        let mut rng = SmallRng::seed_from_u64(5);
        let in_len = params.dist_in * params.batch_count;
        let out_len = params.dist_out * params.batch_count;
        let input: Vec<u32> = (0..in_len).map(|_| rng.random()).collect();
        let mut output = vec![0; out_len];

        let t = DirectionalTranspose::<D, _>::new(params, NoTwiddle).unwrap();
        t.launch(&input, &mut output).unwrap();
        for (b, r, c) in iproduct!(0..params.batch_count, 0..params.rows, 0..params.cols) {
            assert_eq!(
                output[b * params.dist_out + c * params.stride_out + r],
                input[b * params.dist_in + r * params.stride_in + c],
                "batch {b} ({r}, {c})"
            );
        }
    }

    #[test]
    fn derived_constants() {
        assert_eq!(TILE_EXTENT, Dim2::new(64, 4));
        assert_eq!(TRANSPOSE_RATIO, 1);
        assert_eq!(GROUPING_PER_Y, 4);
    }

    #[test]
    fn grid_shapes() {
        let params = DirectionalParams::contiguous(128, 192, 2);
        let hor = DirectionalTranspose::<Horizontal, _>::new(params, NoTwiddle).unwrap();
        assert_eq!(hor.num_groups_y(), 2);
        assert_eq!(hor.grid(), Dim3::new(3, 4, 1));
        let ver = DirectionalTranspose::<Vertical, _>::new(params, NoTwiddle).unwrap();
        assert_eq!(ver.num_groups_y(), 3);
        assert_eq!(ver.grid(), Dim3::new(2, 6, 1));
    }

    #[test]
    fn both_directions_transpose() {
        let params = DirectionalParams::contiguous(128, 192, 3);
        check::<Horizontal>(params);
        check::<Vertical>(params);
    }

    #[test]
    fn padded_distances() {
        let params = DirectionalParams {
            rows: 64,
            cols: 128,
            batch_count: 2,
            stride_in: 130,
            stride_out: 70,
            dist_in: 130 * 64 + 9,
            dist_out: 70 * 128 + 3,
        };
        check::<Horizontal>(params);
        check::<Vertical>(params);
    }

    #[test]
    fn twiddle_levels_three_and_four() {
        let params = DirectionalParams::contiguous(64, 128, 1);
        let table = TwiddleTable::<f32>::with_levels(1 << 13, 4);
        let input = vec![Complex::new(1.0f32, 0.0); 64 * 128];

        for level in [TwiddleLevel::Three, TwiddleLevel::Four] {
            let spec = TwiddleSpec::new(level, Direction::Inverse);
            let t = DirectionalTranspose::<Vertical, _>::new(
                params,
                Twiddle::new(&table, spec).unwrap(),
            )
            .unwrap();
            let mut output = vec![Complex::default(); input.len()];
            t.launch(&input, &mut output).unwrap();
            for (r, c) in iproduct!(0..64, 0..128) {
                let expected = table.phase(level, r * c).conj();
                assert!((output[r + c * 64] - expected).norm() < 1e-5);
            }
        }

        let spec = TwiddleSpec::new(TwiddleLevel::Two, Direction::Forward);
        let t = DirectionalTranspose::<Horizontal, _>::new(
            params,
            Twiddle::new(&table, spec).unwrap(),
        )
        .unwrap();
        let mut output = vec![Complex::default(); input.len()];
        assert_eq!(
            t.launch(&input, &mut output),
            Err(TransposeError::UnsupportedTwiddle {
                level: TwiddleLevel::Two
            })
        );
    }

    #[test]
    fn refuses_unaligned() {
        let params = DirectionalParams::contiguous(64, 100, 1);
        assert_eq!(
            DirectionalTranspose::<Horizontal, _>::new(params, NoTwiddle).unwrap_err(),
            TransposeError::NotTileAligned {
                extent: 100,
                tile: 64
            }
        );
        let params = DirectionalParams::contiguous(0, 64, 1);
        assert_eq!(
            DirectionalTranspose::<Horizontal, _>::new(params, NoTwiddle).unwrap_err(),
            TransposeError::ZeroLength { dim: 1 }
        );
    }
}
