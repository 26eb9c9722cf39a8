use alloc::vec::Vec;

use fftx_layout::{Side, StridedLayout};
use fftx_twiddle::{PhaseRotation, TwiddleLevel};
use tracing::{debug, instrument};

use crate::kernel::{self, TileKernel};
use crate::validate::{check_buffers, check_layout, check_tile_aligned, check_twiddle};
use crate::{
    Dim2, Dim3, ElementSink, ElementSource, ElementWriter, GroupId, TransposeResult, UnitId,
};

/// Side of the square macro-tile moved by one work-group of the large-tile schemes.
pub const LARGE_TILE: usize = 64;

/// Work-group extent of the large-tile schemes.
pub const LARGE_WORKGROUP: Dim2 = Dim2::new(16, 16);

/// Logical tile rows packed into one row of units, so that a unit row reads a full 64-wide
/// tile row.
pub const RESHAPE_FACTOR: usize = LARGE_TILE / LARGE_WORKGROUP.x;

/// Tile rows covered by one pass of the whole work-group.
const ROWS_PER_PASS: usize = LARGE_WORKGROUP.y / RESHAPE_FACTOR;

/// Passes needed to cover the macro-tile height.
pub const UNROLL_FACTOR: usize = LARGE_TILE / ROWS_PER_PASS;

/// Transposes tile-aligned planes through a 64x64 staging tile, reading and writing full
/// 64-element rows.
///
/// The grid's x axis enumerates tiles across one matrix and then matrices across the batch;
/// its y axis walks tile rows. A fused rotation sees the position product of the element's
/// coordinates within its macro-tile, not within the matrix, and only level-3 twiddles are
/// accepted. The rotation's direction is honoured, so an inverse twiddle multiplies by the
/// conjugate phase; launches ported from kernels that always apply the forward phase must pass a
/// forward [`TwiddleSpec`](fftx_twiddle::TwiddleSpec) to keep their results.
#[derive(Debug)]
pub struct LargeTileTranspose<'a, R> {
    layout: StridedLayout<'a>,
    rotation: R,
    blocks_per_matrix: usize,
}

/// Per-group addressing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct LargeTilePlan {
    input_base: usize,
    output_base: usize,
}

/// The unit's sub-block coordinate in `pass`: 16 units of a row plus four rows side by side.
#[inline]
const fn sub_block(unit: UnitId, pass: usize) -> (usize, usize) {
    (
        unit.x + (unit.y % RESHAPE_FACTOR) * LARGE_WORKGROUP.x,
        unit.y / RESHAPE_FACTOR + pass * ROWS_PER_PASS,
    )
}

impl<'a, R> LargeTileTranspose<'a, R> {
    pub fn new(layout: StridedLayout<'a>, rotation: R) -> TransposeResult<Self> {
        check_layout(&layout, 2)?;
        let lengths = layout.lengths();
        check_tile_aligned(lengths[0], LARGE_TILE)?;
        check_tile_aligned(lengths[1], LARGE_TILE)?;
        Ok(Self {
            blocks_per_matrix: lengths[0] / LARGE_TILE,
            layout,
            rotation,
        })
    }

    /// Macro-tiles across one matrix row.
    #[must_use]
    pub const fn blocks_per_matrix(&self) -> usize {
        self.blocks_per_matrix
    }

    #[must_use]
    pub fn grid(&self) -> Dim3 {
        Dim3::new(
            self.blocks_per_matrix * self.layout.planes_from(2),
            self.layout.lengths()[1] / LARGE_TILE,
            1,
        )
    }

    fn view(&self, side: Side) -> Vec<(usize, usize)> {
        let (cols, rows) = (self.layout.lengths()[0], self.layout.lengths()[1]);
        let ld = self.layout.strides(side)[1];
        let plane = match side {
            Side::Input => [(cols, 1), (rows, ld)],
            Side::Output => [(rows, 1), (cols, ld)],
        };
        plane
            .into_iter()
            .chain(self.layout.outer_dims(side, 2))
            .collect()
    }

    pub fn validate(&self, input_len: usize, output_len: usize) -> TransposeResult<()> {
        check_buffers(
            &self.view(Side::Input),
            &self.view(Side::Output),
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
        check_twiddle(self.rotation.spec(), &[TwiddleLevel::Three])?;
        self.validate(input.element_count(), output.element_count())?;
        let grid = self.grid();
        debug!(
            blocks_per_matrix = self.blocks_per_matrix,
            ?grid,
            "large-tile transpose"
        );
        // SAFETY: every group stores one whole macro-tile of a non-overlapping output view.
        unsafe { kernel::launch::<T, _, _, _>(self, grid, input, output) };
        Ok(())
    }
}

impl<T, R> TileKernel<T> for LargeTileTranspose<'_, R>
where
    T: Copy + Default,
    R: PhaseRotation<T>,
{
    type Staging = [[T; LARGE_TILE]; LARGE_TILE];
    type Plan = LargeTilePlan;

    fn workgroup(&self) -> Dim2 {
        LARGE_WORKGROUP
    }

    fn plan(&self, group: GroupId) -> LargeTilePlan {
        let matrix = group.x / self.blocks_per_matrix;
        let tile_col = group.x % self.blocks_per_matrix;
        let offsets = self.layout.batch_offsets(matrix, 2);
        let ld_in = self.layout.stride_in()[1];
        let ld_out = self.layout.stride_out()[1];
        LargeTilePlan {
            input_base: offsets.input + ld_in * group.y * LARGE_TILE + tile_col * LARGE_TILE,
            output_base: offsets.output + ld_out * tile_col * LARGE_TILE + group.y * LARGE_TILE,
        }
    }

    #[inline]
    fn load<S: ElementSource<T> + ?Sized>(
        &self,
        plan: &LargeTilePlan,
        unit: UnitId,
        input: &S,
        staging: &mut Self::Staging,
    ) {
        let ld_in = self.layout.stride_in()[1];
        for pass in 0..UNROLL_FACTOR {
            let (x, y) = sub_block(unit, pass);
            let value = input.read(plan.input_base + y * ld_in + x);
            staging[x][y] = self.rotation.rotate(x * y, value);
        }
    }

    #[inline]
    unsafe fn store<W: ElementWriter<T>>(
        &self,
        plan: &LargeTilePlan,
        unit: UnitId,
        staging: &Self::Staging,
        output: &W,
    ) {
        let ld_out = self.layout.stride_out()[1];
        for pass in 0..UNROLL_FACTOR {
            let (x, y) = sub_block(unit, pass);
            // SAFETY: forwarded from the caller.
            unsafe { output.write(plan.output_base + y * ld_out + x, staging[y][x]) };
        }
    }
}
