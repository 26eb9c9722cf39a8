use alloc::vec::Vec;

use fftx_layout::{Side, StridedLayout};
use fftx_twiddle::{NoTwiddle, PhaseRotation};
use fftx_util::{blocks_covering, clipped_extent};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::kernel::{self, TileKernel};
use crate::tile::TileTransfer;
use crate::validate::{check_buffers, check_layout};
use crate::{
    Dim2, Dim3, ElementSink, ElementSource, ElementWriter, GroupId, TransposeError, TransposeResult,
    UnitId,
};

/// Which adjacent pair of lengths a three-dimensional transform folds into one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collapse {
    /// The two innermost lengths become the columns; `lengths[2]` is the rows.
    InnerColumns,
    /// `lengths[0]` is the columns; the middle and outer lengths become the rows.
    OuterRows,
}

impl Collapse {
    /// Selector value `1` folds the inner pair, anything else folds the outer pair.
    #[must_use]
    pub const fn from_selector(selector: i32) -> Self {
        if selector == 1 {
            Self::InnerColumns
        } else {
            Self::OuterRows
        }
    }
}

/// The 2D matrix a tiled launch moves, as seen through the layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Plane {
    rows: usize,
    cols: usize,
    ld_in: usize,
    ld_out: usize,
    /// First dimension decoded by the batch-offset resolver.
    first_outer: usize,
}

impl Plane {
    fn leading(layout: &StridedLayout<'_>) -> Self {
        let l = layout.lengths();
        Self {
            rows: l[1],
            cols: l[0],
            ld_in: layout.stride_in()[1],
            ld_out: layout.stride_out()[1],
            first_outer: 2,
        }
    }

    fn collapsed(layout: &StridedLayout<'_>, collapse: Collapse) -> TransposeResult<Self> {
        let l = layout.lengths();
        let (si, so) = (layout.stride_in(), layout.stride_out());
        let (folded, kept) = match collapse {
            Collapse::InnerColumns => (l[0].checked_mul(l[1]), l[2]),
            Collapse::OuterRows => (l[1].checked_mul(l[2]), l[0]),
        };
        let folded = folded.ok_or(TransposeError::LayoutOverflow { side: Side::Input })?;
        Ok(match collapse {
            Collapse::InnerColumns => Self {
                rows: kept,
                cols: folded,
                ld_in: si[2],
                ld_out: so[1],
                first_outer: 3,
            },
            Collapse::OuterRows => Self {
                rows: folded,
                cols: kept,
                ld_in: si[1],
                ld_out: so[2],
                first_outer: 3,
            },
        })
    }
}

/// Transposes every plane of a batched layout tile by tile, with a `DIM_X x DIM_Y` work-group
/// staging `DIM_X x DIM_X` tiles.
///
/// Matrix edges that are not a multiple of `DIM_X` get partial tiles. The rotation sees each
/// element's global position product `col * row`.
#[derive(Debug)]
pub struct TiledTranspose<'a, R, const DIM_X: usize, const DIM_Y: usize> {
    layout: StridedLayout<'a>,
    plane: Plane,
    rotation: R,
}

impl<'a, R, const DIM_X: usize, const DIM_Y: usize> TiledTranspose<'a, R, DIM_X, DIM_Y> {
    /// Tiles the plane spanned by `lengths[0]` columns and `lengths[1]` rows; every further
    /// dimension and the batch index select planes.
    pub fn new(layout: StridedLayout<'a>, rotation: R) -> TransposeResult<Self> {
        Self::assert_shape();
        check_layout(&layout, 2)?;
        Ok(Self {
            plane: Plane::leading(&layout),
            layout,
            rotation,
        })
    }

    const fn assert_shape() {
        const {
            assert!(
                DIM_X > 0 && DIM_Y > 0 && DIM_X % DIM_Y == 0,
                "tile width must be a multiple of the work-group height"
            );
        }
    }

    /// Number of columns of the plane.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.plane.cols
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.plane.rows
    }

    /// The launch grid: one group per tile, one grid layer per plane.
    #[must_use]
    pub fn grid(&self) -> Dim3 {
        Dim3::new(
            blocks_covering(self.plane.cols, DIM_X),
            blocks_covering(self.plane.rows, DIM_X),
            self.layout.planes_from(self.plane.first_outer),
        )
    }

    fn view(&self, side: Side) -> Vec<(usize, usize)> {
        let p = &self.plane;
        let plane = match side {
            Side::Input => [(p.cols, 1), (p.rows, p.ld_in)],
            Side::Output => [(p.rows, 1), (p.cols, p.ld_out)],
        };
        plane
            .into_iter()
            .chain(self.layout.outer_dims(side, p.first_outer))
            .collect()
    }

    /// Checks that buffers of these lengths hold every element the launch addresses, and that
    /// the output layout never maps two elements to one address.
    pub fn validate(&self, input_len: usize, output_len: usize) -> TransposeResult<()> {
        check_buffers(
            &self.view(Side::Input),
            &self.view(Side::Output),
            input_len,
            output_len,
        )
    }

    /// Validates the buffers and runs the transpose.
    pub fn launch<T>(&self, input: &[T], output: &mut [T]) -> TransposeResult<()>
    where
        T: Copy + Default + Send + Sync,
        R: PhaseRotation<T>,
    {
        self.launch_with::<T, _, _>(input, output)
    }

    /// Like [`Self::launch`], for buffers in any element format.
    #[instrument(level = "debug", skip_all)]
    pub fn launch_with<T, S, O>(&self, input: &S, output: &mut O) -> TransposeResult<()>
    where
        T: Copy + Default + Send + Sync,
        R: PhaseRotation<T>,
        S: ElementSource<T> + ?Sized,
        O: ElementSink<T> + ?Sized,
    {
        self.validate(input.element_count(), output.element_count())?;
        let grid = self.grid();
        debug!(
            rows = self.plane.rows,
            cols = self.plane.cols,
            tile = DIM_X,
            ?grid,
            "tiled transpose"
        );
        // SAFETY: the output view is non-overlapping and each group stores only its own tile.
        unsafe { kernel::launch::<T, _, _, _>(self, grid, input, output) };
        Ok(())
    }
}

impl<T, R, const DIM_X: usize, const DIM_Y: usize> TileKernel<T>
    for TiledTranspose<'_, R, DIM_X, DIM_Y>
where
    T: Copy + Default,
    R: PhaseRotation<T>,
{
    type Staging = [[T; DIM_X]; DIM_X];
    type Plan = TileTransfer;

    fn workgroup(&self) -> Dim2 {
        Dim2::new(DIM_X, DIM_Y)
    }

    fn plan(&self, group: GroupId) -> TileTransfer {
        let p = &self.plane;
        let offsets = self.layout.batch_offsets(group.z, p.first_outer);
        let origin_col = group.x * DIM_X;
        let origin_row = group.y * DIM_X;
        TileTransfer {
            input_base: offsets.input + origin_col + origin_row * p.ld_in,
            output_base: offsets.output + origin_col * p.ld_out + origin_row,
            rows: clipped_extent(p.rows, origin_row, DIM_X),
            cols: clipped_extent(p.cols, origin_col, DIM_X),
            ld_in: p.ld_in,
            ld_out: p.ld_out,
            origin_row,
            origin_col,
        }
    }

    #[inline]
    fn load<S: ElementSource<T> + ?Sized>(
        &self,
        plan: &TileTransfer,
        unit: UnitId,
        input: &S,
        staging: &mut Self::Staging,
    ) {
        plan.load::<T, R, S, DIM_X, DIM_Y>(unit, input, &self.rotation, staging);
    }

    #[inline]
    unsafe fn store<W: ElementWriter<T>>(
        &self,
        plan: &TileTransfer,
        unit: UnitId,
        staging: &Self::Staging,
        output: &W,
    ) {
        // SAFETY: forwarded from the caller.
        unsafe { plan.store::<T, W, DIM_X, DIM_Y>(unit, staging, output) };
    }
}

/// A tiled transpose of a three-or-more dimensional transform with two adjacent lengths folded
/// together, exchanging the middle dimension against the innermost or the innermost pair against
/// the outer one.
///
/// Dimensions from `3` on, and the batch index, select planes. No twiddle is applied.
#[derive(Debug)]
pub struct CollapsedTranspose<'a, const DIM_X: usize, const DIM_Y: usize> {
    inner: TiledTranspose<'a, NoTwiddle, DIM_X, DIM_Y>,
    collapse: Collapse,
}

impl<'a, const DIM_X: usize, const DIM_Y: usize> CollapsedTranspose<'a, DIM_X, DIM_Y> {
    pub fn new(layout: StridedLayout<'a>, collapse: Collapse) -> TransposeResult<Self> {
        TiledTranspose::<NoTwiddle, DIM_X, DIM_Y>::assert_shape();
        check_layout(&layout, 3)?;
        Ok(Self {
            inner: TiledTranspose {
                plane: Plane::collapsed(&layout, collapse)?,
                layout,
                rotation: NoTwiddle,
            },
            collapse,
        })
    }

    #[must_use]
    pub const fn collapse(&self) -> Collapse {
        self.collapse
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.inner.cols()
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.inner.rows()
    }

    #[must_use]
    pub fn grid(&self) -> Dim3 {
        self.inner.grid()
    }

    pub fn validate(&self, input_len: usize, output_len: usize) -> TransposeResult<()> {
        self.inner.validate(input_len, output_len)
    }

    pub fn launch<T>(&self, input: &[T], output: &mut [T]) -> TransposeResult<()>
    where
        T: Copy + Default + Send + Sync,
    {
        self.launch_with::<T, _, _>(input, output)
    }

    #[instrument(level = "debug", skip_all)]
    pub fn launch_with<T, S, O>(&self, input: &S, output: &mut O) -> TransposeResult<()>
    where
        T: Copy + Default + Send + Sync,
        S: ElementSource<T> + ?Sized,
        O: ElementSink<T> + ?Sized,
    {
        debug!(collapse = ?self.collapse);
        self.inner.launch_with::<T, S, O>(input, output)
    }
}
