use fftx_layout::{Side, StridedLayout, is_non_overlapping, required_len};
use fftx_twiddle::{TwiddleLevel, TwiddleSpec};
use tracing::debug;

use crate::{TransposeError, TransposeResult};

/// Checks the shape of a layout: enough dimensions, one stride per dimension plus the batch
/// distance on each side, no empty dimension, and contiguous rows.
pub(crate) fn check_layout(layout: &StridedLayout<'_>, min_dims: usize) -> TransposeResult<()> {
    let dims = layout.dims();
    if dims < min_dims {
        return Err(TransposeError::TooFewDimensions {
            required: min_dims,
            actual: dims,
        });
    }
    for side in [Side::Input, Side::Output] {
        let strides = layout.strides(side);
        if strides.len() != dims + 1 {
            return Err(TransposeError::StrideArity {
                side,
                expected: dims + 1,
                actual: strides.len(),
            });
        }
        if strides[0] != 1 {
            return Err(TransposeError::NonUnitInnerStride {
                side,
                stride: strides[0],
            });
        }
    }
    if let Some(dim) = layout.lengths().iter().position(|&len| len == 0) {
        return Err(TransposeError::ZeroLength { dim });
    }
    if layout.batch_count() == 0 {
        return Err(TransposeError::EmptyBatch);
    }
    Ok(())
}

pub(crate) const fn check_tile_aligned(extent: usize, tile: usize) -> TransposeResult<()> {
    if extent % tile == 0 {
        Ok(())
    } else {
        Err(TransposeError::NotTileAligned { extent, tile })
    }
}

pub(crate) fn check_twiddle(
    spec: Option<TwiddleSpec>,
    supported: &[TwiddleLevel],
) -> TransposeResult<()> {
    match spec {
        Some(spec) if !supported.contains(&spec.level) => {
            Err(TransposeError::UnsupportedTwiddle { level: spec.level })
        }
        _ => Ok(()),
    }
}

/// Checks that both buffers cover every address a launch touches, and that no two elements land
/// on the same output address.
///
/// The views are the `(extent, stride)` pairs the kernel actually addresses, which is what makes
/// the parallel store phase race-free once this passes.
pub(crate) fn check_buffers(
    input_view: &[(usize, usize)],
    output_view: &[(usize, usize)],
    input_len: usize,
    output_len: usize,
) -> TransposeResult<()> {
    for (side, view, actual) in [
        (Side::Input, input_view, input_len),
        (Side::Output, output_view, output_len),
    ] {
        let required =
            required_len(view.iter().copied()).ok_or(TransposeError::LayoutOverflow { side })?;
        if required > actual {
            return Err(TransposeError::BufferTooShort {
                side,
                required,
                actual,
            });
        }
    }
    if !is_non_overlapping(output_view.iter().copied()) {
        return Err(TransposeError::OverlappingOutput);
    }
    debug!(?input_view, ?output_view, "buffers validated");
    Ok(())
}
