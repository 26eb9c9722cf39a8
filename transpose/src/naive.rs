use fftx_layout::StridedLayout;
use fftx_twiddle::PhaseRotation;
use itertools::iproduct;
use tracing::instrument;

/// Transposes every plane of `layout` one element at a time.
///
/// Element `(r, c)` of a plane moves from `input[c + r * stride_in[1]]` to
/// `output[r + c * stride_out[1]]`, rotated by the phase of the global position `c * r`. Planes
/// are selected by dimensions `2..` and the batch index exactly as the tiled kernels select them.
///
/// This is the reference the tiled schemes are checked and benchmarked against. It performs no
/// validation.
///
/// # Panics
/// Panics if the layout has fewer than two dimensions or addresses past the end of a buffer.
#[instrument(level = "debug", skip_all)]
pub fn transpose_naive<T, R>(
    layout: &StridedLayout<'_>,
    rotation: &R,
    input: &[T],
    output: &mut [T],
) where
    T: Copy,
    R: PhaseRotation<T>,
{
    let (cols, rows) = (layout.lengths()[0], layout.lengths()[1]);
    let (ld_in, ld_out) = (layout.stride_in()[1], layout.stride_out()[1]);
    for plane in 0..layout.planes_from(2) {
        let base = layout.batch_offsets(plane, 2);
        for (r, c) in iproduct!(0..rows, 0..cols) {
            output[base.output + r + c * ld_out] =
                rotation.rotate(c * r, input[base.input + c + r * ld_in]);
        }
    }
}
