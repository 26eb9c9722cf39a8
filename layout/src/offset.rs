/// Linear base offsets of one batch instance in the input and output buffers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BatchOffsets {
    pub input: usize,
    pub output: usize,
}

/// Visits the mixed-radix digits of `flat_index`, most significant first.
///
/// Digit `d` (for `d >= 1`) has radix `lengths[d]` except the most significant one when
/// `digit_count == lengths.len() + 1`, which is unbounded: it counts whole groups of
/// `lengths.iter().product()` planes. `f` receives `(d, digit)`.
#[inline]
fn for_each_digit(
    flat_index: usize,
    lengths: &[usize],
    digit_count: usize,
    mut f: impl FnMut(usize, usize),
) {
    debug_assert!(digit_count <= lengths.len() + 1);
    if digit_count == 0 {
        debug_assert_eq!(flat_index, 0, "no outer dimensions to place a batch in");
        return;
    }

    let mut counter = flat_index;
    for d in (1..digit_count).rev() {
        let radix: usize = lengths[..d].iter().product();
        f(d, counter / radix);
        counter %= radix;
    }
    f(0, counter);
}

/// Resolves a flat batch index into a linear offset.
///
/// `lengths` and `strides` describe only the outer (batch) dimensions: entry `0` is the first
/// dimension above the tile plane. `strides` may hold one more entry than `lengths`, which is the
/// distance between whole batches. The index is decomposed as a mixed-radix number whose digits
/// are multiplied by the matching strides, without materializing the coordinate.
///
/// With no outer dimensions at all the offset is `0`.
#[must_use]
pub fn resolve_offset(flat_index: usize, lengths: &[usize], strides: &[usize]) -> usize {
    let mut offset = 0;
    for_each_digit(flat_index, lengths, strides.len(), |d, digit| {
        offset += digit * strides[d];
    });
    offset
}

/// Resolves the input and output offsets of one batch instance along the same quotient path.
///
/// Both sides must describe the same number of outer dimensions.
#[must_use]
pub fn resolve_offsets(
    flat_index: usize,
    lengths: &[usize],
    stride_in: &[usize],
    stride_out: &[usize],
) -> BatchOffsets {
    debug_assert_eq!(stride_in.len(), stride_out.len());
    let mut offsets = BatchOffsets::default();
    for_each_digit(flat_index, lengths, stride_in.len(), |d, digit| {
        offsets.input += digit * stride_in[d];
        offsets.output += digit * stride_out[d];
    });
    offsets
}
