use alloc::vec::Vec;
use core::fmt;
use core::iter;

use crate::{BatchOffsets, resolve_offsets};

/// Which buffer of an out-of-place stage a stride array describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Input,
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// The plan-owned description of a batched transform's data, borrowed for one launch.
///
/// `lengths[0]` is the number of columns of the plane (its contiguous dimension), `lengths[1]` the
/// number of rows, and `lengths[2..]` are outer dimensions. Each stride array holds one entry per
/// dimension followed by the distance between consecutive batches, so it has
/// `lengths.len() + 1` entries.
#[derive(Copy, Clone, Debug)]
pub struct StridedLayout<'a> {
    lengths: &'a [usize],
    stride_in: &'a [usize],
    stride_out: &'a [usize],
    batch_count: usize,
}

impl<'a> StridedLayout<'a> {
    pub const fn new(
        lengths: &'a [usize],
        stride_in: &'a [usize],
        stride_out: &'a [usize],
        batch_count: usize,
    ) -> Self {
        Self {
            lengths,
            stride_in,
            stride_out,
            batch_count,
        }
    }

    #[must_use]
    pub const fn lengths(&self) -> &'a [usize] {
        self.lengths
    }

    #[must_use]
    pub const fn strides(&self, side: Side) -> &'a [usize] {
        match side {
            Side::Input => self.stride_in,
            Side::Output => self.stride_out,
        }
    }

    #[must_use]
    pub const fn stride_in(&self) -> &'a [usize] {
        self.stride_in
    }

    #[must_use]
    pub const fn stride_out(&self) -> &'a [usize] {
        self.stride_out
    }

    #[must_use]
    pub const fn batch_count(&self) -> usize {
        self.batch_count
    }

    #[must_use]
    pub const fn dims(&self) -> usize {
        self.lengths.len()
    }

    /// Number of independent planes selected by dimensions `first..` and the batch index.
    ///
    /// This is the extent of the flat batch index a kernel decodes with [`Self::batch_offsets`].
    #[must_use]
    pub fn planes_from(&self, first: usize) -> usize {
        let outer: usize = self.lengths.get(first..).unwrap_or(&[]).iter().product();
        self.batch_count * outer
    }

    /// Input and output offsets of plane `flat_index`, decoding dimensions `first..`.
    #[must_use]
    #[inline]
    pub fn batch_offsets(&self, flat_index: usize, first: usize) -> BatchOffsets {
        resolve_offsets(
            flat_index,
            &self.lengths[first..],
            &self.stride_in[first..],
            &self.stride_out[first..],
        )
    }

    /// `(extent, stride)` pairs of dimensions `first..` on one side, batch included.
    pub fn outer_dims(
        &self,
        side: Side,
        first: usize,
    ) -> impl Iterator<Item = (usize, usize)> + use<'a> {
        let strides = self.strides(side);
        let batch_stride = strides.get(self.dims()).copied().unwrap_or(0);
        self.lengths
            .get(first..)
            .unwrap_or(&[])
            .iter()
            .copied()
            .zip(strides.get(first..).unwrap_or(&[]).iter().copied())
            .chain(iter::once((self.batch_count, batch_stride)))
    }
}

/// Number of elements a buffer needs to hold every offset of a strided view.
///
/// `dims` yields `(extent, stride)` pairs. An empty view needs no storage. Returns `None` when the
/// last offset does not fit in a `usize`.
#[must_use]
pub fn required_len(dims: impl IntoIterator<Item = (usize, usize)>) -> Option<usize> {
    let mut last = 0usize;
    for (extent, stride) in dims {
        if extent == 0 {
            return Some(0);
        }
        last = (extent - 1)
            .checked_mul(stride)
            .and_then(|span| last.checked_add(span))?;
    }
    last.checked_add(1)
}

/// Whether distinct coordinates of a strided view always land on distinct offsets.
///
/// Dimensions are ordered by stride; each must step past everything the smaller-strided
/// dimensions can reach. Dimensions of extent one never move and are ignored. A view whose reach
/// overflows `usize` is reported as overlapping.
#[must_use]
pub fn is_non_overlapping(dims: impl IntoIterator<Item = (usize, usize)>) -> bool {
    let mut dims: Vec<(usize, usize)> = dims.into_iter().filter(|&(e, _)| e > 1).collect();
    dims.sort_unstable_by_key(|&(_, stride)| stride);

    let mut reach = 0usize;
    for (extent, stride) in dims {
        if stride <= reach {
            return false;
        }
        match (extent - 1)
            .checked_mul(stride)
            .and_then(|span| reach.checked_add(span))
        {
            Some(next) => reach = next,
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn planes_count_outer_dims_and_batches() {
        let lengths = [8, 4, 3, 2];
        let strides = [1, 8, 32, 96, 192];
        let layout = StridedLayout::new(&lengths, &strides, &strides, 5);
        assert_eq!(layout.planes_from(2), 5 * 3 * 2);
        assert_eq!(layout.planes_from(3), 5 * 2);
        assert_eq!(layout.planes_from(4), 5);
        assert_eq!(layout.planes_from(9), 5);
    }

    #[test]
    fn batch_offsets_follow_outer_strides() {
        let lengths = [4, 4, 3];
        let stride_in = [1, 4, 16, 48];
        let stride_out = [1, 4, 20, 64];
        let layout = StridedLayout::new(&lengths, &stride_in, &stride_out, 2);

        // Plane 4 is outer index 1 of batch 1.
        let offsets = layout.batch_offsets(4, 2);
        assert_eq!(offsets.input, 16 + 48);
        assert_eq!(offsets.output, 20 + 64);
    }

    #[test]
    fn outer_dims_end_with_the_batch() {
        let lengths = [4, 4, 3];
        let stride_in = [1, 4, 16, 48];
        let layout = StridedLayout::new(&lengths, &stride_in, &stride_in, 7);
        let dims: Vec<_> = layout.outer_dims(Side::Input, 2).collect();
        assert_eq!(dims, vec![(3, 16), (7, 48)]);
        let dims: Vec<_> = layout.outer_dims(Side::Input, 3).collect();
        assert_eq!(dims, vec![(7, 48)]);
    }

    #[test]
    fn required_len_of_padded_plane() {
        // 3 rows of 5 elements with a pitch of 8.
        assert_eq!(required_len([(5, 1), (3, 8)]), Some(2 * 8 + 5));
        assert_eq!(required_len([(5, 1), (0, 8)]), Some(0));
        assert_eq!(required_len(core::iter::empty()), Some(1));
    }

    #[test]
    fn huge_strides_do_not_wrap() {
        // Plane 2 of this view would wrap back onto plane 0.
        let view = [(2, 1), (2, 2), (3, 1 << 63)];
        assert_eq!(required_len(view), None);
        assert!(!is_non_overlapping(view));

        assert_eq!(required_len([(2, usize::MAX)]), None);
        assert_eq!(required_len([(1, usize::MAX)]), Some(1));
        assert_eq!(required_len([(2, usize::MAX - 1)]), Some(usize::MAX));
        assert!(is_non_overlapping([(2, 1 << 63)]));
    }

    #[test]
    fn overlap_detection() {
        assert!(is_non_overlapping([(4, 1), (4, 4)]));
        assert!(is_non_overlapping([(4, 4), (4, 1)]));
        assert!(is_non_overlapping([(4, 1), (4, 5)]));
        assert!(!is_non_overlapping([(4, 1), (4, 3)]));
        assert!(!is_non_overlapping([(2, 0)]));
        // Extent-one dimensions may carry any stride.
        assert!(is_non_overlapping([(1, 0), (6, 1)]));
    }

    #[test]
    fn overlap_detection_agrees_with_enumeration() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let dims: Vec<(usize, usize)> = (0..3)
                .map(|_| (rng.random_range(1..4), rng.random_range(0..10)))
                .collect();

            let mut offsets = Vec::new();
            for i in 0..dims[0].0 {
                for j in 0..dims[1].0 {
                    for k in 0..dims[2].0 {
                        offsets.push(i * dims[0].1 + j * dims[1].1 + k * dims[2].1);
                    }
                }
            }
            let total = offsets.len();
            offsets.sort_unstable();
            offsets.dedup();
            let injective = offsets.len() == total;

            // The stride-ordering test is sufficient, never optimistic.
            if is_non_overlapping(dims.iter().copied()) {
                assert!(injective, "{dims:?}");
            }
        }
    }
}
