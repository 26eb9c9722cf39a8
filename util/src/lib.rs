//! Various simple utilities.

#![no_std]

#[cfg(test)]
extern crate alloc;

mod disjoint;

pub use disjoint::DisjointMut;

/// Computes `ceil(log_2(n))`.
#[must_use]
pub const fn log2_ceil_usize(n: usize) -> usize {
    (usize::BITS - n.saturating_sub(1).leading_zeros()) as usize
}

/// Number of `tile`-sized blocks needed to cover `extent`, counting a trailing partial block.
#[must_use]
#[inline]
pub const fn blocks_covering(extent: usize, tile: usize) -> usize {
    extent.div_ceil(tile)
}

/// Size of the trailing block when `extent` is cut into `tile`-sized pieces starting at `origin`.
///
/// This is `min(extent - origin, tile)`; `origin` must not exceed `extent`.
#[must_use]
#[inline]
pub fn clipped_extent(extent: usize, origin: usize, tile: usize) -> usize {
    debug_assert!(origin <= extent);
    (extent - origin).min(tile)
}
