use core::marker::PhantomData;
use core::sync::atomic::{AtomicPtr, Ordering};

/// A mutable slice that many workers may write through concurrently, each to its own indices.
///
/// This is the host-side stand-in for an accelerator's global memory during the store phase of a
/// tiled kernel: every work-group owns a disjoint destination region, so writes never need to be
/// synchronized. The handle only hands out single-element writes and bounds-checks each one.
pub struct DisjointMut<'a, T> {
    base: AtomicPtr<T>,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T> DisjointMut<'a, T> {
    /// Wraps `slice`; the borrow lasts as long as the handle.
    pub fn new(slice: &'a mut [T]) -> Self {
        Self {
            base: AtomicPtr::new(slice.as_mut_ptr()),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `value` at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    ///
    /// # Safety
    /// No other thread may read or write `index` through this handle while the handle is alive
    /// and shared. Writes to distinct indices from distinct threads are fine.
    #[inline]
    pub unsafe fn write(&self, index: usize, value: T) {
        assert!(
            index < self.len,
            "write at {index} is outside a buffer of {} elements",
            self.len
        );
        // The pointer never changes after construction; relaxed loads only need to see it.
        unsafe {
            self.base.load(Ordering::Relaxed).add(index).write(value);
        }
    }
}
