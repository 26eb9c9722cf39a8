use fftx_util::DisjointMut;
use num_complex::Complex;

/// A buffer the load phase reads elements from by flat index.
///
/// Interleaved data is a plain slice of elements. [`Planar`] keeps the two components of a
/// complex number in separate arrays and assembles each element on read.
pub trait ElementSource<T>: Sync {
    /// Number of addressable elements.
    fn element_count(&self) -> usize;

    /// # Panics
    /// Panics if `index >= self.element_count()`.
    fn read(&self, index: usize) -> T;
}

/// A buffer the store phase writes elements into.
pub trait ElementSink<T> {
    /// Shared handle the work-groups of one launch write through.
    type Writer<'w>: ElementWriter<T>
    where
        Self: 'w;

    fn element_count(&self) -> usize;

    fn writer(&mut self) -> Self::Writer<'_>;
}

/// Concurrent single-element writes into an [`ElementSink`].
pub trait ElementWriter<T>: Sync {
    /// # Safety
    /// No other thread may write `index` through this handle while it is shared.
    unsafe fn write(&self, index: usize, value: T);
}

impl<T: Copy + Sync> ElementSource<T> for [T] {
    #[inline]
    fn element_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn read(&self, index: usize) -> T {
        self[index]
    }
}

impl<T: Copy + Sync> ElementSink<T> for [T] {
    type Writer<'w>
        = DisjointMut<'w, T>
    where
        Self: 'w;

    #[inline]
    fn element_count(&self) -> usize {
        self.len()
    }

    fn writer(&mut self) -> DisjointMut<'_, T> {
        DisjointMut::new(self)
    }
}

impl<T: Sync> ElementWriter<T> for DisjointMut<'_, T> {
    #[inline]
    unsafe fn write(&self, index: usize, value: T) {
        // SAFETY: forwarded from the caller.
        unsafe { DisjointMut::write(self, index, value) }
    }
}

/// Complex input stored as separate real and imaginary arrays.
///
/// Element `i` is `re[i] + im[i] * i`. Only indices present in both arrays are addressable.
#[derive(Copy, Clone, Debug)]
pub struct Planar<'a, F> {
    pub re: &'a [F],
    pub im: &'a [F],
}

impl<'a, F> Planar<'a, F> {
    pub const fn new(re: &'a [F], im: &'a [F]) -> Self {
        Self { re, im }
    }
}

impl<F: Copy + Sync> ElementSource<Complex<F>> for Planar<'_, F> {
    #[inline]
    fn element_count(&self) -> usize {
        self.re.len().min(self.im.len())
    }

    #[inline]
    fn read(&self, index: usize) -> Complex<F> {
        Complex::new(self.re[index], self.im[index])
    }
}

/// Complex output stored as separate real and imaginary arrays.
#[derive(Debug)]
pub struct PlanarMut<'a, F> {
    pub re: &'a mut [F],
    pub im: &'a mut [F],
}

impl<'a, F> PlanarMut<'a, F> {
    pub const fn new(re: &'a mut [F], im: &'a mut [F]) -> Self {
        Self { re, im }
    }
}

/// Store-phase handle of a [`PlanarMut`].
pub struct PlanarWriter<'w, F> {
    re: DisjointMut<'w, F>,
    im: DisjointMut<'w, F>,
}

impl<F: Copy + Sync> ElementSink<Complex<F>> for PlanarMut<'_, F> {
    type Writer<'w>
        = PlanarWriter<'w, F>
    where
        Self: 'w;

    #[inline]
    fn element_count(&self) -> usize {
        self.re.len().min(self.im.len())
    }

    fn writer(&mut self) -> PlanarWriter<'_, F> {
        PlanarWriter {
            re: DisjointMut::new(&mut *self.re),
            im: DisjointMut::new(&mut *self.im),
        }
    }
}

impl<F: Sync> ElementWriter<Complex<F>> for PlanarWriter<'_, F> {
    #[inline]
    unsafe fn write(&self, index: usize, value: Complex<F>) {
        // SAFETY: forwarded from the caller; both halves share the index.
        unsafe {
            self.re.write(index, value.re);
            self.im.write(index, value.im);
        }
    }
}
