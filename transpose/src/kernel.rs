use core::mem::size_of;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, debug_span};

use crate::{Dim2, Dim3, ElementSink, ElementSource, ElementWriter, GroupId, UnitId};

/// Bytes of on-chip scratch a single work-group may stage a tile in.
pub const LOCAL_MEMORY_BYTES: usize = 32 * 1024;

/// Scratch memory owned by one work-group for the duration of one invocation.
pub(crate) trait StagingBuffer<T> {
    fn fresh() -> Self;
}

impl<T: Copy + Default, const N: usize> StagingBuffer<T> for [[T; N]; N] {
    #[inline]
    fn fresh() -> Self {
        const {
            assert!(
                N * N * size_of::<T>() <= LOCAL_MEMORY_BYTES,
                "staging tile does not fit in local memory"
            );
        }
        [[T::default(); N]; N]
    }
}

/// A bulk-synchronous tile kernel.
///
/// Every work-group gets a fresh staging buffer. All of its units run `load`, then all of them
/// run `store`; nothing a unit stages is read before the whole group has finished loading.
pub(crate) trait TileKernel<T>: Sync {
    type Staging: StagingBuffer<T>;

    /// Per-group addressing, computed once before the load phase.
    type Plan;

    fn workgroup(&self) -> Dim2;

    fn plan(&self, group: GroupId) -> Self::Plan;

    fn load<S: ElementSource<T> + ?Sized>(
        &self,
        plan: &Self::Plan,
        unit: UnitId,
        input: &S,
        staging: &mut Self::Staging,
    );

    /// # Safety
    /// The indices a group writes must not be written by any other group of the same launch.
    unsafe fn store<W: ElementWriter<T>>(
        &self,
        plan: &Self::Plan,
        unit: UnitId,
        staging: &Self::Staging,
        output: &W,
    );
}

/// Runs `kernel` over every work-group of `grid`.
///
/// # Safety
/// Distinct work-groups of `grid` must store to disjoint sets of output indices.
pub(crate) unsafe fn launch<T, K, S, O>(kernel: &K, grid: Dim3, input: &S, output: &mut O)
where
    T: Copy + Send + Sync,
    K: TileKernel<T>,
    S: ElementSource<T> + ?Sized,
    O: ElementSink<T> + ?Sized,
{
    let block = kernel.workgroup();
    let _span = debug_span!("launch", ?grid, ?block).entered();

    let output = output.writer();
    let run_group = |group: GroupId| {
        let plan = kernel.plan(group);
        let mut staging = K::Staging::fresh();
        for unit in block.units() {
            kernel.load(&plan, unit, input, &mut staging);
        }
        // Barrier.
        for unit in block.units() {
            // SAFETY: groups write disjoint index sets, and units of one group run in turn.
            unsafe { kernel.store(&plan, unit, &staging, &output) };
        }
    };

    #[cfg(feature = "parallel")]
    (0..grid.count())
        .into_par_iter()
        .for_each(|flat| run_group(grid.group(flat)));

    #[cfg(not(feature = "parallel"))]
    grid.groups().for_each(run_group);

    debug!(groups = grid.count(), "launch complete");
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    /// Reverses each run of `N` elements through the staging buffer's first row.
    struct Reverse<const N: usize>;

    impl<const N: usize> TileKernel<u32> for Reverse<N> {
        type Staging = [[u32; N]; N];
        type Plan = usize;

        fn workgroup(&self) -> Dim2 {
            Dim2::new(N, 1)
        }

        fn plan(&self, group: GroupId) -> usize {
            group.x * N
        }

        fn load<S: ElementSource<u32> + ?Sized>(
            &self,
            base: &usize,
            unit: UnitId,
            input: &S,
            staging: &mut [[u32; N]; N],
        ) {
            staging[0][unit.x] = input.read(base + unit.x);
        }

        unsafe fn store<W: ElementWriter<u32>>(
            &self,
            base: &usize,
            unit: UnitId,
            staging: &[[u32; N]; N],
            output: &W,
        ) {
            // Reads a slot staged by a different unit.
            unsafe { output.write(base + unit.x, staging[0][N - 1 - unit.x]) };
        }
    }

    #[test]
    fn stores_see_every_load_of_the_group() {
        let input: Vec<u32> = (0..24).collect();
        let mut output = vec![0; 24];
        unsafe { launch(&Reverse::<8>, Dim3::new(3, 1, 1), &input[..], &mut output[..]) };

        let expected: Vec<u32> = input
            .chunks(8)
            .flat_map(|c| c.iter().rev().copied())
            .collect();
        assert_eq!(output, expected);
    }

    #[test]
    fn fresh_staging_is_zeroed() {
        let tile: [[u64; 4]; 4] = StagingBuffer::fresh();
        assert!(tile.iter().flatten().all(|&v| v == 0));
    }
}
