//! Tiled out-of-place transposes for the reshuffling stages of multi-dimensional FFTs.
//!
//! Every scheme moves a plane of a batched, strided layout through a fixed-size staging tile on
//! a bulk-synchronous work-group executor: all units of a group load, a barrier separates the
//! phases, then all units store. A [`PhaseRotation`](fftx_twiddle::PhaseRotation) may be fused
//! into the load.
//!
//! - [`TiledTranspose`] and [`CollapsedTranspose`] handle any extent, with partial tiles at the
//!   edges, for tiles sized by const generics.
//! - [`LargeTileTranspose`] moves 64x64 tiles of tile-aligned planes with fully reshaped loads
//!   and stores.
//! - [`DirectionalTranspose`] does the same for distance-addressed batches, walking the grid
//!   in either direction.
//!
//! Buffers are read and written through [`ElementSource`] and [`ElementSink`], so every scheme
//! runs on interleaved slices and on [`Planar`] complex data alike.
//!
//! Launches are validated before any group runs; with the `parallel` feature, groups run on the
//! rayon thread pool.

#![no_std]

extern crate alloc;

mod directional;
mod error;
mod format;
mod grid;
mod kernel;
mod large_tile;
mod naive;
mod tile;
mod tiled;
mod validate;

pub use directional::*;
pub use error::*;
pub use format::*;
pub use grid::*;
pub use kernel::LOCAL_MEMORY_BYTES;
pub use large_tile::*;
pub use naive::*;
pub use tiled::*;
