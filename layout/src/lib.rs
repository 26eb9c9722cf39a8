//! Addressing of batched, strided transform data.
//!
//! A transform's data is described by the plan that owns it: an array of dimension lengths and,
//! for each side of an out-of-place stage, an array of strides. Dimensions `0` and `1` span the
//! plane a tiled kernel works on; every dimension after that, plus the trailing batch distance,
//! only selects which plane a work-group touches.

#![no_std]

extern crate alloc;

mod offset;
mod strided;

pub use offset::*;
pub use strided::*;
