//! Twiddle factors for multi-dimensional FFT stages.
//!
//! A transpose stage between two passes of a decomposed FFT can fold the inter-pass phase
//! correction into its data movement. The correction for the element at position product `p`
//! is `exp(-2*pi*i * p / N)`, looked up in a [`TwiddleTable`] one base-256 digit at a time.

#![no_std]

extern crate alloc;

mod error;
mod rotation;
mod spec;
mod table;

pub use error::*;
pub use rotation::*;
pub use spec::*;
pub use table::*;
