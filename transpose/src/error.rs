use fftx_layout::Side;
use fftx_twiddle::TwiddleLevel;
use thiserror::Error;

/// Reasons a transpose launch is refused before any work-group runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransposeError {
    #[error("layout has {actual} dimensions, this scheme needs at least {required}")]
    TooFewDimensions { required: usize, actual: usize },

    #[error("{side} stride array has {actual} entries, expected {expected}")]
    StrideArity {
        side: Side,
        expected: usize,
        actual: usize,
    },

    #[error("dimension {dim} has zero length")]
    ZeroLength { dim: usize },

    #[error("batch count must be at least one")]
    EmptyBatch,

    #[error("{side} elements of a row must be contiguous, got stride {stride}")]
    NonUnitInnerStride { side: Side, stride: usize },

    #[error("extent {extent} is not a multiple of the {tile}-element macro-tile")]
    NotTileAligned { extent: usize, tile: usize },

    #[error("twiddle level {level} is not supported by this scheme")]
    UnsupportedTwiddle { level: TwiddleLevel },

    #[error("{side} buffer holds {actual} elements but the layout addresses {required}")]
    BufferTooShort {
        side: Side,
        required: usize,
        actual: usize,
    },

    #[error("{side} layout addresses elements past the end of the address space")]
    LayoutOverflow { side: Side },

    #[error("output layout maps two elements to the same address")]
    OverlappingOutput,
}

pub type TransposeResult<T> = Result<T, TransposeError>;
