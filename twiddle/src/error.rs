use thiserror::Error;

use crate::TwiddleLevel;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TwiddleError {
    /// The table was built with fewer base-256 levels than the requested lookup consumes.
    #[error("twiddle level {level} needs {required} table levels but the table has {available}")]
    TooFewLevels {
        level: TwiddleLevel,
        required: usize,
        available: usize,
    },
}
