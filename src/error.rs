//! Errors reported by the statistics functions.

use thiserror::Error;

/// Which of the two paired series a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    X,
    Y,
}

impl std::fmt::Display for Series {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Series::X => write!(f, "x"),
            Series::Y => write!(f, "y"),
        }
    }
}

/// Failure of a statistics computation.
///
/// Every variant replaces a result that would otherwise be NaN or infinite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("input sequence is empty")]
    EmptyInput,
    #[error("series lengths differ: x has {x_len} values, y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },
    #[error("at least 2 samples are required, but got {len}")]
    InsufficientData { len: usize },
    #[error("all x values are identical, the fit is vertical")]
    DegenerateInput,
    #[error("{series} series has zero variance")]
    ZeroVariance { series: Series },
    #[error("input contains a NaN or infinite value")]
    NonFiniteInput,
    #[error("result is too large to be represented")]
    Overflow,
}
