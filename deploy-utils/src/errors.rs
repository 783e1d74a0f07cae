//! Errors raised by the utility helpers

use thiserror::Error;

/// Errors raised by the utility helpers
#[derive(Debug, Error)]
pub enum UtilsError {
    /// A value does not fit in the bits allotted to it
    #[error("{field} must be at most {max}")]
    FieldOverflow {
        /// The name of the field
        field: &'static str,
        /// The largest representable value
        max: u64,
    },
    /// A quad is not a supported size, is misaligned or lies outside the grid
    #[error("invalid quad: {0}")]
    InvalidQuad(String),
    /// An intermediate value overflowed 256 bits
    #[error("arithmetic overflow computing {0}")]
    ArithmeticOverflow(&'static str),
    /// A conversion rate of zero was supplied
    #[error("conversion rate must be non-zero")]
    ZeroRate,
    /// Error signing or recovering a signature
    #[error("signature error: {0}")]
    Signature(String),
}
