//! Error taxonomy for the alignment core.
//!
//! Every public entry point returns a `Result<_, AlignError>`. Nothing here
//! is recovered locally: engines do not retry, and a caller that receives an
//! error gets any partially written output streams reset to length zero.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    #[error("buffer could not grow to the required size")]
    AllocationFailed,

    #[error("alphabet size {k} exceeds the supported word width (K must be <= 31 for pair tables, <= 64 for symbols)")]
    AlphabetTooLarge { k: u32 },

    #[error("precondition violated: {0}")]
    PreconditionViolated(&'static str),

    #[error("overflow: {0}")]
    Overflow(&'static str),
}

pub type Result<T> = std::result::Result<T, AlignError>;
