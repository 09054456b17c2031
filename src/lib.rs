//! Exact pairwise and three-way sequence alignment over bit-encoded
//! ambiguous alphabets.
//!
//! Two stream lengths (`M`, `N`, and `L1`/`L2`/`L3` for the three-way
//! engines) determine everything the lower-level components need; nothing
//! here assumes a DNA/RNA/protein alphabet specifically, only that symbols
//! fit in a [`symbol::Symbol`] bit-set. See [`facade`] for the entry
//! points most callers want; the component modules below are public for
//! callers who need direct control over pool reuse across many calls.

pub mod config;
pub mod cost_matrix;
pub mod cost_matrix3;
pub mod engine2d;
pub mod engine3d;
pub mod error;
pub mod facade;
pub mod pool;
pub mod precalc;
pub mod stream;
pub mod symbol;
pub mod verify;

pub use config::{AffineGapCost, BandConfig, PowellConfig, WantOutputs};
pub use cost_matrix::{BaseTable, CostMatrix};
pub use cost_matrix3::CostMatrix3;
pub use error::{AlignError, Result};
pub use facade::{
    align_2d_affine, align_2d_linear, align_3d, align_3d_powell, expand_cost_matrix_2d,
    expand_cost_matrix_3d, AffineAligner, CubeAligner, LinearAligner, PairwiseAligner,
    PowellAligner, ThreewiseAligner,
};
pub use pool::MatrixPool;
pub use stream::Stream;
pub use symbol::Symbol;
