pub mod combinator;
pub mod engine;
pub mod int_set;
pub mod problem;
pub mod verifier;

pub use engine::{CacheOptions, CoverageEngine};
pub use int_set::{Backend, DenseIntSet, IntSet, SparseIntSet};
pub use problem::LotteryProblem;
pub use verifier::CoverageVerifier;
