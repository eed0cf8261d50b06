//! Simkit - fuzzy hashing and edit distances
//!
//! Rolling hashes, context-triggered piecewise hashing (CTPH) over bytes and
//! token sequences, digest comparison, and a family of normalized
//! edit-distance metrics.

pub mod batch;
pub mod compare;
pub mod config;
pub mod ctph;
pub mod dedup;
pub mod digest;
pub mod error;
pub mod rolling;
pub mod similarity;
pub mod token_ctph;
pub mod token_rolling;

pub use compare::{compare, compare_digests, compare_many, try_compare};
pub use config::{CtphParams, DedupConfig, TokenCtphParams};
pub use ctph::Ctph;
pub use dedup::{DedupOutcome, DeduplicationStats, DigestStore};
pub use digest::Digest;
pub use error::{Result, SimkitError};
pub use rolling::{RollingHash, RollingState};
pub use similarity::{DistanceResult, EditModel, Metric, Transposition};
pub use token_ctph::TokenCtph;
pub use token_rolling::TokenRollingHash;

/// Simkit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
