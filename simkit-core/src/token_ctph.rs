//! Context-Triggered Piecewise Hashing adapted for token arrays
//!
//! Works directly on token ID sequences instead of bytes. There is no
//! separate precision knob: `digest_size` is both the trigger modulus and the
//! symbol alphabet size, so larger digests mean longer chunks.

use crate::config::TokenCtphParams;
use crate::ctph::{piecewise_digest, sha256_prefix};
use crate::digest::Digest;
use crate::Result;
use sha2::{Digest as _, Sha256};

pub use crate::compare::compare;

fn summarize_tokens(tokens: &[i64]) -> u64 {
    let mut hasher = Sha256::new();
    for &token in tokens {
        hasher.update(token.to_le_bytes());
    }
    sha256_prefix(hasher)
}

/// Token-level CTPH hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCtph {
    params: TokenCtphParams,
}

impl TokenCtph {
    pub fn new(window_size: usize, digest_size: usize) -> Result<Self> {
        Self::with_params(TokenCtphParams::new(window_size, digest_size))
    }

    pub fn with_params(params: TokenCtphParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &TokenCtphParams {
        &self.params
    }

    pub fn compute(&self, tokens: &[i64]) -> Result<Digest> {
        piecewise_digest(
            tokens,
            self.params.window_size,
            self.params.digest_size,
            self.params.digest_size as u64,
            summarize_tokens,
        )
    }
}

/// Compute the CTPH digest of a token sequence
pub fn hash_tokens(tokens: &[i64], window_size: usize, digest_size: usize) -> Result<Digest> {
    TokenCtph::new(window_size, digest_size)?.compute(tokens)
}
