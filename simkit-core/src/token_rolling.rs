//! Rolling hash over LLM token ID sequences
//!
//! Token IDs are treated exactly like bytes in [`crate::rolling`]; only the
//! alphabet differs. The whole trajectory folds into one fixed-width
//! fingerprint, suitable as an exact-duplicate screening key.

use crate::rolling::{encode_fingerprint, fingerprint, RollingState};
use crate::Result;

/// Rolling hash over signed token IDs
pub type TokenRollingHash = RollingState<i64>;

/// Fingerprint a token sequence (16 hex chars)
///
/// Fails only when `window_size` is zero. An empty sequence yields the
/// fingerprint of the seed state.
pub fn hash_tokens(tokens: &[i64], window_size: usize) -> Result<String> {
    fingerprint(tokens, window_size).map(encode_fingerprint)
}

/// Fingerprint unsigned token IDs, as produced by most tokenizers
pub fn hash_token_ids(tokens: &[u32], window_size: usize) -> Result<String> {
    fingerprint(tokens, window_size).map(encode_fingerprint)
}
