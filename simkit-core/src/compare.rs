//! Fuzzy digest comparison
//!
//! Two digests are scored by aligning their chunk-symbol strings with
//! Levenshtein distance and inverting the normalized cost. Digests at the
//! same precision take the better of the primary and secondary alignments;
//! digests one doubling apart
//! compare the finer digest's coarse stream with the coarser digest's
//! primary stream. Anything further apart, or built with a different window
//! or alphabet, is still scored but attenuated toward zero.

use crate::digest::Digest;
use crate::similarity::Metric;
use crate::Result;
use rayon::prelude::*;

/// Factor applied per mismatched `window_size` / `digest_size`
pub const MISMATCH_PENALTY: f64 = 0.5;

/// Similarity of two symbol strings in `[0, 1]`
fn symbol_similarity(a: &str, b: &str) -> f64 {
    Metric::Levenshtein.distance_of(a.as_bytes(), b.as_bytes()).similarity()
}

fn aligned_similarity(a: &Digest, b: &Digest) -> f64 {
    let (pa, pb) = (a.precision(), b.precision());

    if pa == pb {
        let fine = symbol_similarity(a.primary(), b.primary());
        if a.secondary().is_empty() && b.secondary().is_empty() {
            return fine;
        }
        let coarse = symbol_similarity(a.secondary(), b.secondary());
        return fine.max(coarse);
    }
    if let Some(coarse) = a.symbols_at(pb) {
        return symbol_similarity(coarse, b.primary());
    }
    if let Some(coarse) = b.symbols_at(pa) {
        return symbol_similarity(a.primary(), coarse);
    }

    tracing::debug!("Comparing digests at distant precisions {} and {}", pa, pb);
    let ratio = pa.min(pb) as f64 / pa.max(pb) as f64;
    symbol_similarity(a.primary(), b.primary()) * ratio
}

/// Similarity of two parsed digests in `[0, 1]`; symmetric, and 1.0 for equal digests
pub fn compare_digests(a: &Digest, b: &Digest) -> f64 {
    if a == b {
        return 1.0;
    }

    let mut score = aligned_similarity(a, b);

    if a.window_size() != b.window_size() {
        tracing::warn!(
            "Comparing digests with different window sizes ({} vs {})",
            a.window_size(),
            b.window_size()
        );
        score *= MISMATCH_PENALTY;
    }
    if a.digest_size() != b.digest_size() {
        tracing::warn!(
            "Comparing digests with different digest sizes ({} vs {})",
            a.digest_size(),
            b.digest_size()
        );
        score *= MISMATCH_PENALTY;
    }

    score.clamp(0.0, 1.0)
}

/// Compare two digest strings, failing with `TypeMismatch` on malformed input
pub fn try_compare(a: &str, b: &str) -> Result<f64> {
    let a: Digest = a.parse()?;
    let b: Digest = b.parse()?;
    Ok(compare_digests(&a, &b))
}

/// Compare two digest strings; malformed input scores 0.0
pub fn compare(a: &str, b: &str) -> f64 {
    match try_compare(a, b) {
        Ok(score) => score,
        Err(e) => {
            tracing::warn!("Cannot compare digests: {}", e);
            0.0
        }
    }
}

/// Compare many digest pairs in parallel; scores keep the input order
pub fn compare_many<A, B>(pairs: &[(A, B)]) -> Vec<f64>
where
    A: AsRef<str> + Sync,
    B: AsRef<str> + Sync,
{
    pairs
        .par_iter()
        .map(|(a, b)| compare(a.as_ref(), b.as_ref()))
        .collect()
}
