//! Data-parallel batch helpers
//!
//! Every hashing call is independent, so batches are plain rayon maps. Each
//! input gets its own `Result`; one unreadable file does not fail the batch.
//! Outputs are returned in input order.

use crate::config::{CtphParams, TokenCtphParams};
use crate::ctph::Ctph;
use crate::digest::Digest;
use crate::similarity::{DistanceResult, Metric};
use crate::token_ctph::TokenCtph;
use crate::token_rolling;
use crate::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Digest many files in parallel
pub fn hash_files<P>(paths: &[P], params: CtphParams) -> Result<Vec<(PathBuf, Result<Digest>)>>
where
    P: AsRef<Path> + Sync,
{
    let ctph = Ctph::with_params(params)?;
    tracing::info!("Hashing {} files", paths.len());

    Ok(paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            (path.to_path_buf(), ctph.compute_file(path))
        })
        .collect())
}

/// Digest many in-memory buffers in parallel
pub fn hash_buffers<B>(buffers: &[B], params: CtphParams) -> Result<Vec<Digest>>
where
    B: AsRef<[u8]> + Sync,
{
    let ctph = Ctph::with_params(params)?;
    buffers.par_iter().map(|buffer| ctph.compute(buffer.as_ref())).collect()
}

/// Token CTPH digests for many token sequences
pub fn hash_token_sequences(
    sequences: &[Vec<i64>],
    params: TokenCtphParams,
) -> Result<Vec<Digest>> {
    let ctph = TokenCtph::with_params(params)?;
    sequences.par_iter().map(|tokens| ctph.compute(tokens)).collect()
}

/// Whole-sequence token fingerprints for many sequences
pub fn fingerprint_token_sequences(
    sequences: &[Vec<i64>],
    window_size: usize,
) -> Result<Vec<String>> {
    sequences
        .par_iter()
        .map(|tokens| token_rolling::hash_tokens(tokens, window_size))
        .collect()
}

/// Edit distances for many string pairs
pub fn distances<A, B>(metric: Metric, pairs: &[(A, B)]) -> Vec<DistanceResult>
where
    A: AsRef<str> + Sync,
    B: AsRef<str> + Sync,
{
    pairs
        .par_iter()
        .map(|(a, b)| metric.distance(a.as_ref(), b.as_ref()))
        .collect()
}
