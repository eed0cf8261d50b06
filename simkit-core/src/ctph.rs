//! Context-Triggered Piecewise Hashing (CTPH) over bytes
//!
//! A rolling hash slides over the input; wherever `hash % p == p - 1` the
//! current chunk ends (inclusive) and is summarized into one symbol. Because
//! boundaries depend only on the bytes inside the window, a local edit moves
//! at most the chunks around it and the rest of the digest is unchanged.
//!
//! Two chunk streams are produced in the same pass, at `p` and `2p`. When the
//! `p` stream grows past [`MAX_DIGEST_SYMBOLS`], `p` is doubled and the input
//! is chunked again, so digest length stays bounded while similarly sized
//! inputs land on the same (or an adjacent) precision.

use crate::config::CtphParams;
use crate::digest::{symbol_for, Digest, MAX_DIGEST_SYMBOLS};
use crate::rolling::{RollingState, RollingSymbol};
use crate::{Result, SimkitError};
use sha2::{Digest as _, Sha256};
use std::io::Read;
use std::path::Path;

pub use crate::compare::compare;

/// First 8 bytes of a SHA-256 digest as a big-endian integer
pub(crate) fn sha256_prefix(hasher: Sha256) -> u64 {
    let hash = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(prefix)
}

fn summarize_bytes(chunk: &[u8]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(chunk);
    sha256_prefix(hasher)
}

/// Smallest `precision * 2^k` whose expected chunk count fits the symbol cap
fn initial_precision(len: usize, precision: u64) -> u64 {
    let mut p = precision;
    while (len as u64) / p > MAX_DIGEST_SYMBOLS as u64 && p <= u64::MAX / 4 {
        p *= 2;
    }
    p
}

/// Split `items` at rolling-hash triggers, returning the `p` and `2p` symbol streams
fn split_at_triggers<S, F>(
    items: &[S],
    window_size: usize,
    digest_size: usize,
    precision: u64,
    summarize: &F,
) -> Result<(String, String)>
where
    S: RollingSymbol,
    F: Fn(&[S]) -> u64,
{
    let mut state = RollingState::<S>::new(window_size)?;
    let coarse = precision.saturating_mul(2);

    let mut primary = String::new();
    let mut secondary = String::new();
    let mut fine_start = 0;
    let mut coarse_start = 0;

    for (i, &item) in items.iter().enumerate() {
        let hash = state.update(item);

        if hash % precision == precision - 1 {
            primary.push(symbol_for(summarize(&items[fine_start..=i]), digest_size));
            fine_start = i + 1;
        }
        if hash % coarse == coarse - 1 {
            secondary.push(symbol_for(summarize(&items[coarse_start..=i]), digest_size));
            coarse_start = i + 1;
        }
    }

    // Trailing partial chunks
    if fine_start < items.len() {
        primary.push(symbol_for(summarize(&items[fine_start..]), digest_size));
    }
    if coarse_start < items.len() {
        secondary.push(symbol_for(summarize(&items[coarse_start..]), digest_size));
    }

    Ok((primary, secondary))
}

/// Shared piecewise digest construction for bytes and tokens
pub(crate) fn piecewise_digest<S, F>(
    items: &[S],
    window_size: usize,
    digest_size: usize,
    precision: u64,
    summarize: F,
) -> Result<Digest>
where
    S: RollingSymbol,
    F: Fn(&[S]) -> u64,
{
    let mut effective = initial_precision(items.len(), precision);

    loop {
        let (primary, secondary) =
            split_at_triggers(items, window_size, digest_size, effective, &summarize)?;

        if primary.len() <= MAX_DIGEST_SYMBOLS || effective > u64::MAX / 4 {
            tracing::debug!(
                "Digested {} elements: precision {} (requested {}), {} + {} symbols",
                items.len(),
                effective,
                precision,
                primary.len(),
                secondary.len()
            );
            return Ok(Digest::new(window_size, digest_size, effective, primary, secondary));
        }

        effective *= 2;
    }
}

/// Byte-level CTPH hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct Ctph {
    params: CtphParams,
}

impl Ctph {
    /// Create a hasher, rejecting zero or out-of-range parameters
    pub fn new(window_size: usize, digest_size: usize, precision: u64) -> Result<Self> {
        Self::with_params(CtphParams::new(window_size, digest_size, precision))
    }

    pub fn with_params(params: CtphParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &CtphParams {
        &self.params
    }

    /// Digest a byte buffer
    pub fn compute(&self, data: &[u8]) -> Result<Digest> {
        piecewise_digest(
            data,
            self.params.window_size,
            self.params.digest_size,
            self.params.precision,
            summarize_bytes,
        )
    }

    /// Digest a file's content; the handle is closed before hashing starts
    pub fn compute_file(&self, path: impl AsRef<Path>) -> Result<Digest> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| SimkitError::from_io_at(e, path))?;
        self.compute(&data)
    }

    /// Digest the decompressed content of a zstd-compressed file
    pub fn compute_zst_file(&self, path: impl AsRef<Path>) -> Result<Digest> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| SimkitError::from_io_at(e, path))?;
        let mut decoder = zstd::stream::read::Decoder::new(file)
            .map_err(|e| SimkitError::Compression(e.to_string()))?;
        let mut data = Vec::new();
        decoder
            .read_to_end(&mut data)
            .map_err(|e| SimkitError::Compression(e.to_string()))?;
        self.compute(&data)
    }
}

/// Compute the CTPH digest of a byte buffer
pub fn hash_buffer(
    bytes: &[u8],
    window_size: usize,
    digest_size: usize,
    precision: u64,
) -> Result<Digest> {
    Ctph::new(window_size, digest_size, precision)?.compute(bytes)
}

/// Compute the CTPH digest of a string's UTF-8 bytes
pub fn hash_str(s: &str, window_size: usize, digest_size: usize, precision: u64) -> Result<Digest> {
    hash_buffer(s.as_bytes(), window_size, digest_size, precision)
}

/// Compute the CTPH digest of a file
pub fn hash_file(
    path: impl AsRef<Path>,
    window_size: usize,
    digest_size: usize,
    precision: u64,
) -> Result<Digest> {
    Ctph::new(window_size, digest_size, precision)?.compute_file(path)
}

/// Compute the CTPH digest of a zstd-compressed file's content
pub fn hash_zst_file(
    path: impl AsRef<Path>,
    window_size: usize,
    digest_size: usize,
    precision: u64,
) -> Result<Digest> {
    Ctph::new(window_size, digest_size, precision)?.compute_zst_file(path)
}
