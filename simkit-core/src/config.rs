//! Hashing and deduplication parameters
//!
//! All parameter sets are plain serde structs with sensible defaults, so they
//! can be built in code or loaded from a JSON file.

use crate::digest::MAX_DIGEST_SIZE;
use crate::{Result, SimkitError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default rolling window size (bytes or tokens)
pub const DEFAULT_WINDOW_SIZE: usize = 16;
/// Default byte digest alphabet size
pub const DEFAULT_DIGEST_SIZE: usize = 64;
/// Default trigger modulus for byte chunking
pub const DEFAULT_PRECISION: u64 = 8;
/// Default token digest alphabet size (also the token trigger modulus)
pub const DEFAULT_TOKEN_DIGEST_SIZE: usize = 16;
/// Default near-duplicate threshold
pub const DEFAULT_NEAR_THRESHOLD: f64 = 0.5;

fn check_window_size(window_size: usize) -> Result<()> {
    if window_size == 0 {
        return Err(SimkitError::zero("window_size"));
    }
    Ok(())
}

fn check_digest_size(digest_size: usize) -> Result<()> {
    if digest_size == 0 {
        return Err(SimkitError::zero("digest_size"));
    }
    if digest_size > MAX_DIGEST_SIZE {
        return Err(SimkitError::InvalidParameter(format!(
            "digest_size must be at most {MAX_DIGEST_SIZE}, got {digest_size}"
        )));
    }
    Ok(())
}

/// Parameters for byte-level context-triggered piecewise hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtphParams {
    /// Rolling hash window in bytes
    pub window_size: usize,
    /// Number of distinct chunk symbols
    pub digest_size: usize,
    /// Trigger modulus; roughly the expected chunk length in bytes
    pub precision: u64,
}

impl Default for CtphParams {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            digest_size: DEFAULT_DIGEST_SIZE,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl CtphParams {
    /// Create parameters without validating them
    pub fn new(window_size: usize, digest_size: usize, precision: u64) -> Self {
        Self { window_size, digest_size, precision }
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_digest_size(mut self, digest_size: usize) -> Self {
        self.digest_size = digest_size;
        self
    }

    pub fn with_precision(mut self, precision: u64) -> Self {
        self.precision = precision;
        self
    }

    /// Reject zero or out-of-range values
    pub fn validate(&self) -> Result<()> {
        check_window_size(self.window_size)?;
        check_digest_size(self.digest_size)?;
        if self.precision == 0 {
            return Err(SimkitError::zero("precision"));
        }
        Ok(())
    }
}

/// Parameters for token-level piecewise hashing
///
/// `digest_size` doubles as the trigger modulus, so it controls both the
/// symbol alphabet and the expected chunk length in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenCtphParams {
    pub window_size: usize,
    pub digest_size: usize,
}

impl Default for TokenCtphParams {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            digest_size: DEFAULT_TOKEN_DIGEST_SIZE,
        }
    }
}

impl TokenCtphParams {
    pub fn new(window_size: usize, digest_size: usize) -> Self {
        Self { window_size, digest_size }
    }

    pub fn validate(&self) -> Result<()> {
        check_window_size(self.window_size)?;
        check_digest_size(self.digest_size)
    }
}

/// Configuration for near-duplicate detection over documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Parameters used to digest every document
    pub params: CtphParams,
    /// Minimum digest similarity to report a near duplicate
    pub near_threshold: f64,
    /// Window used for the exact-match fingerprint
    pub fingerprint_window: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            params: CtphParams::default(),
            near_threshold: DEFAULT_NEAR_THRESHOLD,
            fingerprint_window: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl DedupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: CtphParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_near_threshold(mut self, threshold: f64) -> Self {
        self.near_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        check_window_size(self.fingerprint_window)?;
        if !(0.0..=1.0).contains(&self.near_threshold) {
            return Err(SimkitError::InvalidParameter(format!(
                "near_threshold must lie in [0, 1], got {}",
                self.near_threshold
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SimkitError::from_io_at(e, path))?;
        Self::from_json_str(&json)
    }
}

impl CtphParams {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }
}

impl TokenCtphParams {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }
}
