//! Fuzzy digest value
//!
//! A digest is a pair of chunk-symbol strings plus the parameters needed to
//! interpret them. Its text form is
//!
//! ```text
//! window_size:digest_size:precision:primary:secondary
//! ```
//!
//! `primary` holds one symbol per chunk at the effective `precision`;
//! `secondary` holds one symbol per chunk at twice that precision, which lets
//! digests whose precisions differ by a factor of two still be aligned.

use crate::{Result, SimkitError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest supported symbol alphabet
pub const MAX_DIGEST_SIZE: usize = 64;

/// Primary symbol count above which the effective precision is doubled
pub const MAX_DIGEST_SYMBOLS: usize = 128;

const ALPHABET: &[u8; MAX_DIGEST_SIZE] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Map a chunk hash onto one of `digest_size` symbols
pub(crate) fn symbol_for(value: u64, digest_size: usize) -> char {
    ALPHABET[(value % digest_size as u64) as usize] as char
}

fn symbol_index(symbol: u8) -> Option<usize> {
    ALPHABET.iter().position(|&c| c == symbol)
}

/// An immutable fuzzy digest produced by a piecewise chunker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Digest {
    window_size: usize,
    digest_size: usize,
    precision: u64,
    primary: String,
    secondary: String,
}

impl Digest {
    pub(crate) fn new(
        window_size: usize,
        digest_size: usize,
        precision: u64,
        primary: String,
        secondary: String,
    ) -> Self {
        Self { window_size, digest_size, precision, primary, secondary }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn digest_size(&self) -> usize {
        self.digest_size
    }

    /// Effective precision, after any hierarchical halving
    pub fn precision(&self) -> u64 {
        self.precision
    }

    /// Symbols at the effective precision
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Symbols at twice the effective precision
    pub fn secondary(&self) -> &str {
        &self.secondary
    }

    /// Symbols chunked at `precision`, if this digest carries that level
    pub fn symbols_at(&self, precision: u64) -> Option<&str> {
        if precision == self.precision {
            Some(&self.primary)
        } else if Some(precision) == self.precision.checked_mul(2) {
            Some(&self.secondary)
        } else {
            None
        }
    }

    /// True when the digest was built from empty input
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Parse a digest, reporting malformed text as `TypeMismatch`
    pub fn parse(text: &str) -> Result<Self> {
        text.parse()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.window_size, self.digest_size, self.precision, self.primary, self.secondary
        )
    }
}

fn parse_field<T: FromStr>(field: &str, name: &str, text: &str) -> Result<T> {
    field.parse().map_err(|_| {
        SimkitError::TypeMismatch(format!("invalid {name} {field:?} in digest {text:?}"))
    })
}

fn check_symbols(symbols: &str, digest_size: usize, text: &str) -> Result<()> {
    for &b in symbols.as_bytes() {
        match symbol_index(b) {
            Some(index) if index < digest_size => {}
            _ => {
                return Err(SimkitError::TypeMismatch(format!(
                    "symbol {:?} outside a {digest_size}-symbol alphabet in digest {text:?}",
                    b as char
                )))
            }
        }
    }
    Ok(())
}

impl FromStr for Digest {
    type Err = SimkitError;

    fn from_str(text: &str) -> Result<Self> {
        let fields: Vec<&str> = text.split(':').collect();
        let [window, digest_size, precision, primary, secondary] = fields.as_slice() else {
            return Err(SimkitError::TypeMismatch(format!(
                "expected 5 ':'-separated fields in digest {text:?}, found {}",
                fields.len()
            )));
        };

        let window_size: usize = parse_field(window, "window_size", text)?;
        let digest_size: usize = parse_field(digest_size, "digest_size", text)?;
        let precision: u64 = parse_field(precision, "precision", text)?;

        if window_size == 0 || precision == 0 || digest_size == 0 || digest_size > MAX_DIGEST_SIZE {
            return Err(SimkitError::TypeMismatch(format!(
                "out-of-range parameters in digest {text:?}"
            )));
        }

        check_symbols(primary, digest_size, text)?;
        check_symbols(secondary, digest_size, text)?;

        Ok(Self::new(
            window_size,
            digest_size,
            precision,
            primary.to_string(),
            secondary.to_string(),
        ))
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_string()
    }
}

impl TryFrom<String> for Digest {
    type Error = SimkitError;

    fn try_from(text: String) -> Result<Self> {
        text.parse()
    }
}
