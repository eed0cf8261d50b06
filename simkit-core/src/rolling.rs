//! Rolling hash over a sliding window
//!
//! A cyclic polynomial (buzhash) hash that is updated in O(1) per element:
//! the incoming element is mixed in, and the element leaving the window is
//! cancelled out by XOR-ing its rotated contribution. The state is an
//! ordinary value, so independent hashing runs never share anything.
//!
//! The same state machine serves bytes and token IDs through the
//! [`RollingSymbol`] trait.

use crate::{Result, SimkitError};
use std::path::Path;

/// splitmix64 finalizer, used for every scrambling step in this crate
pub(crate) const fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

const fn byte_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = splitmix64(i as u64);
        i += 1;
    }
    table
}

/// Pre-scrambled values for every byte
static BYTE_TABLE: [u64; 256] = byte_table();

/// An element that can be fed to a rolling hash
pub trait RollingSymbol: Copy {
    /// Map the element to a well-distributed 64-bit value
    fn scramble(self) -> u64;
}

impl RollingSymbol for u8 {
    #[inline]
    fn scramble(self) -> u64 {
        BYTE_TABLE[self as usize]
    }
}

impl RollingSymbol for i64 {
    #[inline]
    fn scramble(self) -> u64 {
        splitmix64(self as u64)
    }
}

impl RollingSymbol for u32 {
    #[inline]
    fn scramble(self) -> u64 {
        splitmix64(self as u64)
    }
}

/// Rolling window state: trailing elements, running hash and element count
#[derive(Debug, Clone)]
pub struct RollingState<S> {
    /// Ring buffer holding at most `window_size` elements
    window: Vec<S>,
    /// Slot holding the oldest element once the window is full
    head: usize,
    window_size: usize,
    hash: u64,
    count: u64,
}

/// Ring buffer slots reserved up front; larger windows grow as elements arrive
const PREALLOCATED_WINDOW: usize = 4096;

/// Byte-level rolling hash
pub type RollingHash = RollingState<u8>;

impl<S: RollingSymbol> RollingState<S> {
    /// Create an empty state; `window_size` must be positive
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(SimkitError::zero("window_size"));
        }
        Ok(Self {
            window: Vec::with_capacity(window_size.min(PREALLOCATED_WINDOW)),
            head: 0,
            window_size,
            hash: 0,
            count: 0,
        })
    }

    /// Create a state that has consumed all of `data`
    pub fn from_slice(data: &[S], window_size: usize) -> Result<Self> {
        let mut state = Self::new(window_size)?;
        for &symbol in data {
            state.update(symbol);
        }
        Ok(state)
    }

    /// Push one element and return the new hash
    #[inline]
    pub fn update(&mut self, symbol: S) -> u64 {
        self.hash = self.hash.rotate_left(1) ^ symbol.scramble();

        if self.window.len() < self.window_size {
            self.window.push(symbol);
        } else {
            let outgoing = std::mem::replace(&mut self.window[self.head], symbol);
            // The outgoing element has been rotated once per step it spent in the window
            self.hash ^= outgoing.scramble().rotate_left((self.window_size % 64) as u32);
            self.head = (self.head + 1) % self.window_size;
        }

        self.count += 1;
        self.hash
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Total number of elements consumed
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.window_size
    }

    /// Elements currently in the window, oldest first
    pub fn window(&self) -> impl Iterator<Item = &S> + '_ {
        self.window[self.head..].iter().chain(self.window[..self.head].iter())
    }

    /// Clear the window, keeping the window size
    pub fn reset(&mut self) {
        self.window.clear();
        self.head = 0;
        self.hash = 0;
        self.count = 0;
    }
}

const FOLD_SEED: u64 = 0xCBF2_9CE4_8422_2325;
const FOLD_MULTIPLIER: u64 = 0x0000_0100_0000_01B3;

/// Order-sensitive accumulator folding a hash trajectory into one value
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    acc: u64,
    position: u64,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self { acc: FOLD_SEED, position: 0 }
    }
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the next trajectory value, salted by its position
    #[inline]
    pub fn push(&mut self, value: u64) {
        self.acc = self
            .acc
            .wrapping_mul(FOLD_MULTIPLIER)
            .wrapping_add(value ^ splitmix64(self.position));
        self.position += 1;
    }

    /// Final 64-bit fingerprint, bound to the sequence length and window size
    pub fn finish(&self, window_size: usize) -> u64 {
        let shape = self.position ^ (window_size as u64).rotate_left(32);
        splitmix64(self.acc ^ splitmix64(shape))
    }
}

/// Fold the full rolling trajectory of `data` into a 64-bit value
pub fn fingerprint<S: RollingSymbol>(data: &[S], window_size: usize) -> Result<u64> {
    let mut state = RollingState::<S>::new(window_size)?;
    let mut fold = Fingerprinter::new();
    for &symbol in data {
        fold.push(state.update(symbol));
    }
    Ok(fold.finish(window_size))
}

/// Fixed-width text form of a fingerprint (16 lowercase hex chars)
pub fn encode_fingerprint(value: u64) -> String {
    hex::encode(value.to_be_bytes())
}

/// Whole-buffer rolling fingerprint of a byte slice
pub fn hash_bytes(bytes: &[u8], window_size: usize) -> Result<String> {
    fingerprint(bytes, window_size).map(encode_fingerprint)
}

/// Whole-buffer rolling fingerprint of a string's UTF-8 bytes
pub fn hash_str(s: &str, window_size: usize) -> Result<String> {
    hash_bytes(s.as_bytes(), window_size)
}

/// Whole-buffer rolling fingerprint of a file's content
pub fn hash_file(path: impl AsRef<Path>, window_size: usize) -> Result<String> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| SimkitError::from_io_at(e, path))?;
    hash_bytes(&data, window_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = RollingHash::new(3).unwrap();
        assert_eq!(state.window_size(), 3);
        assert_eq!(state.hash(), 0);
        assert_eq!(state.count(), 0);
        assert_eq!(state.window().count(), 0);
    }

    #[test]
    fn test_huge_window_is_lazy() {
        let mut state = RollingHash::new(usize::MAX).unwrap();
        for &b in b"abc" {
            state.update(b);
        }
        assert!(!state.is_full());
        assert_eq!(state.window().copied().collect::<Vec<_>>(), b"abc");
        assert_eq!(hash_bytes(b"abc", usize::MAX).unwrap().len(), 16);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(
            RollingHash::new(0),
            Err(SimkitError::InvalidParameter(_))
        ));
        assert!(hash_bytes(b"abc", 0).is_err());
    }

    #[test]
    fn test_window_sliding() {
        let mut state = RollingHash::new(2).unwrap();
        state.update(b'a');
        state.update(b'b');
        assert!(state.is_full());
        assert_eq!(state.window().copied().collect::<Vec<_>>(), b"ab");

        let before = state.hash();
        state.update(b'c');
        assert_eq!(state.window().copied().collect::<Vec<_>>(), b"bc");
        assert_ne!(state.hash(), before);
        assert_eq!(state.count(), 3);
    }

    #[test]
    fn test_hash_depends_only_on_window() {
        let data = b"the quick brown fox jumps over the lazy dog";
        for window_size in [1, 3, 8, 16, 64, 65] {
            let long = RollingHash::from_slice(data, window_size).unwrap();
            let tail = &data[data.len().saturating_sub(window_size)..];
            let fresh = RollingHash::from_slice(tail, window_size).unwrap();
            assert_eq!(long.hash(), fresh.hash(), "window_size = {window_size}");
        }
    }

    #[test]
    fn test_partial_window() {
        let state = RollingHash::from_slice(b"ab", 8).unwrap();
        assert!(!state.is_full());
        assert_eq!(state.window().copied().collect::<Vec<_>>(), b"ab");
    }

    #[test]
    fn test_reset() {
        let mut state = RollingHash::from_slice(b"abcdef", 4).unwrap();
        state.reset();
        assert_eq!(state.hash(), 0);
        assert_eq!(state.count(), 0);
        assert_eq!(state.window_size(), 4);
    }

    #[test]
    fn test_hash_bytes_deterministic() {
        let a = hash_bytes(b"hello world", 4).unwrap();
        let b = hash_bytes(b"hello world", 4).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_eq!(hash_str("hello world", 4).unwrap(), a);
    }

    #[test]
    fn test_hash_bytes_distinct() {
        let a = hash_bytes(b"hello world", 4).unwrap();
        assert_ne!(a, hash_bytes(b"hello worle", 4).unwrap());
        assert_ne!(a, hash_bytes(b"hello world", 5).unwrap());
        assert_ne!(a, hash_bytes(b"hello world ", 4).unwrap());
    }

    #[test]
    fn test_empty_fingerprint() {
        let empty = hash_bytes(b"", 8).unwrap();
        assert_eq!(empty.len(), 16);
        assert_eq!(empty, hash_bytes(b"", 8).unwrap());
        assert_ne!(empty, hash_bytes(b"\0", 8).unwrap());
    }

    #[test]
    fn test_hash_file_missing() {
        let err = hash_file("/definitely/not/here.bin", 8).unwrap_err();
        assert!(matches!(err, SimkitError::FileNotFound(_)));
    }
}
