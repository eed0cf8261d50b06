//! Deduplication of documents by fingerprint and fuzzy digest
//!
//! Stores each unique document once. A new document is an exact duplicate
//! when its rolling fingerprint and length match a stored one, a near
//! duplicate when its best digest similarity reaches the configured
//! threshold, and unique otherwise.

use crate::compare::compare_digests;
use crate::config::DedupConfig;
use crate::ctph::Ctph;
use crate::digest::Digest;
use crate::rolling;
use crate::{Result, SimkitError};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Classification of a document added to the store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DedupOutcome {
    Unique,
    ExactDuplicate { of: String },
    NearDuplicate { of: String, score: f64 },
}

impl DedupOutcome {
    pub fn is_unique(&self) -> bool {
        matches!(self, DedupOutcome::Unique)
    }
}

/// A unique document kept by the store
#[derive(Debug, Clone, Serialize)]
pub struct DocumentEntry {
    pub id: String,
    /// Whole-content rolling fingerprint (hex)
    pub fingerprint: String,
    pub digest: Digest,
    /// Content length in bytes
    pub length: usize,
}

/// Deduplication statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct DeduplicationStats {
    /// Total documents seen
    pub total_documents: usize,
    /// Unique documents stored
    pub unique_documents: usize,
    /// Documents identical to a stored one
    pub exact_duplicates: usize,
    /// Documents similar enough to a stored one
    pub near_duplicates: usize,
    /// Total bytes before deduplication
    pub total_bytes: usize,
    /// Bytes held by unique documents
    pub unique_bytes: usize,
}

impl DeduplicationStats {
    /// Calculate space savings percentage
    pub fn savings_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let saved = self.total_bytes - self.unique_bytes;
        (saved as f64 / self.total_bytes as f64) * 100.0
    }
}

/// Document store with exact and near-duplicate detection
#[derive(Debug, Clone)]
pub struct DigestStore {
    config: DedupConfig,
    ctph: Ctph,
    /// Unique documents in insertion order
    entries: Vec<DocumentEntry>,
    /// `fingerprint:length` -> entry index
    by_fingerprint: HashMap<String, usize>,
    /// id -> entry index
    by_id: HashMap<String, usize>,
    stats: DeduplicationStats,
}

impl DigestStore {
    /// Create an empty store, validating the configuration
    pub fn new(config: DedupConfig) -> Result<Self> {
        config.validate()?;
        let ctph = Ctph::with_params(config.params)?;
        Ok(Self {
            config,
            ctph,
            entries: Vec::new(),
            by_fingerprint: HashMap::new(),
            by_id: HashMap::new(),
            stats: DeduplicationStats::default(),
        })
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Best-scoring stored entry; ties go to the earliest insertion
    fn best_match(&self, digest: &Digest) -> Option<(usize, f64)> {
        self.entries
            .par_iter()
            .enumerate()
            .map(|(i, entry)| (i, compare_digests(digest, &entry.digest)))
            .reduce_with(|a, b| if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) { b } else { a })
    }

    /// Classify a document and store it if it is unique
    ///
    /// Ids of stored documents are unique; adding under a stored id fails
    /// with `InvalidParameter` and leaves the store unchanged.
    pub fn add(&mut self, id: impl Into<String>, content: &[u8]) -> Result<DedupOutcome> {
        let id = id.into();
        if self.by_id.contains_key(&id) {
            return Err(SimkitError::InvalidParameter(format!(
                "document id {id:?} is already stored"
            )));
        }

        self.stats.total_documents += 1;
        self.stats.total_bytes += content.len();

        let fingerprint = rolling::hash_bytes(content, self.config.fingerprint_window)?;
        let key = format!("{}:{}", fingerprint, content.len());

        if let Some(&index) = self.by_fingerprint.get(&key) {
            self.stats.exact_duplicates += 1;
            let of = self.entries[index].id.clone();
            tracing::debug!("{} is an exact duplicate of {}", id, of);
            return Ok(DedupOutcome::ExactDuplicate { of });
        }

        let digest = self.ctph.compute(content)?;

        if let Some((index, score)) = self.best_match(&digest) {
            if score >= self.config.near_threshold {
                self.stats.near_duplicates += 1;
                let of = self.entries[index].id.clone();
                tracing::debug!("{} is a near duplicate of {} ({:.3})", id, of, score);
                return Ok(DedupOutcome::NearDuplicate { of, score });
            }
        }

        let index = self.entries.len();
        self.by_fingerprint.insert(key, index);
        self.by_id.insert(id.clone(), index);
        self.entries.push(DocumentEntry {
            id,
            fingerprint,
            digest,
            length: content.len(),
        });
        self.stats.unique_documents += 1;
        self.stats.unique_bytes += content.len();

        Ok(DedupOutcome::Unique)
    }

    /// Read a file and add it under its path
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<DedupOutcome> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| SimkitError::from_io_at(e, path))?;
        self.add(path.display().to_string(), &content)
    }

    /// Get a unique document by id
    pub fn get(&self, id: &str) -> Option<&DocumentEntry> {
        self.by_id.get(id).map(|&index| &self.entries[index])
    }

    /// Check if a unique document with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Unique documents in insertion order
    pub fn entries(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.entries.iter()
    }

    /// Get the number of unique documents
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get deduplication statistics
    pub fn stats(&self) -> &DeduplicationStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DigestStore {
        DigestStore::new(DedupConfig::default()).unwrap()
    }

    fn words(seed: u64, count: usize) -> Vec<u8> {
        let vocabulary = [
            "court", "held", "that", "the", "statute", "applies", "to", "every", "contract",
            "under", "section", "notice", "party", "shall", "provide", "written", "within",
            "days", "of", "receipt",
        ];
        let mut state = seed;
        let mut out = Vec::new();
        for _ in 0..count {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            out.extend_from_slice(vocabulary[((state >> 33) % 20) as usize].as_bytes());
            out.push(b' ');
        }
        out
    }

    #[test]
    fn test_exact_duplicate() {
        let mut store = store();
        let content = b"This is test content for deduplication";

        assert_eq!(store.add("a", content).unwrap(), DedupOutcome::Unique);
        assert_eq!(
            store.add("b", content).unwrap(),
            DedupOutcome::ExactDuplicate { of: "a".into() }
        );

        let stats = store.stats();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.unique_documents, 1);
        assert_eq!(stats.exact_duplicates, 1);
        assert_eq!(store.len(), 1);
        assert!(store.contains("a"));
        assert!(!store.contains("b"));
    }

    #[test]
    fn test_near_duplicate() {
        let mut store = store();
        let original = words(1, 600);
        let mut edited = original.clone();
        edited.splice(1500..1500, b"an inserted clause ".iter().copied());

        assert!(store.add("original", &original).unwrap().is_unique());
        match store.add("edited", &edited).unwrap() {
            DedupOutcome::NearDuplicate { of, score } => {
                assert_eq!(of, "original");
                assert!(score >= 0.5 && score < 1.0);
            }
            other => panic!("expected near duplicate, got {other:?}"),
        }
        assert_eq!(store.stats().near_duplicates, 1);
    }

    #[test]
    fn test_unrelated_documents_are_unique() {
        let mut store = store();
        assert!(store.add("one", &words(1, 600)).unwrap().is_unique());
        assert!(store.add("two", &words(2, 600)).unwrap().is_unique());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("two").unwrap().length, words(2, 600).len());
    }

    #[test]
    fn test_stats_savings() {
        let mut store = store();
        store.add("a", &[1, 2, 3, 4, 5]).unwrap();
        store.add("b", &[1, 2, 3, 4, 5]).unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_bytes, 10);
        assert_eq!(stats.unique_bytes, 5);
        assert_eq!(stats.savings_percent(), 50.0);
        assert_eq!(DeduplicationStats::default().savings_percent(), 0.0);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut store = store();
        store.add("doc", &words(1, 600)).unwrap();

        let err = store.add("doc", &words(2, 600)).unwrap_err();
        assert!(matches!(err, SimkitError::InvalidParameter(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().total_documents, 1);
        assert_eq!(store.get("doc").unwrap().length, words(1, 600).len());

        // Ids of unstored duplicates stay free
        store.add("copy", &words(1, 600)).unwrap();
        assert!(store.add("copy", &words(3, 600)).unwrap().is_unique());
    }

    #[test]
    fn test_invalid_config() {
        let config = DedupConfig::default().with_near_threshold(-0.1);
        assert!(DigestStore::new(config).is_err());
    }
}
