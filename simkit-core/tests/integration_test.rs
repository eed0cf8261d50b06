//! Integration tests for file hashing and deduplication
//!
//! Tests the path-based workflow: write -> hash -> compare -> deduplicate

use simkit_core::ctph::{hash_buffer, hash_file, hash_zst_file};
use simkit_core::{
    batch, compare, CtphParams, DedupConfig, DedupOutcome, DigestStore, Result, SimkitError,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Deterministic prose built from a small vocabulary
fn prose(seed: u64, words: usize) -> String {
    let vocabulary = [
        "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india",
        "juliet", "kilo", "lima", "mike", "november", "oscar", "papa", "quebec", "romeo",
        "sierra", "tango", "uniform", "victor", "whiskey", "xray", "yankee", "zulu",
    ];
    let mut state = seed;
    let mut out = Vec::with_capacity(words);
    for _ in 0..words {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        out.push(vocabulary[((state >> 33) % vocabulary.len() as u64) as usize]);
    }
    out.join(" ")
}

/// Helper to create a test directory with sample files
fn create_test_directory() -> Result<(TempDir, Vec<PathBuf>)> {
    let temp_dir = TempDir::new()?;

    let base = prose(7, 800);
    let mut edited = base.clone();
    edited.insert_str(2000, " an inserted sentence about nothing in particular ");

    let files = vec![
        ("base.txt", base.clone()),
        ("copy.txt", base),
        ("edited.txt", edited),
        ("other.txt", prose(99, 800)),
    ];

    let mut paths = Vec::new();
    for (name, content) in files {
        let path = temp_dir.path().join(name);
        let mut file = File::create(&path)?;
        file.write_all(content.as_bytes())?;
        paths.push(path);
    }

    Ok((temp_dir, paths))
}

#[test]
fn test_hash_file_matches_buffer() -> Result<()> {
    let (_dir, paths) = create_test_directory()?;

    for path in &paths {
        let content = fs::read(path)?;
        assert_eq!(hash_file(path, 16, 64, 8)?, hash_buffer(&content, 16, 64, 8)?);
    }

    Ok(())
}

#[test]
fn test_missing_file() {
    let result = hash_file("/definitely/not/here.txt", 16, 64, 8);
    assert!(matches!(result, Err(SimkitError::FileNotFound(_))));
}

#[test]
fn test_invalid_parameters_before_io() {
    let result = hash_file("/definitely/not/here.txt", 0, 64, 8);
    assert!(matches!(result, Err(SimkitError::InvalidParameter(_))));
}

#[test]
fn test_zstd_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let content = prose(3, 500);
    let compressed = zstd::encode_all(content.as_bytes(), 3)?;

    let path = temp_dir.path().join("content.txt.zst");
    fs::write(&path, compressed)?;

    assert_eq!(
        hash_zst_file(&path, 16, 64, 8)?,
        hash_buffer(content.as_bytes(), 16, 64, 8)?
    );

    Ok(())
}

#[test]
fn test_corrupt_zstd_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("broken.zst");
    fs::write(&path, b"this is not zstd")?;

    let result = hash_zst_file(&path, 16, 64, 8);
    assert!(matches!(result, Err(SimkitError::Compression(_))));

    Ok(())
}

#[test]
fn test_file_similarity_ordering() -> Result<()> {
    let (_dir, paths) = create_test_directory()?;

    let mut near = Vec::new();
    let mut far = Vec::new();
    for window_size in [16, 32, 64, 128] {
        for precision in [8, 16, 32, 64] {
            for digest_size in [8, 16, 32, 64] {
                let digest = |i: usize| {
                    hash_file(&paths[i], window_size, digest_size, precision).map(|d| d.to_string())
                };
                let (base, copy, edited, other) = (digest(0)?, digest(1)?, digest(2)?, digest(3)?);

                assert_eq!(compare(&base, &copy), 1.0);
                assert_eq!(compare(&edited, &base), compare(&base, &edited));
                near.push(compare(&base, &edited));
                far.push(compare(&base, &other));
            }
        }
    }

    let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
    let (near, far) = (mean(&near), mean(&far));
    assert!(near > 0.075, "near-duplicate mean {near}");
    assert!(near > far, "near {near} should exceed unrelated {far}");

    Ok(())
}

#[test]
fn test_batch_hash_files() -> Result<()> {
    let (dir, mut paths) = create_test_directory()?;
    paths.push(dir.path().join("missing.txt"));

    let results = batch::hash_files(&paths, CtphParams::default())?;
    assert_eq!(results.len(), paths.len());

    for ((path, result), expected) in results.iter().zip(&paths) {
        assert_eq!(path, expected);
        if path.ends_with("missing.txt") {
            assert!(matches!(result, Err(SimkitError::FileNotFound(_))));
        } else {
            assert_eq!(result.as_ref().ok(), Some(&hash_file(path, 16, 64, 8)?));
        }
    }

    Ok(())
}

#[test]
fn test_dedup_files() -> Result<()> {
    let (_dir, paths) = create_test_directory()?;
    let mut store = DigestStore::new(DedupConfig::default())?;

    let outcomes = paths
        .iter()
        .map(|path| store.add_file(path))
        .collect::<Result<Vec<_>>>()?;

    let base_id = paths[0].display().to_string();
    assert_eq!(outcomes[0], DedupOutcome::Unique);
    assert_eq!(outcomes[1], DedupOutcome::ExactDuplicate { of: base_id.clone() });
    assert!(matches!(&outcomes[2], DedupOutcome::NearDuplicate { of, .. } if *of == base_id));
    assert_eq!(outcomes[3], DedupOutcome::Unique);

    let stats = store.stats();
    assert_eq!(stats.total_documents, 4);
    assert_eq!(stats.unique_documents, 2);
    assert_eq!(stats.exact_duplicates, 1);
    assert_eq!(stats.near_duplicates, 1);
    assert!(stats.savings_percent() > 0.0);

    Ok(())
}

#[test]
fn test_dedup_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("dedup.json");
    fs::write(&path, r#"{"near_threshold": 0.9, "params": {"window_size": 8}}"#)?;

    let config = DedupConfig::from_json_file(&path)?;
    assert_eq!(config.near_threshold, 0.9);
    assert_eq!(config.params.window_size, 8);
    assert_eq!(config.params.digest_size, 64);

    let store = DigestStore::new(config)?;
    assert!(store.is_empty());

    Ok(())
}
