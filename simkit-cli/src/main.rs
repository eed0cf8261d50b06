//! Simkit CLI - fuzzy hashing, digest comparison and edit distances
//!
//! Usage:
//!   simkit hash <files...> [-w N -d N -p N] [--zstd] [--json]
//!   simkit token-hash <tokens.json> [-w N] [--ctph -d N]
//!   simkit compare <digest-a> <digest-b>
//!   simkit distance <metric> <a> <b> [--json]
//!   simkit dedup <files...> [--threshold T] [--config cfg.json]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use simkit_core::config::{
    DEFAULT_DIGEST_SIZE, DEFAULT_PRECISION, DEFAULT_TOKEN_DIGEST_SIZE, DEFAULT_WINDOW_SIZE,
};
use simkit_core::{
    batch, token_ctph, token_rolling, Ctph, CtphParams, DedupConfig, DedupOutcome, DigestStore,
    Metric,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simkit")]
#[command(about = "Simkit - fuzzy hashing and string similarity", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute CTPH digests of files
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Rolling hash window size
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_SIZE)]
        window_size: usize,

        /// Symbol alphabet size (1-64)
        #[arg(short, long, default_value_t = DEFAULT_DIGEST_SIZE)]
        digest_size: usize,

        /// Minimum trigger modulus
        #[arg(short, long, default_value_t = DEFAULT_PRECISION)]
        precision: u64,

        /// Inputs are zstd-compressed
        #[arg(long)]
        zstd: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Hash a JSON array of token IDs
    TokenHash {
        /// JSON file holding an array of integers
        tokens: PathBuf,

        /// Rolling hash window size
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_SIZE)]
        window_size: usize,

        /// Compute a token CTPH digest instead of a fingerprint
        #[arg(long)]
        ctph: bool,

        /// Token digest size (1-64), used with --ctph
        #[arg(short, long, default_value_t = DEFAULT_TOKEN_DIGEST_SIZE)]
        digest_size: usize,
    },

    /// Compare two digests
    Compare {
        /// First digest
        a: String,

        /// Second digest
        b: String,
    },

    /// Edit distance between two strings
    Distance {
        /// hamming, levenshtein, osa or damerau-levenshtein
        metric: Metric,

        /// First string
        a: String,

        /// Second string
        b: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find exact and near-duplicate files
    Dedup {
        /// Files to check, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Near-duplicate similarity threshold (0-1)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// JSON deduplication config
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Hash { files, window_size, digest_size, precision, zstd, json } => {
            let params = CtphParams::new(window_size, digest_size, precision);
            hash_files(&files, params, zstd, json)
        }
        Commands::TokenHash { tokens, window_size, ctph, digest_size } => {
            hash_token_file(&tokens, window_size, ctph.then_some(digest_size))
        }
        Commands::Compare { a, b } => compare_digests(&a, &b),
        Commands::Distance { metric, a, b, json } => show_distance(metric, &a, &b, json),
        Commands::Dedup { files, threshold, config } => {
            dedup_files(&files, threshold, config.as_deref())
        }
    }
}

#[derive(Serialize)]
struct HashRecord {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn hash_files(files: &[PathBuf], params: CtphParams, zstd: bool, json: bool) -> Result<()> {
    let start = Instant::now();

    let results = if zstd {
        let ctph = Ctph::with_params(params).context("Invalid hash parameters")?;
        files
            .iter()
            .map(|path| (path.clone(), ctph.compute_zst_file(path)))
            .collect()
    } else {
        batch::hash_files(files, params).context("Invalid hash parameters")?
    };

    let records: Vec<HashRecord> = results
        .into_iter()
        .map(|(path, result)| match result {
            Ok(digest) => HashRecord {
                path: path.display().to_string(),
                digest: Some(digest.to_string()),
                error: None,
            },
            Err(e) => HashRecord {
                path: path.display().to_string(),
                digest: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            match (&record.digest, &record.error) {
                (Some(digest), _) => println!("{}  {}", digest, record.path),
                (None, Some(error)) => eprintln!("{}: {}", record.path, error),
                (None, None) => {}
            }
        }
    }

    tracing::debug!("Hashed {} files in {:.2}s", files.len(), start.elapsed().as_secs_f64());

    let failed = records.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} files could not be hashed", failed, records.len());
    }
    Ok(())
}

fn hash_token_file(path: &Path, window_size: usize, digest_size: Option<usize>) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let tokens: Vec<i64> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of integers", path.display()))?;

    let output = match digest_size {
        Some(digest_size) => token_ctph::hash_tokens(&tokens, window_size, digest_size)
            .context("Failed to hash tokens")?
            .to_string(),
        None => token_rolling::hash_tokens(&tokens, window_size)
            .context("Failed to fingerprint tokens")?,
    };

    println!("{}", output);
    Ok(())
}

fn compare_digests(a: &str, b: &str) -> Result<()> {
    let score = simkit_core::try_compare(a, b).context("Failed to compare digests")?;
    println!("{:.4}", score);
    Ok(())
}

fn show_distance(metric: Metric, a: &str, b: &str, json: bool) -> Result<()> {
    let result = metric.distance(a, b);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "metric": metric.name(),
                "distance": result.raw,
                "normalized": result.normalized,
                "similarity": result.similarity(),
            }))?
        );
    } else {
        println!("Metric:      {}", metric);
        println!("Distance:    {}", result.raw);
        println!("Normalized:  {:.4}", result.normalized);
        println!("Similarity:  {:.4}", result.similarity());
    }

    Ok(())
}

fn dedup_files(files: &[PathBuf], threshold: Option<f64>, config: Option<&Path>) -> Result<()> {
    let mut config = match config {
        Some(path) => DedupConfig::from_json_file(path).context("Failed to load config")?,
        None => DedupConfig::default(),
    };
    if let Some(threshold) = threshold {
        config = config.with_near_threshold(threshold);
    }

    let mut store = DigestStore::new(config).context("Invalid deduplication config")?;

    for path in files {
        let outcome = store
            .add_file(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        match outcome {
            DedupOutcome::Unique => println!("unique     {}", path.display()),
            DedupOutcome::ExactDuplicate { of } => {
                println!("duplicate  {} (of {})", path.display(), of)
            }
            DedupOutcome::NearDuplicate { of, score } => {
                println!("similar    {} (of {}, {:.3})", path.display(), of, score)
            }
        }
    }

    let stats = store.stats();
    println!();
    println!("Statistics:");
    println!("  Documents:    {}", stats.total_documents);
    println!("  Unique:       {}", stats.unique_documents);
    println!("  Exact dups:   {}", stats.exact_duplicates);
    println!("  Near dups:    {}", stats.near_duplicates);
    println!("  Savings:      {:.1}%", stats.savings_percent());

    Ok(())
}
