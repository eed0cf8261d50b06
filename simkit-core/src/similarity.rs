//! String similarity measures
//!
//! Hamming, Levenshtein, Optimal String Alignment (OSA) and
//! Damerau-Levenshtein all run through one [`EditModel`]: which operations
//! are allowed and how transpositions are treated. Every raw distance is
//! normalized by the longer input, so all distances and similarities lie in
//! `[0, 1]`.
//!
//! Strings are compared per Unicode scalar value. The generic entry points
//! ([`Metric::distance_of`]) accept any slice, which is how digest symbol
//! strings are aligned.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::SimkitError;

/// How adjacent transpositions are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transposition {
    /// No transposition operation
    None,
    /// Adjacent swaps cost 1, but a swapped pair may not be edited again (OSA)
    Restricted,
    /// Adjacent swaps cost 1 and may be combined with further edits
    Unrestricted,
}

/// Allowed edit operations; every allowed operation costs 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditModel {
    /// Insertions and deletions allowed (otherwise substitutions only)
    pub indels: bool,
    pub transposition: Transposition,
}

/// Edit distance metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Hamming,
    Levenshtein,
    OptimalStringAlignment,
    DamerauLevenshtein,
}

/// Raw edit distance together with its length-normalized value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// Number of unit-cost edits
    pub raw: usize,
    /// `raw / max(len(a), len(b))`, or 0 for two empty inputs
    pub normalized: f64,
}

impl DistanceResult {
    fn new(raw: usize, longest: usize) -> Self {
        let normalized = if longest == 0 {
            0.0
        } else {
            (raw as f64 / longest as f64).clamp(0.0, 1.0)
        };
        Self { raw, normalized }
    }

    pub fn similarity(&self) -> f64 {
        distance_to_similarity(self.normalized)
    }
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Hamming,
        Metric::Levenshtein,
        Metric::OptimalStringAlignment,
        Metric::DamerauLevenshtein,
    ];

    pub fn model(self) -> EditModel {
        match self {
            Metric::Hamming => EditModel { indels: false, transposition: Transposition::None },
            Metric::Levenshtein => EditModel { indels: true, transposition: Transposition::None },
            Metric::OptimalStringAlignment => {
                EditModel { indels: true, transposition: Transposition::Restricted }
            }
            Metric::DamerauLevenshtein => {
                EditModel { indels: true, transposition: Transposition::Unrestricted }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Hamming => "hamming",
            Metric::Levenshtein => "levenshtein",
            Metric::OptimalStringAlignment => "osa",
            Metric::DamerauLevenshtein => "damerau-levenshtein",
        }
    }

    /// Distance between two arbitrary sequences
    pub fn distance_of<T: Eq + Hash + Copy>(self, a: &[T], b: &[T]) -> DistanceResult {
        let raw = edit_distance(a, b, self.model());
        DistanceResult::new(raw, a.len().max(b.len()))
    }

    /// Distance between two strings, compared per `char`
    pub fn distance(self, a: &str, b: &str) -> DistanceResult {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        self.distance_of(&a, &b)
    }

    pub fn similarity(self, a: &str, b: &str) -> f64 {
        self.distance(a, b).similarity()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = SimkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "hamming" => Ok(Metric::Hamming),
            "levenshtein" => Ok(Metric::Levenshtein),
            "osa" | "optimal-string-alignment" => Ok(Metric::OptimalStringAlignment),
            "damerau-levenshtein" | "damerau" => Ok(Metric::DamerauLevenshtein),
            other => Err(SimkitError::InvalidParameter(format!("unknown metric: {other}"))),
        }
    }
}

/// Raw edit distance under `model`
pub fn edit_distance<T: Eq + Hash + Copy>(a: &[T], b: &[T], model: EditModel) -> usize {
    if !model.indels {
        return substitution_distance(a, b);
    }
    match model.transposition {
        Transposition::Unrestricted => unrestricted_distance(a, b),
        Transposition::None => alignment_distance(a, b, false),
        Transposition::Restricted => alignment_distance(a, b, true),
    }
}

/// Position-wise mismatches; unequal lengths are maximally distant
fn substitution_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.len() != b.len() {
        return a.len().max(b.len());
    }
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

/// Levenshtein, or OSA when `transpositions` is set, using three rolling rows
fn alignment_distance<T: PartialEq>(a: &[T], b: &[T], transpositions: bool) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let n = b.len();
    let mut before_prev = vec![0usize; n + 1];
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            if transpositions && i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(before_prev[j - 2] + 1);
            }
            curr[j] = best;
        }
        std::mem::swap(&mut before_prev, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// True Damerau-Levenshtein (Lowrance-Wagner)
fn unrestricted_distance<T: Eq + Hash + Copy>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let (m, n) = (a.len(), b.len());
    let unreachable = m + n;
    let width = n + 2;
    let at = move |i: usize, j: usize| i * width + j;

    // Row/column 0 is a sentinel border; row/column 1 is the empty prefix
    let mut d = vec![0usize; (m + 2) * width];
    d[at(0, 0)] = unreachable;
    for i in 0..=m {
        d[at(i + 1, 0)] = unreachable;
        d[at(i + 1, 1)] = i;
    }
    for j in 0..=n {
        d[at(0, j + 1)] = unreachable;
        d[at(1, j + 1)] = j;
    }

    // Last row in `a` where each element was seen
    let mut last_row: HashMap<T, usize> = HashMap::new();

    for i in 1..=m {
        let mut last_match_col = 0;
        for j in 1..=n {
            let i1 = last_row.get(&b[j - 1]).copied().unwrap_or(0);
            let j1 = last_match_col;
            let cost = if a[i - 1] == b[j - 1] {
                last_match_col = j;
                0
            } else {
                1
            };

            let substitution = d[at(i, j)] + cost;
            let insertion = d[at(i + 1, j)] + 1;
            let deletion = d[at(i, j + 1)] + 1;
            let transposition = d[at(i1, j1)] + (i - i1 - 1) + 1 + (j - j1 - 1);

            d[at(i + 1, j + 1)] = substitution.min(insertion).min(deletion).min(transposition);
        }
        last_row.insert(a[i - 1], i);
    }

    d[at(m + 1, n + 1)]
}

/// Normalize a raw edit distance by the longer string's length (in chars)
pub fn edit_distance_to_distance(edit_distance: usize, a: &str, b: &str) -> f64 {
    DistanceResult::new(edit_distance, a.chars().count().max(b.chars().count())).normalized
}

/// Convert a normalized distance into a similarity, clamped to `[0, 1]`
pub fn distance_to_similarity(distance: f64) -> f64 {
    (1.0 - distance).clamp(0.0, 1.0)
}

/// Normalized Hamming distance; 1.0 whenever the lengths differ
pub fn hamming_distance(a: &str, b: &str) -> f64 {
    Metric::Hamming.distance(a, b).normalized
}

pub fn hamming_similarity(a: &str, b: &str) -> f64 {
    distance_to_similarity(hamming_distance(a, b))
}

/// Normalized Levenshtein distance
pub fn levenshtein_distance(a: &str, b: &str) -> f64 {
    Metric::Levenshtein.distance(a, b).normalized
}

pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    distance_to_similarity(levenshtein_distance(a, b))
}

/// strsim's normalized Levenshtein score: `1 - levenshtein / max_len`, so
/// identical strings score 1.0 (this equals [`levenshtein_similarity`])
pub fn normalized_levenshtein_distance(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b).clamp(0.0, 1.0)
}

/// Normalized Optimal String Alignment distance
pub fn osa_distance(a: &str, b: &str) -> f64 {
    Metric::OptimalStringAlignment.distance(a, b).normalized
}

pub fn osa_similarity(a: &str, b: &str) -> f64 {
    distance_to_similarity(osa_distance(a, b))
}

/// Normalized Damerau-Levenshtein distance
pub fn damerau_levenshtein_distance(a: &str, b: &str) -> f64 {
    Metric::DamerauLevenshtein.distance(a, b).normalized
}

pub fn damerau_levenshtein_similarity(a: &str, b: &str) -> f64 {
    distance_to_similarity(damerau_levenshtein_distance(a, b))
}

/// strsim's normalized Damerau-Levenshtein score, oriented like
/// [`normalized_levenshtein_distance`]
pub fn normalized_damerau_levenshtein_distance(a: &str, b: &str) -> f64 {
    strsim::normalized_damerau_levenshtein(a, b).clamp(0.0, 1.0)
}

/// Jaro similarity: matching characters within a sliding range, penalized
/// by half the number of out-of-order matches
pub fn jaro_similarity(a: &str, b: &str) -> f64 {
    strsim::jaro(a, b).clamp(0.0, 1.0)
}

pub fn jaro_distance(a: &str, b: &str) -> f64 {
    distance_to_similarity(jaro_similarity(a, b))
}

/// Jaro similarity boosted by a common prefix of up to four characters
pub fn jaro_winkler_similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(a, b).clamp(0.0, 1.0)
}

pub fn jaro_winkler_distance(a: &str, b: &str) -> f64 {
    distance_to_similarity(jaro_winkler_similarity(a, b))
}
