// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text similarity primitives: content hashing, token Jaccard, cosine.
//!
//! These power duplicate detection in the curator and coarse relevance in the
//! context ranker. Everything here is pure and allocation-light.

use crate::bullet::Bullet;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// Words carrying no signal for overlap scoring.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "him", "his", "how", "man", "new", "now", "old", "see",
    "two", "way", "who", "did", "its", "let", "she", "too", "use", "that", "with", "have", "this",
    "will", "your", "from", "they", "been", "were", "when", "what", "there", "which", "their",
    "would", "about", "should", "could", "into", "them", "then", "than", "some", "only", "also",
    "just", "over", "such", "very", "make", "made", "each", "after", "before", "while", "where",
];

/// Lowercase and collapse runs of whitespace to single spaces.
fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Stable hash of the normalized content: first 16 hex digits of SHA-256.
///
/// Two strings differing only in case or whitespace hash identically.
pub fn hash_content(s: &str) -> String {
    let digest = Sha256::digest(normalize(s).as_bytes());
    let hex = format!("{:x}", digest);
    hex[..16].to_string()
}

/// ASCII-lowercased words of length ≥ 3, stop words removed.
pub fn tokenize(s: &str) -> HashSet<String> {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() >= 3)
        .map(|w| w.to_ascii_lowercase())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Token Jaccard similarity in [0, 1].
///
/// Degenerate inputs (no tokens survive filtering) compare by normalized
/// string equality so `jaccard(s, s) == 1` holds for every `s`.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let ta = tokenize(a);
    let tb = tokenize(b);
    if ta.is_empty() && tb.is_empty() {
        return if normalize(a) == normalize(b) { 1.0 } else { 0.0 };
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Cosine similarity; zero when either vector is empty or lengths mismatch.
pub fn cosine(u: &[f32], v: &[f32]) -> f64 {
    if u.is_empty() || v.is_empty() || u.len() != v.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut nu = 0.0f64;
    let mut nv = 0.0f64;
    for (a, b) in u.iter().zip(v) {
        dot += f64::from(*a) * f64::from(*b);
        nu += f64::from(*a) * f64::from(*a);
        nv += f64::from(*b) * f64::from(*b);
    }
    if nu == 0.0 || nv == 0.0 {
        0.0
    } else {
        dot / (nu.sqrt() * nv.sqrt())
    }
}

/// Highest-Jaccard active bullet at or above `threshold`. Ties keep the
/// earliest bullet (insertion order).
pub fn find_similar_bullet<'a>(
    bullets: &'a [Bullet],
    content: &str,
    threshold: f64,
) -> Option<(&'a Bullet, f64)> {
    let mut best: Option<(&Bullet, f64)> = None;
    for bullet in bullets.iter().filter(|b| b.is_active()) {
        let score = jaccard(&bullet.content, content);
        if score >= threshold && best.map_or(true, |(_, s)| score > s) {
            best = Some((bullet, score));
        }
    }
    best
}

/// Up to `max` distinctive keywords, most frequent first; first occurrence
/// breaks frequency ties.
pub fn extract_keywords(text: &str, max: usize) -> Vec<String> {
    let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0usize;
    for word in text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() >= 3)
        .map(|w| w.to_ascii_lowercase())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
    {
        let entry = freq.entry(word).or_insert((0, order));
        entry.0 += 1;
        order += 1;
    }
    let mut words: Vec<(String, (usize, usize))> = freq.into_iter().collect();
    words.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    words.into_iter().take(max).map(|(w, _)| w).collect()
}

#[cfg(test)]
#[path = "similarity_tests.rs"]
mod tests;
