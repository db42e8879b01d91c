// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("embeddings").join("bullets.json");

    let mut cache = EmbeddingCache { model: "mini-lm".to_string(), ..Default::default() };
    cache.insert("blt-a", vec![0.1, 0.2, 0.3]);
    cache.save(&path).unwrap();

    let back = EmbeddingCache::load(&path);
    assert_eq!(back.model, "mini-lm");
    assert_eq!(back.get("blt-a"), Some(&[0.1f32, 0.2, 0.3][..]));
    assert_eq!(back.get("blt-missing"), None);
}

#[test]
fn missing_or_malformed_cache_is_empty() {
    let dir = tempdir().unwrap();
    assert!(EmbeddingCache::load(&dir.path().join("none.json")).vectors.is_empty());

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "not json").unwrap();
    assert!(EmbeddingCache::load(&bad).vectors.is_empty());
}

#[test]
fn save_releases_its_lock() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bullets.json");

    EmbeddingCache::default().save(&path).unwrap();
    assert!(!dir.path().join("bullets.json.lock").exists());
}
