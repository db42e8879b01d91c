// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::bullet_with_id;
use proptest::prelude::*;
use yare::parameterized;

#[test]
fn hash_ignores_case_and_whitespace() {
    let a = hash_content("Use   global\tstate everywhere");
    let b = hash_content("use global state EVERYWHERE");
    assert_eq!(a, b);
    assert_eq!(a.len(), 16);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn hash_differs_on_content() {
    assert_ne!(hash_content("run the tests"), hash_content("skip the tests"));
}

#[test]
fn jaccard_identity_empty_and_symmetry() {
    assert_eq!(jaccard("refactor the parser module", "refactor the parser module"), 1.0);
    assert_eq!(jaccard("refactor the parser module", ""), 0.0);

    let a = "always run clippy before pushing";
    let b = "run clippy and rustfmt before pushing changes";
    assert_eq!(jaccard(a, b), jaccard(b, a));
}

#[test]
fn jaccard_filters_noise_words() {
    // "the", "a" contribute nothing; overlap driven by real tokens
    let score = jaccard("fix the flaky test", "fix a flaky test");
    assert_eq!(score, 1.0);
}

#[test]
fn jaccard_degenerate_inputs_compare_by_equality() {
    // Tokens all shorter than 3 chars
    assert_eq!(jaccard("a b", "a b"), 1.0);
    assert_eq!(jaccard("a b", "c d"), 0.0);
}

#[parameterized(
    empty_u = { vec![], vec![1.0, 2.0], 0.0 },
    empty_v = { vec![1.0, 2.0], vec![], 0.0 },
    mismatch = { vec![1.0], vec![1.0, 2.0], 0.0 },
    zero_norm = { vec![0.0, 0.0], vec![1.0, 2.0], 0.0 },
)]
fn cosine_edge_cases(u: Vec<f32>, v: Vec<f32>, expected: f64) {
    assert_eq!(cosine(&u, &v), expected);
}

#[test]
fn cosine_parallel_vectors_score_one() {
    let score = cosine(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
    assert!((score - 1.0).abs() < 1e-9);
}

#[test]
fn find_similar_scans_active_only_and_keeps_first_tie() {
    let mut retired = bullet_with_id("blt-r", "cache the dependency downloads locally");
    retired.deprecated = true;
    let first = bullet_with_id("blt-1", "cache the dependency downloads locally");
    let second = bullet_with_id("blt-2", "cache the dependency downloads locally");
    let unrelated = bullet_with_id("blt-3", "write integration specs for the daemon");

    let bullets = vec![retired, first, second, unrelated];
    let (hit, score) =
        find_similar_bullet(&bullets, "cache dependency downloads locally", 0.5).unwrap();

    assert_eq!(hit.id.as_str(), "blt-1");
    assert!(score >= 0.5);
}

#[test]
fn find_similar_below_threshold_is_none() {
    let bullets = vec![bullet_with_id("blt-1", "verify the release checklist")];
    assert!(find_similar_bullet(&bullets, "unrelated content entirely", 0.85).is_none());
}

#[test]
fn keywords_ranked_by_frequency_then_order() {
    let kws = extract_keywords("parser error parser token stream token parser", 3);
    assert_eq!(kws, vec!["parser".to_string(), "token".to_string(), "error".to_string()]);
}

#[test]
fn keywords_respect_max() {
    let kws = extract_keywords("alpha beta gamma delta epsilon", 2);
    assert_eq!(kws.len(), 2);
}

proptest! {
    #[test]
    fn jaccard_stays_in_unit_interval(a in ".{0,80}", b in ".{0,80}") {
        let s = jaccard(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn jaccard_is_symmetric(a in ".{0,80}", b in ".{0,80}") {
        prop_assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }

    #[test]
    fn jaccard_self_is_one(a in ".{0,80}") {
        prop_assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn hash_is_whitespace_and_case_invariant(a in "[ a-zA-Z0-9]{0,60}") {
        let spaced = a.split_whitespace().collect::<Vec<_>>().join("   ");
        prop_assert_eq!(hash_content(&a.to_uppercase()), hash_content(&spaced.to_lowercase()));
    }
}
