//! Hybrid string similarity for normalized campaign names.
//!
//! Whole-word overlap carries more weight than raw character overlap, so
//! "running shoes" and "running socks" stay apart while spelling variants of
//! the same words score high.

use std::collections::BTreeSet;

pub const TOKEN_WEIGHT: f64 = 0.55;
pub const SEQUENCE_WEIGHT: f64 = 0.45;

/// Jaccard index over whitespace token sets. Zero when either side has no
/// tokens.
pub fn token_jaccard(a: &str, b: &str) -> f64 {
    let sa: BTreeSet<&str> = a.split_whitespace().collect();
    let sb: BTreeSet<&str> = b.split_whitespace().collect();
    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }
    let inter = sa.intersection(&sb).count() as f64;
    let union = sa.union(&sb).count() as f64;
    inter / union
}

/// Ratcliff/Obershelp ratio `2·M / (|a| + |b|)`, where `M` counts characters
/// in the recursively found longest common blocks.
///
/// Arguments are ordered before matching so the ratio is symmetric.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Weighted blend of [`token_jaccard`] and [`sequence_ratio`], in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let score = TOKEN_WEIGHT * token_jaccard(a, b) + SEQUENCE_WEIGHT * sequence_ratio(a, b);
    score.clamp(0.0, 1.0)
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`. Ties resolve to
/// the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            curr[col] = if a[i] == b[j] { prev[col - 1] + 1 } else { 0 };
            let k = curr[col];
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_token_jaccard() {
        assert!(close(token_jaccard("running shoes", "running socks"), 1.0 / 3.0));
        assert!(close(token_jaccard("a b", "b a"), 1.0));
        assert_eq!(token_jaccard("", "launch"), 0.0);
        assert_eq!(token_jaccard("", ""), 0.0);
    }

    #[test]
    fn test_sequence_ratio_known_values() {
        assert!(close(sequence_ratio("abcd", "abcd"), 1.0));
        assert!(close(sequence_ratio("abc", "xyz"), 0.0));
        assert!(close(sequence_ratio("", ""), 1.0));
        assert!(close(sequence_ratio("", "abc"), 0.0));
        // "abcdefgh" + "i" match: 2 * 9 / 20
        assert!(close(sequence_ratio("abcdefghij", "abcdefghji"), 0.9));
        // "running s" + "o" + "s"
        assert!(close(sequence_ratio("running shoes", "running socks"), 22.0 / 26.0));
    }

    #[test]
    fn test_sequence_ratio_symmetric() {
        let pairs = [("abxcd", "abcxd"), ("winter boots", "boots winter"), ("aab", "aba")];
        for (a, b) in pairs {
            assert!(close(sequence_ratio(a, b), sequence_ratio(b, a)));
        }
    }

    #[test]
    fn test_identical_names_score_one() {
        for name in ["launch sale", "x", "winter boots 2024"] {
            assert!(close(similarity(name, name), 1.0));
        }
    }

    #[test]
    fn test_character_overlap_alone_does_not_merge() {
        let score = similarity("abcdefghij", "abcdefghji");
        assert!(close(score, 0.45 * 0.9));
        assert!(score < 0.78);
    }

    #[test]
    fn test_distinct_products_stay_apart() {
        assert!(similarity("running shoes", "running socks") < 0.78);
        assert!(similarity("spring launch sale", "spring launch sale us") > 0.78);
    }
}
