//! Campaign-name normalization.
//!
//! Projects a raw campaign label onto a fixed-point form: lowercase ASCII
//! alphanumerics separated by single spaces, with split word fragments
//! re-joined and known typo variants rewritten.

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/\-_]+").expect("separator pattern compiles"));
static NON_ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s]").expect("non-alphanumeric pattern compiles"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

/// Ordered typo/synonym rewrites. Applied in sequence, so later rules see the
/// output of earlier ones.
const COMMON_FIXES: &[(&str, &str)] = &[
    // "lau nch", "lau ch", "launch" after fragment merging
    (r"\blau ?n?ch\b", "launch"),
    // dropped letters: "lau", "lauch"
    (r"\blau(?:ch)?\b", "launch"),
    // "eve yday", "evey day", "every day", "eveyday"
    (r"\beve ?r?y ?day\b", "everyday"),
    (r"\bcomfort ?max\b", "comfortmax"),
];

static FIX_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    COMMON_FIXES
        .iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("fix table pattern compiles"),
                *replacement,
            )
        })
        .collect()
});

/// Tokens at or below this length are treated as fragments of the previous
/// token.
const FRAGMENT_MAX_LEN: usize = 2;

/// Lowercase, map separators and punctuation to spaces, collapse whitespace.
pub fn clean_text(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let text = SEPARATOR_RE.replace_all(lowered.trim(), " ");
    let text = NON_ALNUM_RE.replace_all(&text, " ");
    collapse_whitespace(&text)
}

/// Merge fragments of at most two characters into the preceding token.
/// A leading fragment has nothing to merge into and is kept as is.
pub fn merge_fragments<'a, I>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut merged: Vec<String> = Vec::new();
    for token in tokens {
        match merged.last_mut() {
            Some(previous) if token.chars().count() <= FRAGMENT_MAX_LEN => previous.push_str(token),
            _ => merged.push(token.to_string()),
        }
    }
    merged
}

pub fn apply_common_fixes(text: &str) -> String {
    let mut fixed = text.to_string();
    for (re, replacement) in FIX_RULES.iter() {
        fixed = re.replace_all(&fixed, *replacement).into_owned();
    }
    collapse_whitespace(&fixed)
}

/// Normalize a raw campaign name. Missing names normalize to `""`.
pub fn normalize(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let cleaned = clean_text(raw);
    let tokens = merge_fragments(cleaned.split_whitespace());
    apply_common_fixes(&tokens.join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        normalize(Some(s))
    }

    #[test]
    fn test_missing_name_is_empty() {
        assert_eq!(normalize(None), "");
        assert_eq!(norm("   "), "");
        assert_eq!(norm("!!!"), "");
    }

    #[test]
    fn test_punctuation_and_separators() {
        assert_eq!(norm("Launch Sale!!"), "launch sale");
        assert_eq!(norm("winter__boots--2024"), "winter boots 2024");
        assert_eq!(norm("Men/Women  Running"), "men women running");
    }

    #[test]
    fn test_fragment_merge() {
        assert_eq!(merge_fragments(["la", "u", "nch", "sale"]), vec!["lau", "nch", "sale"]);
        assert_eq!(merge_fragments(["ab", "cdef"]), vec!["ab", "cdef"]);
        assert!(merge_fragments(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_split_launch_is_repaired() {
        assert_eq!(norm("la u nch sale"), "launch sale");
        assert_eq!(norm("Lau ch Sale"), "launch sale");
        assert_eq!(norm("lauch sale"), "launch sale");
        assert_eq!(norm("LAUNCH sale"), "launch sale");
    }

    #[test]
    fn test_everyday_and_comfortmax_variants() {
        assert_eq!(norm("eve yday deals"), "everyday deals");
        assert_eq!(norm("eve y day deals"), "everyday deals");
        assert_eq!(norm("Every Day Deals"), "everyday deals");
        assert_eq!(norm("Comfort-Max socks"), "comfortmax socks");
        assert_eq!(norm("comfortmax socks"), "comfortmax socks");
    }

    #[test]
    fn test_non_ascii_becomes_separator() {
        assert_eq!(norm("Café Promo"), "caf promo");
        assert_eq!(norm("summer\u{00a0}sale"), "summer sale");
    }

    #[test]
    fn test_idempotent_on_samples() {
        let samples = [
            "Launch Sale!!",
            "la u nch sale",
            "a b c d",
            "x",
            "Men's Running-Shoes (v2)",
            "eve y day comfort max",
            "İstanbul drop",
            "",
        ];
        for s in samples {
            let once = norm(s);
            assert_eq!(norm(&once), once, "not idempotent for {s:?}");
        }
    }
}
