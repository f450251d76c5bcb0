//! Key-term extraction from creative messages.
//!
//! Terms are ranked by their mean TF-IDF weight across messages, using
//! unigrams and bigrams with English stop words removed. When no vocabulary
//! survives, ranking falls back to raw token frequency.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+").expect("url pattern compiles"));
static NON_ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s]").expect("non-alphanumeric pattern compiles"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

/// Vocabulary cap, most frequent terms kept.
const MAX_FEATURES: usize = 500;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
        "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
        "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below",
        "beside", "besides", "between", "beyond", "both", "bottom", "but", "by", "can",
        "cannot", "could", "do", "done", "down", "due", "during", "each", "eg", "eight",
        "either", "eleven", "else", "elsewhere", "enough", "etc", "even", "ever", "every",
        "everyone", "everything", "everywhere", "except", "few", "fifteen", "fifty", "first",
        "five", "for", "former", "formerly", "forty", "four", "from", "front", "full",
        "further", "get", "give", "go", "had", "has", "have", "he", "hence", "her", "here",
        "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself",
        "his", "how", "however", "hundred", "i", "ie", "if", "in", "indeed", "into", "is",
        "it", "its", "itself", "just", "keep", "last", "latter", "latterly", "least", "less",
        "ltd", "made", "many", "may", "me", "meanwhile", "might", "mine", "more", "moreover",
        "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
        "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor",
        "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only",
        "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
        "over", "own", "part", "per", "perhaps", "please", "put", "rather", "re", "same",
        "see", "seem", "seemed", "seeming", "seems", "several", "she", "should", "show",
        "side", "since", "six", "sixty", "so", "some", "somehow", "someone", "something",
        "sometime", "sometimes", "somewhere", "still", "such", "take", "ten", "than", "that",
        "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
        "thereby", "therefore", "therein", "thereupon", "these", "they", "third", "this",
        "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together",
        "too", "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until",
        "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever",
        "when", "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein",
        "whereupon", "wherever", "whether", "which", "while", "who", "whoever", "whole",
        "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you",
        "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Lowercase, drop URLs, map everything outside `[a-z0-9\s]` to spaces.
pub fn clean_message(text: &str) -> String {
    let lowered = text.to_lowercase();
    let text = URL_RE.replace_all(&lowered, " ");
    let text = NON_ALNUM_RE.replace_all(&text, " ");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Unigrams of at least two characters minus stop words, followed by the
/// bigrams of adjacent surviving unigrams.
fn analyze(document: &str) -> Vec<String> {
    let words: Vec<&str> = document
        .split_whitespace()
        .filter(|w| w.chars().count() >= 2 && !STOP_WORDS.contains(w))
        .collect();
    let mut terms: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    terms.extend(words.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

/// Top `n` terms of `corpus` by mean TF-IDF weight, keeping only terms that
/// contain a letter and are longer than one character.
pub fn top_terms(corpus: &[String], n: usize) -> Vec<String> {
    if corpus.is_empty() {
        return Vec::new();
    }
    let cleaned: Vec<String> = corpus.iter().map(|m| clean_message(m)).collect();
    let documents: Vec<Vec<String>> = cleaned.iter().map(|d| analyze(d)).collect();

    let Some(vocabulary) = build_vocabulary(&documents) else {
        return frequency_terms(&cleaned, n);
    };

    let docs = documents.len() as f64;
    let idf: HashMap<&str, f64> = vocabulary
        .iter()
        .map(|(term, df)| (term.as_str(), ((1.0 + docs) / (1.0 + *df as f64)).ln() + 1.0))
        .collect();

    let mut mean_weight: HashMap<&str, f64> = HashMap::new();
    for document in &documents {
        let mut counts: HashMap<&str, f64> = HashMap::new();
        for term in document {
            if idf.contains_key(term.as_str()) {
                *counts.entry(term.as_str()).or_insert(0.0) += 1.0;
            }
        }
        let weights: Vec<(&str, f64)> = counts
            .into_iter()
            .map(|(term, tf)| (term, tf * idf[term]))
            .collect();
        let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            continue;
        }
        for (term, weight) in weights {
            *mean_weight.entry(term).or_insert(0.0) += weight / norm / docs;
        }
    }

    let mut ranked: Vec<(&str, f64)> = mean_weight.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(term, _)| term)
        .filter(|t| t.chars().any(|c| c.is_ascii_lowercase()) && t.len() > 1)
        .map(str::to_string)
        .collect()
}

/// Document frequency per term, capped to the most frequent terms overall.
/// `None` when no term survives analysis.
fn build_vocabulary(documents: &[Vec<String>]) -> Option<BTreeMap<String, usize>> {
    let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
    let mut total: HashMap<&str, usize> = HashMap::new();
    for document in documents {
        let mut seen = HashSet::new();
        for term in document {
            *total.entry(term.as_str()).or_insert(0) += 1;
            if seen.insert(term.as_str()) {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }
    }
    if doc_freq.is_empty() {
        return None;
    }

    if doc_freq.len() > MAX_FEATURES {
        let mut by_count: Vec<(&str, usize)> = total.into_iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let kept: HashSet<String> = by_count
            .into_iter()
            .take(MAX_FEATURES)
            .map(|(t, _)| t.to_string())
            .collect();
        doc_freq.retain(|term, _| kept.contains(term));
    }
    Some(doc_freq)
}

/// Most frequent tokens longer than two characters, ties in first-seen order.
fn frequency_terms(cleaned: &[String], n: usize) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in cleaned.iter().flat_map(|d| d.split_whitespace()) {
        if token.chars().count() <= 2 {
            continue;
        }
        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().take(n).map(str::to_string).collect()
}
