//! Percentage similarity scores used by the entity extractor.
//!
//! Scores are in `0.0..=100.0`; 100 means identical strings.

use strsim::normalized_levenshtein;

/// Edit-distance similarity of the two strings
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    normalized_levenshtein(a, b) * 100.0
}

/// Similarity of the two strings after sorting their whitespace tokens,
/// so word order does not matter
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Best of [`ratio`] and [`token_sort_ratio`]
pub fn best_ratio(a: &str, b: &str) -> f64 {
    ratio(a, b).max(token_sort_ratio(a, b))
}

/// Returns the candidate with the highest score at or above `threshold`.
///
/// Ties keep the earliest candidate.
pub fn best_match<'a, I, F>(query: &str, candidates: I, threshold: f64, scorer: F) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(&str, &str) -> f64,
{
    let mut best: Option<(&'a str, f64)> = None;

    for candidate in candidates {
        let score = scorer(query, candidate);
        if score < threshold {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
