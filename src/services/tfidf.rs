//! TF-IDF vectorization and cosine similarity over movie descriptions.
//!
//! Tokens are runs of two or more word characters, lowercased, with English
//! stop words removed. IDF is smoothed (`ln((1 + n) / (1 + df)) + 1`) and
//! every document vector is L2-normalized, so the cosine of two rows is their
//! dot product.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sparse vector as `(feature index, weight)` pairs sorted by index
pub type SparseVector = Vec<(usize, f32)>;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "do", "done", "down", "due",
    "during", "each", "eg", "either", "else", "elsewhere", "enough", "etc", "even", "ever",
    "every", "everyone", "everything", "everywhere", "except", "few", "for", "former",
    "formerly", "from", "further", "had", "has", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his", "how",
    "however", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just", "last",
    "latter", "least", "less", "many", "may", "me", "meanwhile", "might", "more", "moreover",
    "most", "mostly", "much", "must", "my", "myself", "namely", "neither", "never",
    "nevertheless", "next", "no", "nobody", "none", "nor", "not", "nothing", "now", "nowhere",
    "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other", "others",
    "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please",
    "rather", "same", "seem", "seemed", "seeming", "seems", "several", "she", "should", "since",
    "so", "some", "somehow", "someone", "something", "sometime", "sometimes", "somewhere",
    "still", "such", "than", "that", "the", "their", "them", "themselves", "then", "thence",
    "there", "thereafter", "thereby", "therefore", "therein", "these", "they", "this", "those",
    "though", "through", "throughout", "thru", "thus", "to", "together", "too", "toward",
    "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
    "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
    "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "who",
    "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without", "would",
    "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Fitted TF-IDF transformer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TfidfVectorizer {
    /// term -> feature index, features sorted alphabetically
    vocabulary: BTreeMap<String, usize>,
    /// IDF weight per feature
    idf: Vec<f32>,
    /// Number of documents the vectorizer was fitted on
    document_count: usize,
}

impl TfidfVectorizer {
    /// Learns vocabulary and IDF weights from `documents`
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| analyze(d.as_ref())).collect();

        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: BTreeSet<&String> = tokens.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f32;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (idx, (term, df)) in doc_freq.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f32)).ln() + 1.0);
            vocabulary.insert(term, idx);
        }

        Self {
            vocabulary,
            idf,
            document_count: documents.len(),
        }
    }

    /// Fits on `documents` and returns their TF-IDF rows
    pub fn fit_transform<S: AsRef<str>>(documents: &[S]) -> (Self, Vec<SparseVector>) {
        let vectorizer = Self::fit(documents);
        let rows = documents
            .iter()
            .map(|d| vectorizer.transform(d.as_ref()))
            .collect();
        (vectorizer, rows)
    }

    /// L2-normalized TF-IDF vector of `document`; unknown terms are ignored
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in analyze(document) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        vector.sort_unstable_by_key(|(idx, _)| *idx);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in vector.iter_mut() {
                *w /= norm;
            }
        }
        vector
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    /// True when vocabulary and IDF table agree
    pub fn is_consistent(&self) -> bool {
        self.idf.len() == self.vocabulary.len()
            && self.vocabulary.values().all(|&idx| idx < self.idf.len())
    }
}

/// Lowercase, split into `\w\w+` tokens, drop stop words
fn analyze(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !ENGLISH_STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Cosine similarity of two sparse vectors; 0 when either is all zeros
pub fn cosine_similarity(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let norm_a = a.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

/// Full pairwise cosine similarity matrix of `rows`
pub fn cosine_similarity_matrix(rows: &[SparseVector]) -> Array2<f32> {
    let n = rows.len();
    let mut matrix = Array2::<f32>::zeros((n, n));

    for i in 0..n {
        for j in i..n {
            let score = cosine_similarity(&rows[i], &rows[j]);
            matrix[[i, j]] = score;
            matrix[[j, i]] = score;
        }
    }

    matrix
}

fn dot(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCS: [&str; 3] = [
        "A crew of astronauts travels through a wormhole in space",
        "Astronauts stranded in space must find a way home",
        "A romantic comedy about two strangers in Paris",
    ];

    #[test]
    fn test_fit_builds_sorted_vocabulary() {
        let vectorizer = TfidfVectorizer::fit(&DOCS);
        assert_eq!(vectorizer.document_count(), 3);
        assert!(vectorizer.is_consistent());
        // stop words and one-letter tokens are dropped
        assert!(!vectorizer.vocabulary.contains_key("a"));
        assert!(!vectorizer.vocabulary.contains_key("in"));
        assert_eq!(vectorizer.vocabulary.get("astronauts"), Some(&0));
    }

    #[test]
    fn test_smoothed_idf() {
        let vectorizer = TfidfVectorizer::fit(&DOCS);
        let shared = vectorizer.idf[vectorizer.vocabulary["space"]];
        let unique = vectorizer.idf[vectorizer.vocabulary["paris"]];
        assert!((shared - ((4.0f32 / 3.0).ln() + 1.0)).abs() < 1e-6);
        assert!((unique - (2.0f32.ln() + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_transform_is_unit_length() {
        let vectorizer = TfidfVectorizer::fit(&DOCS);
        let vector = vectorizer.transform(DOCS[0]);
        let norm: f32 = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(vector.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn test_transform_of_unknown_text_is_empty() {
        let vectorizer = TfidfVectorizer::fit(&DOCS);
        assert!(vectorizer.transform("xyzzy quux").is_empty());
        assert!(vectorizer.transform("").is_empty());
    }

    #[test]
    fn test_similarity_matrix() {
        let (_, rows) = TfidfVectorizer::fit_transform(&DOCS);
        let matrix = cosine_similarity_matrix(&rows);

        assert_eq!(matrix.shape(), &[3, 3]);
        assert!((matrix[[0, 0]] - 1.0).abs() < 1e-5);
        assert_eq!(matrix[[0, 1]], matrix[[1, 0]]);
        assert!(matrix[[0, 1]] > matrix[[0, 2]]);
        assert_eq!(matrix[[0, 2]], 0.0);
    }

    #[test]
    fn test_cosine_of_zero_vector() {
        assert_eq!(cosine_similarity(&[], &[(0, 1.0)]), 0.0);
    }
}
