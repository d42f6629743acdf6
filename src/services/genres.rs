use super::fuzzy;

/// Genre vocabulary recognized in queries, lowercase
pub const GENRES: &[&str] = &[
    "action",
    "adventure",
    "animation",
    "comedy",
    "crime",
    "documentary",
    "drama",
    "family",
    "fantasy",
    "history",
    "horror",
    "music",
    "musical",
    "mystery",
    "romance",
    "sci-fi",
    "science fiction",
    "thriller",
    "war",
    "western",
];

/// Common variants and adjectives mapped onto vocabulary entries
const SYNONYMS: &[(&str, &str)] = &[
    ("sci fi", "sci-fi"),
    ("scifi", "sci-fi"),
    ("thrilling", "thriller"),
    ("thrill", "thriller"),
    ("suspense", "thriller"),
    ("suspenseful", "thriller"),
    ("romantic", "romance"),
    ("romcom", "comedy"),
    ("funny", "comedy"),
    ("hilarious", "comedy"),
    ("scary", "horror"),
    ("creepy", "horror"),
    ("animated", "animation"),
    ("cartoon", "animation"),
    ("dramatic", "drama"),
    ("historical", "history"),
    ("mysterious", "mystery"),
    ("whodunit", "mystery"),
    ("documentaries", "documentary"),
    ("doc", "documentary"),
    ("adventurous", "adventure"),
    ("criminal", "crime"),
    ("cowboy", "western"),
];

/// Vocabulary entries naming the same genre; datasets tend to use only one
const EQUIVALENT_GENRES: &[&[&str]] = &[&["sci-fi", "science fiction"]];

/// Minimum fuzzy score for a token to count as a misspelled genre
pub const GENRE_FUZZY_THRESHOLD: f64 = 80.0;

/// Exact vocabulary or synonym lookup of an already-normalized term
pub fn lookup(term: &str) -> Option<&'static str> {
    if let Some(genre) = GENRES.iter().find(|genre| **genre == term) {
        return Some(genre);
    }

    // Terms arrive hyphen-stripped, so "sci-fi" shows up as "scifi"
    if let Some(genre) = GENRES.iter().find(|genre| genre.replace('-', "") == term) {
        return Some(genre);
    }

    SYNONYMS
        .iter()
        .find(|(variant, _)| *variant == term)
        .map(|(_, genre)| *genre)
}

/// Closest vocabulary entry scoring at least [`GENRE_FUZZY_THRESHOLD`]
pub fn fuzzy_lookup(term: &str) -> Option<&'static str> {
    fuzzy::best_match(
        term,
        GENRES.iter().copied(),
        GENRE_FUZZY_THRESHOLD,
        fuzzy::ratio,
    )
    .map(|(genre, score)| {
        tracing::debug!(term = %term, genre = %genre, score, "Fuzzy matched genre");
        genre
    })
}

/// `genre` plus every spelling that names the same genre, lowercase
pub fn equivalents(genre: &str) -> Vec<String> {
    let genre = genre.trim().to_lowercase();
    EQUIVALENT_GENRES
        .iter()
        .find(|group| group.contains(&genre.as_str()))
        .map(|group| group.iter().map(|g| g.to_string()).collect())
        .unwrap_or_else(|| vec![genre])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_vocabulary() {
        assert_eq!(lookup("horror"), Some("horror"));
        assert_eq!(lookup("science fiction"), Some("science fiction"));
    }

    #[test]
    fn test_lookup_hyphen_stripped_vocabulary() {
        assert_eq!(lookup("scifi"), Some("sci-fi"));
    }

    #[test]
    fn test_lookup_synonyms() {
        assert_eq!(lookup("sci fi"), Some("sci-fi"));
        assert_eq!(lookup("thrilling"), Some("thriller"));
        assert_eq!(lookup("romantic"), Some("romance"));
        assert_eq!(lookup("movie"), None);
    }

    #[test]
    fn test_equivalents() {
        assert_eq!(equivalents("Sci-Fi"), vec!["sci-fi", "science fiction"]);
        assert_eq!(equivalents("science fiction"), vec!["sci-fi", "science fiction"]);
        assert_eq!(equivalents("horror"), vec!["horror"]);
    }

    #[test]
    fn test_fuzzy_lookup() {
        assert_eq!(fuzzy_lookup("comdy"), Some("comedy"));
        assert_eq!(fuzzy_lookup("horrer"), Some("horror"));
        assert_eq!(fuzzy_lookup("packed"), None);
        assert_eq!(fuzzy_lookup("actor"), None);
    }
}
