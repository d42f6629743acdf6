use std::collections::HashMap;

use crate::models::{split_names, MovieRecord, ParsedQuery};

use super::fuzzy;
use super::genres;
use super::normalize::{contains_phrase, normalize, title_key};
use super::recognizer::{
    is_stop_word, tokenize, CapitalizedSpanRecognizer, EntityRecognizer, Pos, Token, TokenKind,
};

/// Minimum fuzzy score for the whole query to count as a misspelled title
pub const TITLE_FUZZY_THRESHOLD: f64 = 90.0;

/// Tokens shorter than this never count as genres
const MIN_GENRE_TOKEN_CHARS: usize = 3;

/// Normalized name -> canonical casing, in dataset order
#[derive(Debug, Default)]
struct Lexicon {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Lexicon {
    /// Builds the lexicon; the first spelling of a normalized name wins
    fn build<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut lexicon = Self::default();
        for name in names {
            let key = title_key(&name);
            if key.is_empty() || lexicon.index.contains_key(&key) {
                continue;
            }
            lexicon.index.insert(key.clone(), lexicon.entries.len());
            lexicon.entries.push((key, name.trim().to_string()));
        }
        lexicon
    }

    fn get(&self, normalized: &str) -> Option<&str> {
        self.index
            .get(normalized)
            .map(|&i| self.entries[i].1.as_str())
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Every entry occurring as a whole phrase in the normalized query.
    ///
    /// Stop-word-only entries ("It", "Up") are skipped, and a hit contained
    /// in a longer hit ("the dark knight" inside "the dark knight rises")
    /// is dropped.
    fn scan(&self, normalized_query: &str) -> Vec<&str> {
        let hits: Vec<&(String, String)> = self
            .entries
            .iter()
            .filter(|(key, _)| !is_stop_word(key))
            .filter(|(key, _)| contains_phrase(normalized_query, key))
            .collect();

        hits.iter()
            .copied()
            .filter(|(key, _)| {
                !hits
                    .iter()
                    .any(|(other, _)| other.len() > key.len() && contains_phrase(other, key))
            })
            .map(|(_, canonical)| canonical.as_str())
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Turns free-text requests into a [`ParsedQuery`].
///
/// Extraction runs in three tiers: recognizer spans looked up against the
/// known titles and names, a whole-phrase scan of the query for any category
/// the recognizer left empty, then an exact or fuzzy match of the whole query
/// against the titles. Genres come from a separate token pass. Nothing here
/// fails; unmatched input simply yields empty categories.
pub struct EntityExtractor {
    recognizer: Box<dyn EntityRecognizer>,
    titles: Lexicon,
    actors: Lexicon,
    directors: Lexicon,
}

impl EntityExtractor {
    /// Creates an extractor using the capitalized-span recognizer
    pub fn new(movies: &[MovieRecord]) -> Self {
        Self::with_recognizer(movies, Box::new(CapitalizedSpanRecognizer::new()))
    }

    pub fn with_recognizer(movies: &[MovieRecord], recognizer: Box<dyn EntityRecognizer>) -> Self {
        let titles = Lexicon::build(movies.iter().map(|m| m.title.clone()));
        let actors = Lexicon::build(movies.iter().flat_map(|m| split_names(&m.actors)));
        let directors = Lexicon::build(movies.iter().flat_map(|m| split_names(&m.directors)));

        tracing::debug!(
            titles = titles.len(),
            actors = actors.len(),
            directors = directors.len(),
            "Built entity lexicons"
        );

        Self {
            recognizer,
            titles,
            actors,
            directors,
        }
    }

    /// Extracts genres, titles, actors and directors from `query`
    pub fn parse(&self, query: &str) -> ParsedQuery {
        let mut parsed = ParsedQuery::new();
        let normalized_query = normalize(query);

        self.match_recognized_spans(query, &mut parsed);
        self.scan_unmatched_categories(&normalized_query, &mut parsed);
        self.match_whole_title(&normalized_query, &mut parsed);
        extract_genres(query, &mut parsed);

        tracing::debug!(
            genres = ?parsed.genres,
            movies = ?parsed.specific_movies,
            actors = ?parsed.actors,
            directors = ?parsed.directors,
            "Parsed query"
        );

        parsed
    }

    fn match_recognized_spans(&self, query: &str, parsed: &mut ParsedQuery) {
        for span in self.recognizer.recognize(query) {
            tracing::trace!(span = %span.text, label = ?span.label, "Recognized span");

            if self.match_candidate(&span.text, parsed) {
                continue;
            }

            // "Tom Hanks and Meg Ryan" arrives as one span
            let parts = split_names(&span.text);
            if parts.len() > 1 {
                for part in parts {
                    self.match_candidate(&part, parsed);
                }
            }
        }
    }

    /// Looks `candidate` up in every lexicon; true when anything matched
    fn match_candidate(&self, candidate: &str, parsed: &mut ParsedQuery) -> bool {
        let key = title_key(candidate);
        let mut matched = false;

        if let Some(title) = self.titles.get(&key) {
            parsed.add_movie(title);
            matched = true;
        }
        if let Some(actor) = self.actors.get(&key) {
            parsed.add_actor(actor);
            matched = true;
        }
        if let Some(director) = self.directors.get(&key) {
            parsed.add_director(director);
            matched = true;
        }

        matched
    }

    fn scan_unmatched_categories(&self, normalized_query: &str, parsed: &mut ParsedQuery) {
        if parsed.specific_movies.is_empty() {
            for title in self.titles.scan(normalized_query) {
                parsed.add_movie(title);
            }
        }
        if parsed.actors.is_empty() {
            for actor in self.actors.scan(normalized_query) {
                parsed.add_actor(actor);
            }
        }
        if parsed.directors.is_empty() {
            for director in self.directors.scan(normalized_query) {
                parsed.add_director(director);
            }
        }
    }

    fn match_whole_title(&self, normalized_query: &str, parsed: &mut ParsedQuery) {
        let trimmed = normalized_query
            .trim()
            .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?'))
            .trim();
        if trimmed.is_empty() {
            return;
        }

        if let Some(title) = self
            .titles
            .get(normalized_query)
            .or_else(|| self.titles.get(trimmed))
        {
            parsed.add_movie(title);
            return;
        }

        // a misspelled whole query only stands in when nothing matched exactly
        if !parsed.specific_movies.is_empty() {
            return;
        }

        if let Some((key, score)) = fuzzy::best_match(
            trimmed,
            self.titles.keys(),
            TITLE_FUZZY_THRESHOLD,
            fuzzy::best_ratio,
        ) {
            if let Some(title) = self.titles.get(key) {
                tracing::debug!(query = %trimmed, title = %title, score, "Fuzzy matched title");
                parsed.add_movie(title);
            }
        }
    }
}

/// Token pass: nouns and adjectives checked against the genre vocabulary,
/// its synonyms, then fuzzily; adjacent word pairs cover "sci fi" and
/// "science fiction".
fn extract_genres(query: &str, parsed: &mut ParsedQuery) {
    let tokens = tokenize(query);
    let words: Vec<&Token> = tokens.iter().filter(|t| t.is_word()).collect();

    for pair in adjacent_word_pairs(&tokens) {
        if let Some(genre) = genres::lookup(&pair) {
            parsed.add_genre(genre);
        }
    }

    for token in words {
        if !is_genre_candidate(token) {
            continue;
        }

        let lemma = normalize(&token.lemma);
        let genre = genres::lookup(&lemma)
            .or_else(|| genres::lookup(&normalize(&token.text)))
            .or_else(|| genres::fuzzy_lookup(&lemma));

        if let Some(genre) = genre {
            parsed.add_genre(genre);
        }
    }
}

fn is_genre_candidate(token: &Token) -> bool {
    token.kind == TokenKind::Word
        && !token.is_stop
        && token.text.chars().count() >= MIN_GENRE_TOKEN_CHARS
        // capitalized mid-sentence words belong to titles and names
        && matches!(token.pos, Pos::Noun | Pos::Adjective)
}

/// "w1 w2" for consecutive words, also across a single hyphen ("sci-fi")
fn adjacent_word_pairs(tokens: &[Token]) -> Vec<String> {
    let mut pairs = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if !token.is_word() {
            continue;
        }
        let next = match tokens.get(i + 1) {
            Some(t) if t.is_word() => Some(t),
            Some(t) if t.text == "-" => tokens.get(i + 2).filter(|t| t.is_word()),
            _ => None,
        };
        if let Some(next) = next {
            pairs.push(format!("{} {}", token.lemma, next.lemma));
        }
    }

    pairs
}
