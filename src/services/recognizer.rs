//! Query tokenization and named-entity recognition.
//!
//! The tokenizer attaches a coarse part-of-speech tag and a lemma to every
//! word so the genre pass can keep nouns and adjectives only. The default
//! [`CapitalizedSpanRecognizer`] proposes title and person candidates from
//! runs of capitalized words; the extractor checks every candidate against
//! the known titles and names, so false positives are harmless.

/// Kind of a lexical token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Number,
    Punct,
}

/// Coarse part-of-speech tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pos {
    Noun,
    ProperNoun,
    Adjective,
    Verb,
    Adverb,
    Other,
}

/// A token with its byte range in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
    pub pos: Pos,
    /// Lowercase base form ("comedies" -> "comedy")
    pub lemma: String,
    pub is_stop: bool,
}

impl Token {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    pub fn is_capitalized(&self) -> bool {
        self.is_word() && self.text.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Category proposed by the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Person,
    WorkOfArt,
}

/// A candidate entity span, as it appears in the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Named-entity recognizer used by the entity extractor
#[cfg_attr(test, mockall::automock)]
pub trait EntityRecognizer: Send + Sync {
    /// Candidate entity spans found in `text`, in order of appearance
    fn recognize(&self, text: &str) -> Vec<EntitySpan>;
}

pub const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "get",
    "give", "good", "great", "had", "has", "have", "he", "hello", "her", "hey", "hi", "him",
    "his", "how", "i", "i'd", "i'm", "if", "in", "into", "is", "it", "its", "just", "like",
    "me", "mood", "more", "most", "movie", "movies", "film", "films", "my", "nancy", "new",
    "no", "not", "now", "of", "on", "one", "or", "other", "our", "please", "really", "some",
    "something", "such", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "thing", "things", "this", "those", "to", "too", "up", "us", "very", "was", "we",
    "were", "what", "when", "which", "who", "will", "with", "would", "you", "your",
];

const VERBS: &[&str] = &[
    "want", "wanna", "like", "love", "enjoy", "enjoyed", "watch", "watching", "see", "seen",
    "recommend", "suggest", "show", "give", "find", "need", "looking", "look", "tell", "prefer",
    "starring", "directed", "made", "make", "play", "played", "feel", "feeling", "liked",
    "loved", "watched", "searching", "search",
];

/// Lowercase words that may sit inside a capitalized title span
const CONNECTORS: &[&str] = &[
    "of", "the", "a", "an", "and", "in", "on", "to", "for", "at", "from", "with", "&",
];

/// Capitalized words that start a sentence or address the assistant
const IGNORED_SPAN_WORDS: &[&str] = &[
    "hello", "hi", "hey", "nancy", "please", "i", "i'm", "i'd", "recommend", "suggest",
    "show", "give", "find", "movies", "movie", "films", "film", "can", "could", "would",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Splits text into word, number and punctuation tokens.
///
/// Apostrophes inside a word are kept ("o'donnell"); hyphens are separate
/// punctuation tokens, so "sci-fi" yields `sci`, `-`, `fi`.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut raw: Vec<(usize, usize, TokenKind)> = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        if c.is_alphanumeric() {
            let mut end = start + c.len_utf8();
            let mut all_digits = c.is_ascii_digit();
            while let Some(&(idx, next)) = chars.peek() {
                let apostrophe_inside = (next == '\'' || next == '’')
                    && text[idx + next.len_utf8()..]
                        .chars()
                        .next()
                        .is_some_and(char::is_alphanumeric);
                if next.is_alphanumeric() || apostrophe_inside {
                    all_digits &= next.is_ascii_digit();
                    end = idx + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let kind = if all_digits {
                TokenKind::Number
            } else {
                TokenKind::Word
            };
            raw.push((start, end, kind));
        } else {
            raw.push((start, start + c.len_utf8(), TokenKind::Punct));
        }
    }

    let mut sentence_start = true;
    raw.into_iter()
        .map(|(start, end, kind)| {
            let token_text = &text[start..end];
            let lower = token_text.to_lowercase();
            let is_stop = kind == TokenKind::Word && is_stop_word(&lower);
            let pos = match kind {
                TokenKind::Word => tag(token_text, &lower, is_stop, sentence_start),
                _ => Pos::Other,
            };
            sentence_start = matches!(token_text, "." | "!" | "?")
                || (sentence_start && kind == TokenKind::Punct);
            Token {
                text: token_text.to_string(),
                start,
                end,
                kind,
                pos,
                lemma: lemmatize(&lower),
                is_stop,
            }
        })
        .collect()
}

fn tag(text: &str, lower: &str, is_stop: bool, sentence_start: bool) -> Pos {
    if VERBS.contains(&lower) {
        return Pos::Verb;
    }
    if is_stop {
        return Pos::Other;
    }
    if !sentence_start && text.chars().next().is_some_and(char::is_uppercase) {
        return Pos::ProperNoun;
    }
    if lower.len() > 4 && lower.ends_with("ly") && lower != "family" {
        return Pos::Adverb;
    }

    const ADJECTIVE_SUFFIXES: &[&str] = &[
        "ing", "ic", "ous", "ful", "ive", "al", "able", "ible", "ed", "ish", "less", "y",
    ];
    if lower.len() > 3 && ADJECTIVE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        return Pos::Adjective;
    }

    Pos::Noun
}

/// Reduces a lowercase word to a base form with a few plural rules
pub fn lemmatize(lower: &str) -> String {
    const IRREGULAR: &[(&str, &str)] = &[
        ("movies", "movie"),
        ("series", "series"),
        ("children", "child"),
        ("women", "woman"),
        ("men", "man"),
    ];

    if let Some((_, base)) = IRREGULAR.iter().find(|(word, _)| *word == lower) {
        return base.to_string();
    }

    if lower.len() > 4 && lower.ends_with("ies") {
        return format!("{}y", &lower[..lower.len() - 3]);
    }
    if lower.ends_with("sses") {
        return lower[..lower.len() - 2].to_string();
    }
    if lower.len() > 3
        && lower.ends_with('s')
        && !lower.ends_with("ss")
        && !lower.ends_with("us")
        && !lower.ends_with("is")
        && !lower.ends_with('\'')
    {
        return lower[..lower.len() - 1].to_string();
    }

    lower.to_string()
}

/// Recognizes runs of capitalized words as title or person candidates.
///
/// Runs may bridge lowercase connectors ("Lord of the Rings"), hyphens and
/// colons ("Spider-Man: No Way Home") when a capitalized word or a number
/// follows. Two or three plain capitalized words are labelled as a person.
#[derive(Debug, Clone, Default)]
pub struct CapitalizedSpanRecognizer;

impl CapitalizedSpanRecognizer {
    pub fn new() -> Self {
        Self
    }

    fn starts_span(token: &Token) -> bool {
        token.is_capitalized() && !IGNORED_SPAN_WORDS.contains(&token.text.to_lowercase().as_str())
    }

    fn continues_span(token: &Token) -> bool {
        token.is_capitalized() || token.kind == TokenKind::Number
    }

    fn is_bridge(token: &Token) -> bool {
        match token.kind {
            TokenKind::Word | TokenKind::Punct => {
                CONNECTORS.contains(&token.text.to_lowercase().as_str())
                    || matches!(token.text.as_str(), "-" | ":" | "'" | "’")
            }
            TokenKind::Number => false,
        }
    }

    fn label(tokens: &[Token]) -> EntityLabel {
        let words = tokens.iter().filter(|t| t.is_word()).count();
        let plain = tokens.iter().all(|t| t.is_capitalized());
        if plain && (2..=3).contains(&words) {
            EntityLabel::Person
        } else {
            EntityLabel::WorkOfArt
        }
    }
}

impl EntityRecognizer for CapitalizedSpanRecognizer {
    fn recognize(&self, text: &str) -> Vec<EntitySpan> {
        let tokens = tokenize(text);
        let mut spans = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            if !Self::starts_span(&tokens[i]) {
                i += 1;
                continue;
            }

            let start = i;
            let mut end = i + 1;
            loop {
                let mut j = end;
                while j < tokens.len() && Self::is_bridge(&tokens[j]) {
                    j += 1;
                }
                if j < tokens.len() && Self::continues_span(&tokens[j]) {
                    end = j + 1;
                } else {
                    break;
                }
            }

            let slice = &tokens[start..end];
            let span_text = &text[slice[0].start..slice[slice.len() - 1].end];
            spans.push(EntitySpan::new(span_text, Self::label(slice)));
            i = end;
        }

        spans
    }
}
