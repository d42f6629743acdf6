use serde::{Deserialize, Deserializer, Serialize};

/// A movie in the recommendation dataset
///
/// `genres`, `actors` and `directors` are comma-joined lists, exactly as they
/// are stored in the dataset. Records are immutable once the model is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieRecord {
    /// Display title, unique per movie
    pub title: String,
    /// Plot overview used for TF-IDF similarity
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Comma-joined genre names
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: String,
    /// Comma-joined cast names
    #[serde(default, deserialize_with = "null_as_empty")]
    pub actors: String,
    /// Comma-joined director names
    #[serde(default, deserialize_with = "null_as_empty")]
    pub directors: String,
}

impl MovieRecord {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            genres: String::new(),
            actors: String::new(),
            directors: String::new(),
        }
    }

    pub fn with_genres(mut self, genres: impl Into<String>) -> Self {
        self.genres = genres.into();
        self
    }

    pub fn with_actors(mut self, actors: impl Into<String>) -> Self {
        self.actors = actors.into();
        self
    }

    pub fn with_directors(mut self, directors: impl Into<String>) -> Self {
        self.directors = directors.into();
        self
    }

    /// First `max_chars` characters of the description, for explanations
    pub fn snippet(&self, max_chars: usize) -> String {
        self.description.chars().take(max_chars).collect()
    }
}

/// Missing values in the dataset are treated as empty strings
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Splits a multi-name field ("A, B and C & D") into trimmed individual names
pub fn split_names(field: &str) -> Vec<String> {
    field
        .split(',')
        .flat_map(|part| part.split(" and "))
        .flat_map(|part| part.split('&'))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
