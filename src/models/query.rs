use serde::{Deserialize, Serialize};

/// Structured entities extracted from a free-text request
///
/// Each category is an insertion-ordered set: the first hit for a value wins
/// and later duplicates are dropped. Categories are independent, so the same
/// string may appear as both a genre and a director.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedQuery {
    pub genres: Vec<String>,
    pub specific_movies: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
}

impl ParsedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no category recognized anything
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
            && self.specific_movies.is_empty()
            && self.actors.is_empty()
            && self.directors.is_empty()
    }

    pub fn add_genre(&mut self, genre: impl Into<String>) -> bool {
        insert_unique(&mut self.genres, genre.into())
    }

    pub fn add_movie(&mut self, title: impl Into<String>) -> bool {
        insert_unique(&mut self.specific_movies, title.into())
    }

    pub fn add_actor(&mut self, actor: impl Into<String>) -> bool {
        insert_unique(&mut self.actors, actor.into())
    }

    pub fn add_director(&mut self, director: impl Into<String>) -> bool {
        insert_unique(&mut self.directors, director.into())
    }
}

fn insert_unique(set: &mut Vec<String>, value: String) -> bool {
    if set.contains(&value) {
        return false;
    }
    set.push(value);
    true
}
