use ndarray::Array2;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
};

use super::genres;
use super::normalize::title_key;
use super::tfidf::{cosine_similarity_matrix, TfidfVectorizer};

/// Precomputed recommendation model
///
/// Row `i` of `similarity` belongs to `movies[i]`. `title_index` holds one
/// entry per distinct normalized title, pointing at its first occurrence.
#[derive(Debug, Clone)]
pub struct SimilarityModel {
    pub vectorizer: TfidfVectorizer,
    pub movies: Vec<MovieRecord>,
    pub title_index: BTreeMap<String, usize>,
    pub similarity: Array2<f32>,
}

impl SimilarityModel {
    /// Fits TF-IDF over the descriptions and computes all pairwise cosine
    /// similarities. Intended for the offline build, not the request path.
    pub fn build(movies: Vec<MovieRecord>) -> Self {
        tracing::info!(movie_count = movies.len(), "Generating TF-IDF matrix");
        let descriptions: Vec<&str> = movies.iter().map(|m| m.description.as_str()).collect();
        let (vectorizer, document_matrix) = TfidfVectorizer::fit_transform(&descriptions);

        tracing::info!(
            vocabulary = vectorizer.vocabulary_size(),
            "Calculating cosine similarity"
        );
        let similarity = cosine_similarity_matrix(&document_matrix);

        let title_index = build_title_index(&movies);

        Self {
            vectorizer,
            movies,
            title_index,
            similarity,
        }
    }

    /// Assembles a model from separately loaded parts, rejecting any
    /// combination whose row indexing disagrees
    pub fn from_parts(
        vectorizer: TfidfVectorizer,
        movies: Vec<MovieRecord>,
        title_index: BTreeMap<String, usize>,
        similarity: Array2<f32>,
    ) -> AppResult<Self> {
        let model = Self {
            vectorizer,
            movies,
            title_index,
            similarity,
        };
        model.validate()?;
        Ok(model)
    }

    /// Checks the invariants tying the four parts together
    pub fn validate(&self) -> AppResult<()> {
        let n = self.movies.len();

        if self.similarity.dim() != (n, n) {
            return Err(AppError::InvalidModel(format!(
                "similarity matrix is {:?}, expected ({}, {})",
                self.similarity.dim(),
                n,
                n
            )));
        }

        if self.vectorizer.document_count() != n || !self.vectorizer.is_consistent() {
            return Err(AppError::InvalidModel(format!(
                "vectorizer was fitted on {} documents, dataset has {}",
                self.vectorizer.document_count(),
                n
            )));
        }

        let expected = build_title_index(&self.movies);
        if expected != self.title_index {
            return Err(AppError::InvalidModel(format!(
                "title index has {} entries that do not match the {} distinct dataset titles",
                self.title_index.len(),
                expected.len()
            )));
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

/// Maps each normalized title to its first row; later duplicates are dropped
pub fn build_title_index(movies: &[MovieRecord]) -> BTreeMap<String, usize> {
    let mut index = BTreeMap::new();

    for (row, movie) in movies.iter().enumerate() {
        let key = title_key(&movie.title);
        if let Some(&kept) = index.get(&key) {
            tracing::warn!(
                title = %movie.title,
                row,
                kept_row = kept,
                "Duplicate normalized title, keeping first occurrence"
            );
            continue;
        }
        index.insert(key, row);
    }

    index
}

/// Read-only lookups over a [`SimilarityModel`]
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    model: SimilarityModel,
}

impl SimilarityIndex {
    pub fn new(model: SimilarityModel) -> Self {
        Self { model }
    }

    /// The `k` most similar other movies, best first.
    ///
    /// Unknown titles yield an empty list. Rows sharing the title's key are
    /// never returned. Equal scores keep row order.
    pub fn neighbors(&self, title: &str, k: usize) -> Vec<(String, f32)> {
        let key = title_key(title);
        let Some(&row) = self.model.title_index.get(&key) else {
            tracing::warn!(title = %title, "Title not found in index");
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .model
            .similarity
            .row(row)
            .iter()
            .copied()
            .enumerate()
            // duplicate rows of the same title are the title itself
            .filter(|(i, _)| *i != row && title_key(&self.model.movies[*i].title) != key)
            .collect();

        // stable, so ties stay in row order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(i, score)| (self.model.movies[i].title.clone(), score))
            .collect()
    }

    /// Titles whose genres contain `genre` (or an equivalent spelling such
    /// as "science fiction" for "sci-fi"), case-insensitively
    pub fn by_genre(&self, genre: &str) -> Vec<String> {
        self.by_field(&genres::equivalents(genre), |m| m.genres.as_str())
    }

    /// Titles whose cast contains `actor`, case-insensitively
    pub fn by_actor(&self, actor: &str) -> Vec<String> {
        self.by_field(&[actor.to_lowercase()], |m| m.actors.as_str())
    }

    /// Titles whose directors contain `director`, case-insensitively
    pub fn by_director(&self, director: &str) -> Vec<String> {
        self.by_field(&[director.to_lowercase()], |m| m.directors.as_str())
    }

    /// Row-ordered titles whose `field` contains any of the lowercase `needles`
    fn by_field<F>(&self, needles: &[String], field: F) -> Vec<String>
    where
        F: Fn(&MovieRecord) -> &str,
    {
        let needles: Vec<&str> = needles
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();
        if needles.is_empty() {
            return Vec::new();
        }

        self.model
            .movies
            .iter()
            .filter(|m| {
                let haystack = field(m).to_lowercase();
                needles.iter().any(|n| haystack.contains(n))
            })
            .map(|m| m.title.clone())
            .collect()
    }

    /// The indexed record for `title` (normalized lookup)
    pub fn movie(&self, title: &str) -> Option<&MovieRecord> {
        self.model
            .title_index
            .get(&title_key(title))
            .map(|&row| &self.model.movies[row])
    }

    pub fn movies(&self) -> &[MovieRecord] {
        &self.model.movies
    }

    pub fn model(&self) -> &SimilarityModel {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies() -> Vec<MovieRecord> {
        vec![
            MovieRecord::new("Interstellar", "Astronauts travel through a wormhole in space")
                .with_genres("Adventure, Drama, Science Fiction")
                .with_directors("Christopher Nolan"),
            MovieRecord::new("Gravity", "Astronauts stranded in space after an accident")
                .with_genres("Science Fiction, Thriller")
                .with_actors("Sandra Bullock, George Clooney"),
            MovieRecord::new("The Martian", "An astronaut stranded on Mars must survive")
                .with_genres("Drama, Science Fiction")
                .with_actors("Matt Damon"),
            MovieRecord::new("Notting Hill", "A bookseller falls for a famous actress")
                .with_genres("Comedy, Romance"),
            MovieRecord::new("Inception", "A thief steals secrets through dreams")
                .with_genres("Action, Science Fiction")
                .with_directors("Christopher Nolan"),
        ]
    }

    fn index() -> SimilarityIndex {
        SimilarityIndex::new(SimilarityModel::build(movies()))
    }

    #[test]
    fn test_build_shapes() {
        let model = SimilarityModel::build(movies());
        assert_eq!(model.similarity.dim(), (5, 5));
        assert_eq!(model.title_index.len(), 5);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_neighbors_exclude_self_and_sort_descending() {
        let index = index();
        let neighbors = index.neighbors("Interstellar", 10);

        assert_eq!(neighbors.len(), 4);
        assert!(neighbors.iter().all(|(title, _)| title != "Interstellar"));
        assert!(neighbors.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(neighbors[0].0, "Gravity");
    }

    #[test]
    fn test_neighbors_respect_k() {
        let index = index();
        assert_eq!(index.neighbors("interstellar", 2).len(), 2);
        assert!(index.neighbors("Interstellar", 0).is_empty());
    }

    #[test]
    fn test_neighbors_ties_keep_row_order() {
        let index = index();
        // only Gravity shares terms with Interstellar
        let neighbors = index.neighbors("Interstellar", 4);
        let zero: Vec<&str> = neighbors
            .iter()
            .filter(|(_, score)| *score == 0.0)
            .map(|(title, _)| title.as_str())
            .collect();
        assert_eq!(zero, vec!["The Martian", "Notting Hill", "Inception"]);
    }

    #[test]
    fn test_neighbors_of_unknown_title() {
        assert!(index().neighbors("unknown title", 5).is_empty());
    }

    #[test]
    fn test_attribute_queries() {
        let index = index();
        assert_eq!(
            index.by_genre("science fiction"),
            vec!["Interstellar", "Gravity", "The Martian", "Inception"]
        );
        assert_eq!(index.by_actor("matt damon"), vec!["The Martian"]);
        assert_eq!(
            index.by_director("Christopher Nolan"),
            vec!["Interstellar", "Inception"]
        );
        assert_eq!(index.by_genre("sci-fi"), index.by_genre("science fiction"));
        assert!(index.by_genre("western").is_empty());
        assert!(index.by_genre("  ").is_empty());
    }

    #[test]
    fn test_duplicate_titles_keep_first_row() {
        let mut data = movies();
        data.push(
            MovieRecord::new("INTERSTELLAR", "A romantic comedy in Paris").with_genres("Romance"),
        );

        let model = SimilarityModel::build(data);
        assert_eq!(model.similarity.dim(), (6, 6));
        assert_eq!(model.title_index.len(), 5);
        assert_eq!(model.title_index["interstellar"], 0);

        let index = SimilarityIndex::new(model);
        let neighbors = index.neighbors("Interstellar", 1);
        assert_eq!(neighbors[0].0, "Gravity");
        assert_eq!(index.movie("interstellar").unwrap().description, movies()[0].description);
    }

    #[test]
    fn test_neighbors_skip_rows_with_the_same_title() {
        let description = "Astronauts travel through a wormhole in space";
        let model = SimilarityModel::build(vec![
            MovieRecord::new("Interstellar", description),
            MovieRecord::new("Gravity", "Astronauts stranded in space after an accident"),
            MovieRecord::new("INTERSTELLAR", description),
        ]);
        let index = SimilarityIndex::new(model);

        let neighbors = index.neighbors("Interstellar", 10);
        let titles: Vec<&str> = neighbors.iter().map(|(title, _)| title.as_str()).collect();
        assert_eq!(titles, vec!["Gravity"]);
    }

    #[test]
    fn test_untrimmed_titles_are_found() {
        let model = SimilarityModel::build(vec![
            MovieRecord::new(" Heat ", "A detective hunts a crew of thieves in Los Angeles"),
            MovieRecord::new("Collateral", "A hitman forces a cab driver across Los Angeles"),
        ]);
        assert!(model.title_index.contains_key("heat"));

        let index = SimilarityIndex::new(model);
        assert_eq!(index.neighbors("Heat", 5)[0].0, "Collateral");
        assert!(index.movie("heat").is_some());
    }

    #[test]
    fn test_from_parts_rejects_mismatched_matrix() {
        let model = SimilarityModel::build(movies());
        let result = SimilarityModel::from_parts(
            model.vectorizer.clone(),
            model.movies.clone(),
            model.title_index.clone(),
            Array2::zeros((4, 4)),
        );
        assert!(matches!(result, Err(AppError::InvalidModel(_))));
    }

    #[test]
    fn test_from_parts_rejects_stale_title_index() {
        let model = SimilarityModel::build(movies());
        let mut title_index = model.title_index.clone();
        title_index.remove("gravity");

        let result = SimilarityModel::from_parts(
            model.vectorizer.clone(),
            model.movies.clone(),
            title_index,
            model.similarity.clone(),
        );
        assert!(matches!(result, Err(AppError::InvalidModel(_))));
    }
}
