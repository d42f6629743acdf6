pub mod dataset;
pub mod extractor;
pub mod fuzzy;
pub mod genres;
pub mod model_store;
pub mod normalize;
pub mod recognizer;
pub mod recommender;
pub mod similarity;
pub mod tfidf;
pub mod tmdb;

pub use extractor::EntityExtractor;
pub use recognizer::{CapitalizedSpanRecognizer, EntityRecognizer};
pub use recommender::{RecommendationEngine, DEFAULT_LIMIT};
pub use similarity::{SimilarityIndex, SimilarityModel};
pub use tmdb::TmdbClient;
