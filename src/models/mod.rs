mod movie;
mod query;
mod recommendation;

pub use movie::{split_names, MovieRecord};
pub use query::ParsedQuery;
pub use recommendation::{Evidence, Explanation, MovieQuery, RecommendationResult, TitleSnippet};
