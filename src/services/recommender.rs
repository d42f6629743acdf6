use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::models::{Evidence, Explanation, ParsedQuery, RecommendationResult, TitleSnippet};

use super::extractor::EntityExtractor;
use super::normalize::title_key;
use super::recognizer::EntityRecognizer;
use super::similarity::{SimilarityIndex, SimilarityModel};

/// Result size when the caller does not ask for one
pub const DEFAULT_LIMIT: usize = 10;

/// Neighbors fetched for each movie named in the query
pub const NEIGHBORS_PER_TITLE: usize = 10;

/// Candidates kept from each genre, actor or director after shuffling
pub const CANDIDATES_PER_ATTRIBUTE: usize = 10;

const EXAMPLES_PER_EXPLANATION: usize = 3;
const SNIPPET_CHARS: usize = 100;

/// Insertion-ordered candidate set keyed by normalized title
struct CandidatePool {
    titles: Vec<String>,
    seen: HashSet<String>,
    excluded: HashSet<String>,
}

impl CandidatePool {
    fn excluding(titles: &[String]) -> Self {
        Self {
            titles: Vec::new(),
            seen: HashSet::new(),
            excluded: titles.iter().map(|t| title_key(t)).collect(),
        }
    }

    fn is_excluded(&self, title: &str) -> bool {
        self.excluded.contains(&title_key(title))
    }

    fn extend<I>(&mut self, titles: I)
    where
        I: IntoIterator<Item = String>,
    {
        for title in titles {
            let key = title_key(&title);
            if self.excluded.contains(&key) || !self.seen.insert(key) {
                continue;
            }
            self.titles.push(title);
        }
    }
}

/// Recommendation engine: entity extraction plus candidate aggregation over
/// an immutable similarity model.
///
/// Safe to share across request handlers; nothing mutates after construction.
pub struct RecommendationEngine {
    extractor: EntityExtractor,
    index: SimilarityIndex,
}

impl RecommendationEngine {
    pub fn new(model: SimilarityModel) -> Self {
        let extractor = EntityExtractor::new(&model.movies);
        Self {
            extractor,
            index: SimilarityIndex::new(model),
        }
    }

    pub fn with_recognizer(model: SimilarityModel, recognizer: Box<dyn EntityRecognizer>) -> Self {
        let extractor = EntityExtractor::with_recognizer(&model.movies, recognizer);
        Self {
            extractor,
            index: SimilarityIndex::new(model),
        }
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    /// Extracts entities from a non-empty query
    pub fn parse(&self, query: &str) -> ParsedQuery {
        self.extractor.parse(query)
    }

    /// Merges similarity, genre, actor and director candidates.
    ///
    /// Attribute matches are shuffled with `rng` before being capped, so
    /// repeated queries vary. Movies named in the query are never returned.
    /// At most `limit` titles (minimum 1) come back; an empty query or no
    /// matches gives an empty result rather than an error.
    pub fn recommend<R>(&self, parsed: &ParsedQuery, limit: usize, rng: &mut R) -> RecommendationResult
    where
        R: Rng + ?Sized,
    {
        let limit = limit.max(1);
        let mut pool = CandidatePool::excluding(&parsed.specific_movies);
        let mut explanations = Vec::new();

        for title in &parsed.specific_movies {
            let similar: Vec<String> = self
                .index
                .neighbors(title, NEIGHBORS_PER_TITLE)
                .into_iter()
                .map(|(title, _)| title)
                .collect();
            self.collect(
                &mut pool,
                &mut explanations,
                Evidence::SimilarTo(title.clone()),
                similar,
            );
        }

        for genre in &parsed.genres {
            let candidates = sample(self.index.by_genre(genre), rng);
            self.collect(
                &mut pool,
                &mut explanations,
                Evidence::Genre(genre.clone()),
                candidates,
            );
        }

        for actor in &parsed.actors {
            let candidates = sample(self.index.by_actor(actor), rng);
            self.collect(
                &mut pool,
                &mut explanations,
                Evidence::Actor(actor.clone()),
                candidates,
            );
        }

        for director in &parsed.directors {
            let candidates = sample(self.index.by_director(director), rng);
            self.collect(
                &mut pool,
                &mut explanations,
                Evidence::Director(director.clone()),
                candidates,
            );
        }

        let mut titles = pool.titles;
        titles.truncate(limit);

        tracing::debug!(
            count = titles.len(),
            branches = explanations.len(),
            "Aggregated recommendations"
        );

        RecommendationResult {
            titles,
            explanations,
        }
    }

    /// Parses `query` and recommends in one step
    pub fn recommend_query<R>(&self, query: &str, limit: usize, rng: &mut R) -> (ParsedQuery, RecommendationResult)
    where
        R: Rng + ?Sized,
    {
        let parsed = self.parse(query);
        let result = self.recommend(&parsed, limit, rng);
        (parsed, result)
    }

    fn collect(
        &self,
        pool: &mut CandidatePool,
        explanations: &mut Vec<Explanation>,
        evidence: Evidence,
        candidates: Vec<String>,
    ) {
        let candidates: Vec<String> = candidates
            .into_iter()
            .filter(|title| !pool.is_excluded(title))
            .collect();
        if candidates.is_empty() {
            return;
        }

        let examples = candidates
            .iter()
            .take(EXAMPLES_PER_EXPLANATION)
            .map(|title| TitleSnippet {
                title: title.clone(),
                snippet: self
                    .index
                    .movie(title)
                    .map(|movie| movie.snippet(SNIPPET_CHARS))
                    .unwrap_or_default(),
            })
            .collect();
        explanations.push(Explanation { evidence, examples });

        pool.extend(candidates);
    }
}

/// Shuffles attribute matches and keeps the first few
fn sample<R>(mut titles: Vec<String>, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
{
    titles.shuffle(rng);
    titles.truncate(CANDIDATES_PER_ATTRIBUTE);
    titles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine() -> RecommendationEngine {
        let movies = vec![
            MovieRecord::new("Heat", "A detective hunts a crew of professional thieves in Los Angeles")
                .with_genres("Thriller, Action, Crime")
                .with_actors("Al Pacino, Robert De Niro")
                .with_directors("Michael Mann"),
            MovieRecord::new("Collateral", "A cab driver is forced to drive a hitman across Los Angeles")
                .with_genres("Thriller, Action")
                .with_actors("Tom Cruise, Jamie Foxx")
                .with_directors("Michael Mann"),
            MovieRecord::new("Groundhog Day", "A weatherman relives the same day over and over")
                .with_genres("Comedy")
                .with_actors("Bill Murray"),
            MovieRecord::new("Top Gun", "A hotshot pilot trains at an elite flight school")
                .with_genres("Action")
                .with_actors("Tom Cruise")
                .with_directors("Tony Scott"),
        ];
        RecommendationEngine::new(SimilarityModel::build(movies))
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_empty_query_gives_empty_result() {
        let result = engine().recommend(&ParsedQuery::new(), DEFAULT_LIMIT, &mut rng());
        assert!(result.is_empty());
        assert!(result.explanations.is_empty());
    }

    #[test]
    fn test_genre_scenario_excludes_unrelated_movies() {
        let engine = engine();
        let (parsed, result) =
            engine.recommend_query("I want a thrilling action movie", DEFAULT_LIMIT, &mut rng());

        assert!(parsed.genres.contains(&"thriller".to_string()));
        assert!(parsed.genres.contains(&"action".to_string()));
        assert!(!result.titles.contains(&"Groundhog Day".to_string()));
        assert!(result.titles.contains(&"Heat".to_string()));
        assert!(result.titles.contains(&"Collateral".to_string()));
    }

    #[test]
    fn test_named_movies_are_never_recommended() {
        let engine = engine();
        let mut parsed = ParsedQuery::new();
        parsed.add_movie("Heat");
        parsed.add_genre("thriller");
        parsed.add_director("Michael Mann");

        let result = engine.recommend(&parsed, DEFAULT_LIMIT, &mut rng());
        assert!(!result.titles.iter().any(|t| t == "Heat"));
        assert!(result.titles.contains(&"Collateral".to_string()));
    }

    #[test]
    fn test_results_are_unique_and_limited() {
        let engine = engine();
        let mut parsed = ParsedQuery::new();
        parsed.add_genre("action");
        parsed.add_actor("Tom Cruise");
        parsed.add_director("Michael Mann");

        let result = engine.recommend(&parsed, 2, &mut rng());
        assert_eq!(result.len(), 2);

        let all = engine.recommend(&parsed, DEFAULT_LIMIT, &mut rng());
        let unique: HashSet<&String> = all.titles.iter().collect();
        assert_eq!(unique.len(), all.titles.len());
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_zero_limit_is_raised_to_one() {
        let mut parsed = ParsedQuery::new();
        parsed.add_genre("action");
        assert_eq!(engine().recommend(&parsed, 0, &mut rng()).len(), 1);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let engine = engine();
        let mut parsed = ParsedQuery::new();
        parsed.add_genre("action");

        let first = engine.recommend(&parsed, DEFAULT_LIMIT, &mut StdRng::seed_from_u64(1));
        let second = engine.recommend(&parsed, DEFAULT_LIMIT, &mut StdRng::seed_from_u64(1));
        assert_eq!(first, second);
    }

    #[test]
    fn test_similar_titles_are_explained() {
        let engine = engine();
        let mut parsed = ParsedQuery::new();
        parsed.add_movie("Heat");

        let result = engine.recommend(&parsed, DEFAULT_LIMIT, &mut rng());
        assert_eq!(result.titles[0], "Collateral");
        assert_eq!(
            result.explanations[0].evidence,
            Evidence::SimilarTo("Heat".to_string())
        );
        assert_eq!(result.explanations[0].examples.len(), 3);
        assert!(result.response_text().starts_with("Since you enjoyed **Heat**"));
    }

    #[test]
    fn test_padded_dataset_title_still_recommends() {
        let engine = RecommendationEngine::new(SimilarityModel::build(vec![
            MovieRecord::new(" Heat ", "A detective hunts thieves in Los Angeles"),
            MovieRecord::new("Collateral", "A cab driver is forced to drive a hitman across Los Angeles"),
        ]));

        let (parsed, result) = engine.recommend_query("movies like Heat", DEFAULT_LIMIT, &mut rng());
        assert_eq!(parsed.specific_movies, vec!["Heat"]);
        assert_eq!(result.titles, vec!["Collateral"]);
    }

    #[test]
    fn test_unknown_attribute_yields_nothing() {
        let mut parsed = ParsedQuery::new();
        parsed.add_actor("Nobody Famous");
        let result = engine().recommend(&parsed, DEFAULT_LIMIT, &mut rng());
        assert!(result.is_empty());
        assert!(result.explanations.is_empty());
    }
}
