use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Which part of the request produced a group of recommendations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Evidence {
    SimilarTo(String),
    Genre(String),
    Actor(String),
    Director(String),
}

/// A recommended title with the start of its description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TitleSnippet {
    pub title: String,
    pub snippet: String,
}

/// Human-readable account of one evidence branch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Explanation {
    pub evidence: Evidence,
    /// Up to three example titles from the branch
    pub examples: Vec<TitleSnippet>,
}

impl Explanation {
    /// Renders the explanation as a short markdown paragraph
    pub fn render(&self) -> String {
        let header = match &self.evidence {
            Evidence::SimilarTo(title) => format!(
                "Since you enjoyed **{}**, here are some similar movies you might like:",
                title
            ),
            Evidence::Genre(genre) => format!("For the **{}** genre, you might enjoy:", genre),
            Evidence::Actor(actor) => {
                format!("Movies starring **{}** that you might like:", actor)
            }
            Evidence::Director(director) => format!(
                "Movies directed by **{}** that you might enjoy:",
                director
            ),
        };

        let lines: Vec<String> = self
            .examples
            .iter()
            .map(|example| format!("- **{}**: {}...", example.title, example.snippet))
            .collect();

        if lines.is_empty() {
            header
        } else {
            format!("{}\n{}", header, lines.join("\n"))
        }
    }
}

/// Outcome of a recommendation run
///
/// `titles` is duplicate-free, never contains a movie the user named, and is
/// no longer than the requested limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub titles: Vec<String>,
    pub explanations: Vec<Explanation>,
}

impl RecommendationResult {
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// All explanations joined into one response text
    pub fn response_text(&self) -> String {
        self.explanations
            .iter()
            .map(Explanation::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Audit record of a served recommendation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct MovieQuery {
    pub id: Uuid,
    pub query: String,
    /// Comma-separated recommended titles
    pub recommended_movies: String,
    pub created_at: DateTime<Utc>,
}

impl MovieQuery {
    pub fn new(query: impl Into<String>, recommended: &[String]) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.into(),
            recommended_movies: recommended.join(", "),
            created_at: Utc::now(),
        }
    }

    /// Query text shortened to 50 characters for logs
    pub fn query_snippet(&self) -> String {
        if self.query.is_empty() {
            return "No Query Provided".to_string();
        }
        if self.query.chars().count() > 50 {
            let head: String = self.query.chars().take(50).collect();
            format!("{}...", head)
        } else {
            self.query.clone()
        }
    }
}

impl Display for MovieQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.query_snippet())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_genre_explanation() {
        let explanation = Explanation {
            evidence: Evidence::Genre("horror".to_string()),
            examples: vec![TitleSnippet {
                title: "Scream".to_string(),
                snippet: "A killer stalks".to_string(),
            }],
        };

        assert_eq!(
            explanation.render(),
            "For the **horror** genre, you might enjoy:\n- **Scream**: A killer stalks..."
        );
    }

    #[test]
    fn test_response_text_joins_paragraphs() {
        let result = RecommendationResult {
            titles: vec!["Heat".to_string()],
            explanations: vec![
                Explanation {
                    evidence: Evidence::Actor("Al Pacino".to_string()),
                    examples: vec![],
                },
                Explanation {
                    evidence: Evidence::Director("Michael Mann".to_string()),
                    examples: vec![],
                },
            ],
        };

        assert_eq!(
            result.response_text(),
            "Movies starring **Al Pacino** that you might like:\n\n\
             Movies directed by **Michael Mann** that you might enjoy:"
        );
    }

    #[test]
    fn test_movie_query_joins_titles() {
        let record = MovieQuery::new(
            "space movies",
            &["Interstellar".to_string(), "Gravity".to_string()],
        );
        assert_eq!(record.recommended_movies, "Interstellar, Gravity");
        assert_eq!(record.to_string(), "space movies");
    }

    #[test]
    fn test_query_snippet_truncates() {
        let record = MovieQuery::new("a".repeat(60), &[]);
        assert_eq!(record.query_snippet(), format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn test_evidence_serialization() {
        let json = serde_json::to_string(&Evidence::SimilarTo("Heat".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"similar_to","value":"Heat"}"#);
    }
}
