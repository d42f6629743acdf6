use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{MovieQuery, ParsedQuery},
    services::DEFAULT_LIMIT,
};

use super::AppState;

/// Longest accepted query, in characters
pub const MAX_QUERY_CHARS: usize = 1000;

/// Largest accepted `limit`
pub const MAX_LIMIT: usize = 100;

const NOT_UNDERSTOOD: &str = "I couldn't recognize any movies, genres, actors or directors in your query. \
                              Could you please try asking differently?";
const NO_RECOMMENDATIONS: &str = "I couldn't find any recommendations based on your query. \
                                  Could you please try asking differently?";

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub response: String,
    pub recommended_movies: Vec<String>,
    pub parsed_query: ParsedQuery,
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct RecentQueriesParams {
    pub limit: Option<usize>,
}

fn validate_query(query: &str) -> AppResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("query must not be empty".to_string()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::InvalidInput(format!(
            "query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }
    Ok(query)
}

fn validate_limit(limit: Option<usize>) -> AppResult<usize> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(limit) if (1..=MAX_LIMIT).contains(&limit) => Ok(limit),
        Some(limit) => Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, limit
        ))),
    }
}

// Handlers

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "model_loaded": state.model_loaded(),
        })),
    )
}

/// Parses a free-text request and recommends movies for it
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<RecommendResponse>> {
    let query = validate_query(&request.query)?;
    let limit = validate_limit(request.limit)?;
    let engine = state.engine()?;

    tracing::info!(query = %query, limit, "Received recommendation query");

    let parsed = engine.parse(query);
    tracing::info!(
        genres = ?parsed.genres,
        specific_movies = ?parsed.specific_movies,
        actors = ?parsed.actors,
        directors = ?parsed.directors,
        "Parsed query"
    );

    if parsed.is_empty() {
        return Err(AppError::InvalidInput(NOT_UNDERSTOOD.to_string()));
    }

    let result = {
        let mut rng = state.rng.lock().await;
        engine.recommend(&parsed, limit, &mut *rng)
    };

    if result.is_empty() {
        tracing::warn!(query = %query, "No recommendations found");
        return Err(AppError::NotFound(NO_RECOMMENDATIONS.to_string()));
    }

    tracing::info!(count = result.len(), recommendations = ?result.titles, "Recommendations ready");

    let entry = MovieQuery::new(query, &result.titles);
    if let Err(e) = state.query_log.record(&entry).await {
        tracing::error!(error = %e, query = %entry, "Failed to record movie query");
    }

    Ok(Json(RecommendResponse {
        response: result.response_text(),
        recommended_movies: result.titles,
        parsed_query: parsed,
    }))
}

/// Entity extraction only, without recommending
pub async fn parse(
    State(state): State<AppState>,
    Json(request): Json<ParseRequest>,
) -> AppResult<Json<ParsedQuery>> {
    let query = validate_query(&request.query)?;
    let engine = state.engine()?;
    Ok(Json(engine.parse(query)))
}

/// The chat UI lives in the frontend; this only points clients at `/recommend`
pub async fn chat() -> Json<Value> {
    Json(json!({
        "detail": "Chat interface is handled via the frontend. Use the /api/v1/recommend endpoint for recommendations."
    }))
}

/// Latest audit log entries, newest first
pub async fn recent_queries(
    State(state): State<AppState>,
    Query(params): Query<RecentQueriesParams>,
) -> AppResult<Json<Vec<MovieQuery>>> {
    let limit = validate_limit(params.limit)?;
    let entries = state.query_log.recent(limit).await?;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("  sci-fi movies ").unwrap(), "sci-fi movies");
        assert!(validate_query("").is_err());
        assert!(validate_query(" \t\n").is_err());
        assert!(validate_query(&"a".repeat(MAX_QUERY_CHARS)).is_ok());
        assert!(validate_query(&"a".repeat(MAX_QUERY_CHARS + 1)).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(None).unwrap(), DEFAULT_LIMIT);
        assert_eq!(validate_limit(Some(3)).unwrap(), 3);
        assert!(validate_limit(Some(0)).is_err());
        assert!(validate_limit(Some(MAX_LIMIT + 1)).is_err());
    }
}
