//! TMDB dataset import
//!
//! Builds a movie dataset from TMDB's popular list:
//! 1. Genre names: /genre/movie/list → id → name map, fetched once
//! 2. Movies: /movie/popular?page=n → title, overview, genre ids
//! 3. Cast and directors: /movie/{id}/credits → top five cast, crew with job "Director"
//!
//! Requests are spaced out to stay under TMDB's rate limit.
use reqwest::Client as HttpClient;
use serde::{de::DeserializeOwned, Deserialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
};

const REQUEST_DELAY: Duration = Duration::from_millis(250);
const TOP_CAST: usize = 5;

#[derive(Debug, Deserialize)]
pub struct PopularPage {
    pub page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    id: u64,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Deserialize)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches up to `pages` pages of popular movies with genres and credits.
    ///
    /// A movie whose credits cannot be fetched is kept without names.
    pub async fn fetch_popular(&self, pages: u32) -> AppResult<Vec<MovieRecord>> {
        let genres = self.genres().await?;
        tracing::info!(genre_count = genres.len(), "Loaded TMDB genre list");

        let mut movies = Vec::new();
        let mut page = 1;
        let mut total_pages = pages;

        while page <= pages.min(total_pages) {
            tokio::time::sleep(REQUEST_DELAY).await;
            let popular = self.popular(page).await?;
            total_pages = popular.total_pages;

            tracing::info!(page, total_pages, count = popular.results.len(), "Fetched TMDB page");

            for movie in popular.results {
                tokio::time::sleep(REQUEST_DELAY).await;
                let credits = match self.credits(movie.id).await {
                    Ok(credits) => credits,
                    Err(e) => {
                        tracing::warn!(
                            tmdb_id = movie.id,
                            title = %movie.title,
                            error = %e,
                            "Failed to fetch credits"
                        );
                        Credits::default()
                    }
                };
                movies.push(to_record(movie, &genres, &credits));
            }

            page += 1;
        }

        tracing::info!(movie_count = movies.len(), "Finished TMDB import");
        Ok(movies)
    }

    pub async fn popular(&self, page: u32) -> AppResult<PopularPage> {
        let page = page.to_string();
        self.get("/movie/popular", &[("page", page.as_str())]).await
    }

    pub async fn genres(&self) -> AppResult<HashMap<u64, String>> {
        let list: GenreList = self.get("/genre/movie/list", &[]).await?;
        Ok(list.genres.into_iter().map(|g| (g.id, g.name)).collect())
    }

    pub async fn credits(&self, movie_id: u64) -> AppResult<Credits> {
        self.get(&format!("/movie/{}/credits", movie_id), &[]).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {} for {}: {}",
                status, path, body
            )));
        }

        Ok(response.json().await?)
    }
}

/// Flattens a TMDB movie and its credits into a dataset record
pub fn to_record(movie: TmdbMovie, genres: &HashMap<u64, String>, credits: &Credits) -> MovieRecord {
    let genre_names: Vec<&str> = movie
        .genre_ids
        .iter()
        .filter_map(|id| genres.get(id).map(String::as_str))
        .collect();

    let mut cast: Vec<&CastMember> = credits.cast.iter().collect();
    cast.sort_by_key(|c| c.order);
    let actors: Vec<&str> = cast.iter().take(TOP_CAST).map(|c| c.name.as_str()).collect();

    let directors: Vec<&str> = credits
        .crew
        .iter()
        .filter(|c| c.job == "Director")
        .map(|c| c.name.as_str())
        .collect();

    MovieRecord::new(movie.title, movie.overview.unwrap_or_default())
        .with_genres(genre_names.join(", "))
        .with_actors(actors.join(", "))
        .with_directors(directors.join(", "))
}
