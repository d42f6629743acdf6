use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::{error::AppResult, models::MovieQuery};

/// Audit trail of served recommendation requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryLog: Send + Sync {
    async fn record(&self, entry: &MovieQuery) -> AppResult<()>;

    /// Most recent entries first
    async fn recent(&self, limit: usize) -> AppResult<Vec<MovieQuery>>;
}

/// `movie_queries` table in PostgreSQL
#[derive(Clone)]
pub struct PgQueryLog {
    pool: PgPool,
}

impl PgQueryLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryLog for PgQueryLog {
    async fn record(&self, entry: &MovieQuery) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO movie_queries (id, query, recommended_movies, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.query)
        .bind(&entry.recommended_movies)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = %entry.id, query = %entry, "Recorded movie query");
        Ok(())
    }

    async fn recent(&self, limit: usize) -> AppResult<Vec<MovieQuery>> {
        let rows = sqlx::query_as::<_, MovieQuery>(
            r#"
            SELECT id, query, recommended_movies, created_at
            FROM movie_queries
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// In-process log used when no database is configured
#[derive(Default)]
pub struct MemoryQueryLog {
    entries: RwLock<Vec<MovieQuery>>,
}

impl MemoryQueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl QueryLog for MemoryQueryLog {
    async fn record(&self, entry: &MovieQuery) -> AppResult<()> {
        self.entries.write().await.push(entry.clone());
        tracing::debug!(id = %entry.id, query = %entry, "Recorded movie query in memory");
        Ok(())
    }

    async fn recent(&self, limit: usize) -> AppResult<Vec<MovieQuery>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}
