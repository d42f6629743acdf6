use std::sync::Arc;

use nancy::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, MemoryQueryLog, PgQueryLog, QueryLog},
    services::{model_store, RecommendationEngine},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nancy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The server stays up without a model; recommendation endpoints answer 503
    let engine = match model_store::load(&config.model_dir) {
        Ok(model) => Some(RecommendationEngine::new(model)),
        Err(e) => {
            tracing::error!(
                model_dir = %config.model_dir.display(),
                error = %e,
                "Failed to load recommendation model"
            );
            None
        }
    };

    let query_log: Arc<dyn QueryLog> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            Arc::new(PgQueryLog::new(create_pool(url).await?))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping query log in memory");
            Arc::new(MemoryQueryLog::new())
        }
    };

    let state = AppState::new(engine, query_log, config.random_seed);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
