use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    db::{MemoryQueryLog, QueryLog},
    error::{AppError, AppResult},
    services::RecommendationEngine,
};

/// Shared application state
///
/// The engine is immutable and shared without locking. Only the shuffle
/// RNG needs a lock.
#[derive(Clone)]
pub struct AppState {
    pub engine: Option<Arc<RecommendationEngine>>,
    pub query_log: Arc<dyn QueryLog>,
    pub rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    /// `engine` is `None` when the model failed to load; recommendation
    /// endpoints then answer 503. A fixed `seed` makes shuffling reproducible.
    pub fn new(
        engine: Option<RecommendationEngine>,
        query_log: Arc<dyn QueryLog>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            engine: engine.map(Arc::new),
            query_log,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// State with an in-memory query log
    pub fn in_memory(engine: Option<RecommendationEngine>, seed: Option<u64>) -> Self {
        Self::new(engine, Arc::new(MemoryQueryLog::new()), seed)
    }

    pub fn model_loaded(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> AppResult<&RecommendationEngine> {
        self.engine.as_deref().ok_or_else(|| {
            AppError::ModelUnavailable("model artifacts are not loaded".to_string())
        })
    }
}
