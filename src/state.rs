use std::time::{Instant, SystemTime};

use sqlx::SqlitePool;

use crate::services::generation::GenerationProvider;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    pool: SqlitePool,
    generation: GenerationProvider,
}

impl AppState {
    pub fn new(pool: SqlitePool, generation: GenerationProvider) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            pool,
            generation,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn generation(&self) -> &GenerationProvider {
        &self.generation
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }
}
