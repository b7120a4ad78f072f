use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::types::workout::Workout;

/// A parsed workout plus the raw bytes it came from, kept for Drive upload.
#[derive(Debug)]
pub struct StoredWorkout {
    pub filename: String,
    pub raw: Vec<u8>,
    pub workout: Workout,
}

#[derive(Clone)]
pub struct AppState {
    cache: Arc<DashMap<String, CachedWorkout>>,
    config: Arc<Config>,
}

struct CachedWorkout {
    stored: Arc<StoredWorkout>,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn insert(&self, file_id: String, stored: StoredWorkout) {
        self.cache.insert(
            file_id,
            CachedWorkout {
                stored: Arc::new(stored),
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, file_id: &str) -> Option<Arc<StoredWorkout>> {
        self.cache.get(file_id).map(|entry| entry.stored.clone())
    }

    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.cache
            .retain(|_, cached| now.duration_since(cached.inserted_at) < ttl);
        tracing::info!("Cache eviction complete. Current size: {}", self.cache.len());
    }
}
