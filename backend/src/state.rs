//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.

use crate::config::AppConfig;
use crate::repositories::SqliteMealRepository;
use crate::services::MealService;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared application state
///
/// Every field is cheap to clone: the pool and the service's store are
/// reference counted and the config sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Meal service backed by the pool
    pub meals: MealService,
}

impl AppState {
    /// Create a new application state around an already migrated pool
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let meals = MealService::new(Arc::new(SqliteMealRepository::new(db.clone())));

        Self {
            db,
            config: Arc::new(config),
            meals,
        }
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the meal service
    #[inline]
    pub fn meals(&self) -> &MealService {
        &self.meals
    }
}
