//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction. Everything in it
//! is built once at startup and read-only afterwards.

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::uploads::{LocalUploadStore, UploadStore};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// All fields are cheap to clone: `PgPool` is internally reference
/// counted and the rest sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token service with the signing secret resolved at startup
    pub tokens: TokenService,
    /// Where uploaded images go
    pub uploads: Arc<dyn UploadStore>,
}

impl AppState {
    /// Create the state with uploads stored under `config.uploads.dir`
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        let uploads = Arc::new(LocalUploadStore::new(config.uploads.dir.clone()));
        Self::with_uploads(db, config, uploads)
    }

    /// Create the state with a caller-supplied upload store
    pub fn with_uploads(db: PgPool, config: AppConfig, uploads: Arc<dyn UploadStore>) -> Self {
        let tokens = TokenService::from_config(&config.jwt);

        Self {
            db,
            config: Arc::new(config),
            tokens,
            uploads,
        }
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the token service
    #[inline]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[inline]
    pub fn uploads(&self) -> &dyn UploadStore {
        self.uploads.as_ref()
    }
}
