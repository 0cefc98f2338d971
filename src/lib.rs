//! Chirpy Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod security;
pub mod token;

pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// Application state shared across all handlers
///
/// The store and the secrets inside `Config` are the only process-wide
/// state; both are immutable after startup (the store mutates behind its
/// own lock). The hit counter feeds the admin metrics page.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub fileserver_hits: Arc<AtomicU64>,
}

impl AppState {
    /// Create a new AppState with the given store and configuration
    pub fn new(db: Db, config: Config) -> Self {
        Self {
            db,
            config,
            fileserver_hits: Arc::new(AtomicU64::new(0)),
        }
    }
}
