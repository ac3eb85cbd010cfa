//! AcademicWorld Common Library
//!
//! Shared code for the AcademicWorld dashboard backend including:
//! - Relational store models and the keyword ranking repository
//! - Graph store queries
//! - Session favorites storage
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod errors;
pub mod favorites;
pub mod graph;
pub mod keyword;
pub mod metrics;
pub mod session;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, KeywordRankings, Repository};
pub use errors::{AppError, Result};
pub use favorites::{create_favorites_store, FavoriteCategory, Favorites, FavoritesStore};
pub use graph::{GraphClient, GraphQueries, GraphRepository};
pub use keyword::Keyword;
pub use session::SessionContext;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
