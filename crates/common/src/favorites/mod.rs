//! Session-scoped favorites
//!
//! Each browser session owns one favorites document with three categories
//! (professors, universities, topics). Documents are created lazily, never
//! hold duplicate entries, and are never deleted by this service.

mod memory;
mod mongo_store;
mod redis_store;

pub use memory::InMemoryFavoritesStore;
pub use mongo_store::{FavoritesDocument, MongoFavoritesStore};
pub use redis_store::RedisFavoritesStore;

use crate::config::FavoritesConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The fixed set of favorite categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteCategory {
    Professors,
    Universities,
    Topics,
}

impl FavoriteCategory {
    pub const ALL: [FavoriteCategory; 3] = [
        FavoriteCategory::Professors,
        FavoriteCategory::Universities,
        FavoriteCategory::Topics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FavoriteCategory::Professors => "professors",
            FavoriteCategory::Universities => "universities",
            FavoriteCategory::Topics => "topics",
        }
    }
}

impl fmt::Display for FavoriteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FavoriteCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "professors" => Ok(FavoriteCategory::Professors),
            "universities" => Ok(FavoriteCategory::Universities),
            "topics" => Ok(FavoriteCategory::Topics),
            other => Err(AppError::validation(
                "category",
                format!("Unknown favorite category '{}'", other),
            )),
        }
    }
}

/// Snapshot of one session's favorites, each category in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorites {
    pub professors: Vec<String>,
    pub universities: Vec<String>,
    pub topics: Vec<String>,
}

impl Favorites {
    pub fn category(&self, category: FavoriteCategory) -> &[String] {
        match category {
            FavoriteCategory::Professors => &self.professors,
            FavoriteCategory::Universities => &self.universities,
            FavoriteCategory::Topics => &self.topics,
        }
    }

    fn category_mut(&mut self, category: FavoriteCategory) -> &mut Vec<String> {
        match category {
            FavoriteCategory::Professors => &mut self.professors,
            FavoriteCategory::Universities => &mut self.universities,
            FavoriteCategory::Topics => &mut self.topics,
        }
    }

    /// Set-add: returns false when the item was already present
    pub fn insert(&mut self, category: FavoriteCategory, item: &str) -> bool {
        let items = self.category_mut(category);
        if items.iter().any(|existing| existing == item) {
            return false;
        }
        items.push(item.to_string());
        true
    }

    /// Set-remove: returns false when the item was absent
    pub fn remove(&mut self, category: FavoriteCategory, item: &str) -> bool {
        let items = self.category_mut(category);
        let before = items.len();
        items.retain(|existing| existing != item);
        items.len() != before
    }

    pub fn is_empty(&self) -> bool {
        FavoriteCategory::ALL
            .iter()
            .all(|c| self.category(*c).is_empty())
    }
}

/// Storage for per-session favorites documents
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Return the session's document, creating an empty one if none exists.
    /// Concurrent first calls for one session create a single document.
    async fn ensure(&self, session_id: &str) -> Result<Favorites>;

    /// Add an item to a category; no effect when already present
    async fn add(&self, session_id: &str, category: FavoriteCategory, item: &str) -> Result<()>;

    /// Remove an item from a category; no effect when absent
    async fn remove(&self, session_id: &str, category: FavoriteCategory, item: &str) -> Result<()>;

    /// Read the session's favorites, empty for unknown sessions
    async fn get(&self, session_id: &str) -> Result<Favorites>;

    /// Check store connectivity
    async fn ping(&self) -> Result<()>;

    /// Backend name for logs and readiness output
    fn backend(&self) -> &'static str;
}

/// Trim a favorite item, rejecting blank input
pub fn favorite_item(raw: &str) -> Result<&str> {
    let item = raw.trim();
    if item.is_empty() {
        return Err(AppError::validation("item", "Please enter a name."));
    }
    Ok(item)
}

/// Create a favorites store based on configuration
pub async fn create_favorites_store(config: &FavoritesConfig) -> Result<Arc<dyn FavoritesStore>> {
    match config.backend.as_str() {
        "mongodb" => Ok(Arc::new(MongoFavoritesStore::connect(config).await?)),
        "redis" => Ok(Arc::new(RedisFavoritesStore::connect(config).await?)),
        "memory" => Ok(Arc::new(InMemoryFavoritesStore::new())),
        other => Err(AppError::Configuration {
            message: format!("Unknown favorites backend '{}'", other),
        }),
    }
}
