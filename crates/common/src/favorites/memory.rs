//! Process-local favorites store

use super::{FavoriteCategory, Favorites, FavoritesStore};
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Favorites kept in memory; one lock serializes writers.
#[derive(Default)]
pub struct InMemoryFavoritesStore {
    documents: RwLock<HashMap<String, Favorites>>,
}

impl InMemoryFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of session documents created so far
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl FavoritesStore for InMemoryFavoritesStore {
    async fn ensure(&self, session_id: &str) -> Result<Favorites> {
        let mut documents = self.documents.write().await;
        Ok(documents.entry(session_id.to_string()).or_default().clone())
    }

    async fn add(&self, session_id: &str, category: FavoriteCategory, item: &str) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents
            .entry(session_id.to_string())
            .or_default()
            .insert(category, item);
        Ok(())
    }

    async fn remove(&self, session_id: &str, category: FavoriteCategory, item: &str) -> Result<()> {
        let mut documents = self.documents.write().await;
        if let Some(favorites) = documents.get_mut(session_id) {
            favorites.remove(category, item);
        }
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Favorites> {
        let documents = self.documents.read().await;
        Ok(documents.get(session_id).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_unknown_session_defaults_to_empty() {
        let store = InMemoryFavoritesStore::new();
        let favorites = store.get("never-seen").await.unwrap();
        assert!(favorites.is_empty());
        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn test_ensure_creates_empty_document_once() {
        let store = InMemoryFavoritesStore::new();
        store.add("s1", FavoriteCategory::Topics, "databases").await.unwrap();

        let favorites = store.ensure("s1").await.unwrap();
        assert_eq!(favorites.topics, vec!["databases".to_string()]);
        assert_eq!(store.document_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_ensure_creates_single_document() {
        let store = Arc::new(InMemoryFavoritesStore::new());

        let (a, b) = tokio::join!(
            tokio::spawn({
                let store = store.clone();
                async move { store.ensure("fresh-session").await }
            }),
            tokio::spawn({
                let store = store.clone();
                async move { store.ensure("fresh-session").await }
            }),
        );

        assert_eq!(a.unwrap().unwrap(), Favorites::default());
        assert_eq!(b.unwrap().unwrap(), Favorites::default());
        assert_eq!(store.document_count().await, 1);
    }

    #[tokio::test]
    async fn test_repeated_add_is_idempotent() {
        let store = InMemoryFavoritesStore::new();
        store.ensure("s1").await.unwrap();
        for _ in 0..3 {
            store
                .add("s1", FavoriteCategory::Universities, "Cornell University")
                .await
                .unwrap();
        }

        let favorites = store.get("s1").await.unwrap();
        assert_eq!(favorites.universities, vec!["Cornell University".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_absent_item_is_noop() {
        let store = InMemoryFavoritesStore::new();
        store.add("s1", FavoriteCategory::Professors, "Jiawei Han").await.unwrap();
        let before = store.get("s1").await.unwrap();

        store.remove("s1", FavoriteCategory::Professors, "Nobody").await.unwrap();
        store.remove("unknown", FavoriteCategory::Topics, "anything").await.unwrap();

        assert_eq!(store.get("s1").await.unwrap(), before);
        assert_eq!(store.document_count().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = InMemoryFavoritesStore::new();
        store.add("a", FavoriteCategory::Topics, "robotics").await.unwrap();

        assert!(store.get("b").await.unwrap().is_empty());
        assert_eq!(store.get("a").await.unwrap().topics, vec!["robotics".to_string()]);
    }
}
