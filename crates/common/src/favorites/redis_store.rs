//! Redis-backed favorites documents
//!
//! A session document is a marker key created with `SET NX` plus one sorted
//! set per category. Adds run as one script: an item already present is left
//! alone, otherwise it is scored with the session's next sequence number, so
//! reads come back in the order items were favorited. Reads and document
//! creation run inside `MULTI`/`EXEC`.

use super::{FavoriteCategory, Favorites, FavoritesStore};
use crate::config::FavoritesConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, Script};
use tracing::{debug, info};

/// KEYS: document, category set, sequence. ARGV: created-at, item.
const ADD_SCRIPT: &str = r#"
redis.call('SET', KEYS[1], ARGV[1], 'NX')
if redis.call('ZSCORE', KEYS[2], ARGV[2]) then
    return 0
end
local position = redis.call('INCR', KEYS[3])
redis.call('ZADD', KEYS[2], position, ARGV[2])
return 1
"#;

pub struct RedisFavoritesStore {
    connection: ConnectionManager,
    keys: FavoriteKeys,
    add_script: Script,
}

impl RedisFavoritesStore {
    /// Connect to Redis using the favorites configuration
    pub async fn connect(config: &FavoritesConfig) -> Result<Self> {
        info!(collection = %config.collection, "Connecting to favorites store...");

        let client = Client::open(config.redis_url.as_str()).map_err(|e| AppError::Favorites {
            message: format!("Failed to create Redis client: {}", e),
        })?;

        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| AppError::Favorites {
                message: format!("Failed to connect to Redis: {}", e),
            })?;

        info!("Favorites store connection established");

        Ok(Self {
            connection,
            keys: FavoriteKeys::new(&config.database, &config.collection),
            add_script: Script::new(ADD_SCRIPT),
        })
    }

    fn read_pipeline(&self, session_id: &str) -> redis::Pipeline {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for category in FavoriteCategory::ALL {
            pipe.cmd("ZRANGE")
                .arg(self.keys.category(session_id, category))
                .arg(0)
                .arg(-1);
        }
        pipe
    }
}

#[async_trait]
impl FavoritesStore for RedisFavoritesStore {
    async fn ensure(&self, session_id: &str) -> Result<Favorites> {
        let mut pipe = self.read_pipeline(session_id);
        // SET NX is the insert-if-absent; the reads run in the same EXEC
        pipe.cmd("SET")
            .arg(self.keys.document(session_id))
            .arg(chrono::Utc::now().to_rfc3339())
            .arg("NX")
            .ignore();

        let mut conn = self.connection.clone();
        let (professors, universities, topics): (Vec<String>, Vec<String>, Vec<String>) =
            pipe.query_async(&mut conn).await?;

        Ok(Favorites {
            professors,
            universities,
            topics,
        })
    }

    async fn add(&self, session_id: &str, category: FavoriteCategory, item: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let added: i64 = self
            .add_script
            .key(self.keys.document(session_id))
            .key(self.keys.category(session_id, category))
            .key(self.keys.sequence(session_id))
            .arg(chrono::Utc::now().to_rfc3339())
            .arg(item)
            .invoke_async(&mut conn)
            .await?;

        debug!(session_id, category = %category, added, "Favorite added");
        Ok(())
    }

    async fn remove(&self, session_id: &str, category: FavoriteCategory, item: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let removed: i64 = conn
            .zrem(self.keys.category(session_id, category), item)
            .await?;

        debug!(session_id, category = %category, removed, "Favorite removed");
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Favorites> {
        let mut conn = self.connection.clone();
        let (professors, universities, topics): (Vec<String>, Vec<String>, Vec<String>) =
            self.read_pipeline(session_id).query_async(&mut conn).await?;

        Ok(Favorites {
            professors,
            universities,
            topics,
        })
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| AppError::Favorites {
                message: format!("Redis ping failed: {}", e),
            })?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// Key layout for favorites documents
#[derive(Debug, Clone)]
pub struct FavoriteKeys {
    namespace: String,
}

impl FavoriteKeys {
    pub fn new(prefix: &str, collection: &str) -> Self {
        Self {
            namespace: format!("{}:{}", prefix, collection),
        }
    }

    /// Marker key whose existence is the document
    pub fn document(&self, session_id: &str) -> String {
        format!("{}:{}", self.namespace, session_id)
    }

    /// Counter ordering the session's adds
    pub fn sequence(&self, session_id: &str) -> String {
        format!("{}:{}:seq", self.namespace, session_id)
    }

    /// Sorted set holding one category's items
    pub fn category(&self, session_id: &str, category: FavoriteCategory) -> String {
        format!("{}:{}:{}", self.namespace, session_id, category.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = FavoriteKeys::new("academicworld", "favorites");
        assert_eq!(keys.document("abc"), "academicworld:favorites:abc");
        assert_eq!(
            keys.category("abc", FavoriteCategory::Topics),
            "academicworld:favorites:abc:topics"
        );
    }

    #[test]
    fn test_category_keys_are_distinct_per_session() {
        let keys = FavoriteKeys::new("academicworld", "favorites");
        let mut all: Vec<String> = ["s1", "s2"]
            .iter()
            .flat_map(|s| FavoriteCategory::ALL.map(|c| keys.category(s, c)))
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn test_sequence_key_is_separate_from_categories() {
        let keys = FavoriteKeys::new("academicworld", "favorites");
        let sequence = keys.sequence("abc");
        assert_eq!(sequence, "academicworld:favorites:abc:seq");
        for category in FavoriteCategory::ALL {
            assert_ne!(keys.category("abc", category), sequence);
        }
    }

    /// Needs a running server: `ACADEMICWORLD_TEST_REDIS_URL=redis://localhost:6379`
    async fn live_store() -> Option<RedisFavoritesStore> {
        let url = std::env::var("ACADEMICWORLD_TEST_REDIS_URL").ok()?;
        let config = FavoritesConfig {
            backend: "redis".to_string(),
            redis_url: url,
            database: "academicworld_test".to_string(),
            ..FavoritesConfig::default()
        };
        Some(RedisFavoritesStore::connect(&config).await.unwrap())
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_concurrent_ensure_creates_one_document() {
        let Some(store) = live_store().await else { return };
        let store = std::sync::Arc::new(store);
        let session = uuid::Uuid::new_v4().to_string();

        let (a, b) = tokio::join!(
            tokio::spawn({
                let (store, session) = (store.clone(), session.clone());
                async move { store.ensure(&session).await }
            }),
            tokio::spawn({
                let (store, session) = (store.clone(), session.clone());
                async move { store.ensure(&session).await }
            }),
        );
        assert!(a.unwrap().unwrap().is_empty());
        assert!(b.unwrap().unwrap().is_empty());

        let mut conn = store.connection.clone();
        let exists: i64 = conn.exists(store.keys.document(&session)).await.unwrap();
        assert_eq!(exists, 1);
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_adds_keep_arrival_order_without_duplicates() {
        let Some(store) = live_store().await else { return };
        let session = uuid::Uuid::new_v4().to_string();

        for item in ["zeta", "alpha", "zeta", "mu"] {
            store.add(&session, FavoriteCategory::Topics, item).await.unwrap();
        }
        store.remove(&session, FavoriteCategory::Topics, "absent").await.unwrap();

        let favorites = store.get(&session).await.unwrap();
        assert_eq!(favorites.topics, vec!["zeta", "alpha", "mu"]);
    }
}
