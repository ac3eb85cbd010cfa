//! MongoDB-backed favorites documents
//!
//! One document per session in the favorites collection:
//! `{ session_id, professors: [], universities: [], topics: [] }`.
//! Creation is an upserting `findOneAndUpdate` with `$setOnInsert`; adds and
//! removes are single-document `$addToSet` / `$pull` updates, so the server
//! enforces set semantics. A unique index on `session_id` keeps concurrent
//! first access from creating two documents.

use super::{FavoriteCategory, Favorites, FavoritesStore};
use crate::config::FavoritesConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use mongodb::{
    bson::{doc, Bson, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Server error code for a unique index violation
const DUPLICATE_KEY: i32 = 11000;

/// Stored shape of a session's favorites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritesDocument {
    pub session_id: String,
    #[serde(default)]
    pub professors: Vec<String>,
    #[serde(default)]
    pub universities: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl From<FavoritesDocument> for Favorites {
    fn from(document: FavoritesDocument) -> Self {
        Favorites {
            professors: document.professors,
            universities: document.universities,
            topics: document.topics,
        }
    }
}

pub struct MongoFavoritesStore {
    database: Database,
    collection: Collection<FavoritesDocument>,
}

impl MongoFavoritesStore {
    /// Connect to MongoDB and prepare the session index
    pub async fn connect(config: &FavoritesConfig) -> Result<Self> {
        info!(
            database = %config.database,
            collection = %config.collection,
            "Connecting to favorites store..."
        );

        let client = Client::with_uri_str(&config.mongo_url)
            .await
            .map_err(|e| AppError::Favorites {
                message: format!("Failed to create MongoDB client: {}", e),
            })?;

        let database = client.database(&config.database);
        let collection = database.collection::<FavoritesDocument>(&config.collection);

        let store = Self {
            database,
            collection,
        };
        store.ensure_session_index().await?;

        info!("Favorites store connection established");
        Ok(store)
    }

    async fn ensure_session_index(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "session_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index).await?;
        Ok(())
    }

    async fn upsert_session(
        &self,
        session_id: &str,
    ) -> mongodb::error::Result<Option<FavoritesDocument>> {
        self.collection
            .find_one_and_update(session_filter(session_id), create_if_absent())
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
    }
}

#[async_trait]
impl FavoritesStore for MongoFavoritesStore {
    async fn ensure(&self, session_id: &str) -> Result<Favorites> {
        let document = match self.upsert_session(session_id).await {
            Ok(document) => document,
            // Lost the insert race; the other upsert's document exists now
            Err(e) if is_duplicate_key(&e) => {
                self.collection.find_one(session_filter(session_id)).await?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(document.map(Favorites::from).unwrap_or_default())
    }

    async fn add(&self, session_id: &str, category: FavoriteCategory, item: &str) -> Result<()> {
        let update = add_to_set(category, item);
        let added = self
            .collection
            .update_one(session_filter(session_id), update.clone())
            .upsert(true)
            .await;

        match added {
            Ok(_) => {}
            Err(e) if is_duplicate_key(&e) => {
                self.collection
                    .update_one(session_filter(session_id), update)
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }

        debug!(session_id, category = %category, "Favorite added");
        Ok(())
    }

    async fn remove(&self, session_id: &str, category: FavoriteCategory, item: &str) -> Result<()> {
        let result = self
            .collection
            .update_one(session_filter(session_id), pull(category, item))
            .await?;

        debug!(
            session_id,
            category = %category,
            modified = result.modified_count,
            "Favorite removed"
        );
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Favorites> {
        let document = self.collection.find_one(session_filter(session_id)).await?;
        Ok(document.map(Favorites::from).unwrap_or_default())
    }

    async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::Favorites {
                message: format!("MongoDB ping failed: {}", e),
            })?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

fn session_filter(session_id: &str) -> Document {
    doc! { "session_id": session_id }
}

fn empty_categories() -> Document {
    FavoriteCategory::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), Bson::Array(Vec::new())))
        .collect()
}

fn create_if_absent() -> Document {
    doc! { "$setOnInsert": empty_categories() }
}

fn add_to_set(category: FavoriteCategory, item: &str) -> Document {
    let mut field = Document::new();
    field.insert(category.as_str(), item);
    doc! { "$addToSet": field }
}

fn pull(category: FavoriteCategory, item: &str) -> Document {
    let mut field = Document::new();
    field.insert(category.as_str(), item);
    doc! { "$pull": field }
}

/// Unique index violation, raised when two upserts race for a new session
fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY,
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY,
        _ => false,
    }
}
