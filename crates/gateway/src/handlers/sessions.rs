//! Session management handlers

use academicworld_common::{
    errors::Result, metrics, Favorites, FavoritesStore, SessionContext,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

/// Create session response
#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub favorites: Favorites,
}

/// Mint a session id and create its empty favorites document
pub async fn create_session(
    State(favorites): State<Arc<dyn FavoritesStore>>,
) -> Result<(StatusCode, Json<CreateSessionResponse>)> {
    let session = SessionContext::generate();
    let document = favorites.ensure(&session.session_id).await?;
    metrics::record_favorites_op("ensure", None);

    tracing::info!(session_id = %session.session_id, "Session created");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.session_id,
            favorites: document,
        }),
    ))
}
