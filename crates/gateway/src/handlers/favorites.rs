//! Favorites handlers
//!
//! Every operation is scoped to the session named by the `X-Session-ID`
//! header and answers with the session's full favorites snapshot.

use academicworld_common::{
    errors::{AppError, Result},
    favorites::favorite_item,
    metrics, FavoriteCategory, Favorites, FavoritesStore, SessionContext,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

/// Add or remove request
#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub category: Option<String>,
    pub item: Option<String>,
}

impl FavoriteRequest {
    /// Validated category and trimmed item
    fn target(&self) -> Result<(FavoriteCategory, &str)> {
        let category = required("category", self.category.as_deref())?.parse::<FavoriteCategory>()?;
        let item = favorite_item(required("item", self.item.as_deref())?)?;
        Ok((category, item))
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| AppError::MissingField {
        field: field.to_string(),
    })
}

/// Current favorites for the session; unknown sessions read as empty
pub async fn get_favorites(
    State(favorites): State<Arc<dyn FavoritesStore>>,
    session: SessionContext,
) -> Result<Json<Favorites>> {
    let document = favorites.get(&session.session_id).await?;
    metrics::record_favorites_op("get", None);
    Ok(Json(document))
}

/// Add an item; adding one already present changes nothing
pub async fn add_favorite(
    State(favorites): State<Arc<dyn FavoritesStore>>,
    session: SessionContext,
    payload: std::result::Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<Json<Favorites>> {
    let Json(request) = payload?;
    let (category, item) = request.target()?;

    favorites.add(&session.session_id, category, item).await?;
    metrics::record_favorites_op("add", Some(category.as_str()));

    tracing::debug!(
        session_id = %session.session_id,
        category = %category,
        item,
        "Favorite added"
    );

    Ok(Json(favorites.get(&session.session_id).await?))
}

/// Remove an item; removing one that is absent changes nothing
pub async fn remove_favorite(
    State(favorites): State<Arc<dyn FavoritesStore>>,
    session: SessionContext,
    payload: std::result::Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<Json<Favorites>> {
    let Json(request) = payload?;
    let (category, item) = request.target()?;

    favorites.remove(&session.session_id, category, item).await?;
    metrics::record_favorites_op("remove", Some(category.as_str()));

    tracing::debug!(
        session_id = %session.session_id,
        category = %category,
        item,
        "Favorite removed"
    );

    Ok(Json(favorites.get(&session.session_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use academicworld_common::{favorites::InMemoryFavoritesStore, session::SESSION_HEADER};
    use axum::{
        body::{to_bytes, Body},
        http::{self, StatusCode},
        response::Response,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app(store: Arc<InMemoryFavoritesStore>) -> Router {
        Router::new()
            .route(
                "/favorites",
                get(get_favorites).post(add_favorite).delete(remove_favorite),
            )
            .with_state(store as Arc<dyn FavoritesStore>)
    }

    fn request(method: &str, session: Option<&str>, body: Option<serde_json::Value>) -> http::Request<Body> {
        let mut builder = http::Request::builder().method(method).uri("/favorites");
        if let Some(session) = session {
            builder = builder.header(SESSION_HEADER, session);
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_session_reads_empty() {
        let response = app(Arc::new(InMemoryFavoritesStore::new()))
            .oneshot(request("GET", Some("fresh"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "professors": [], "universities": [], "topics": [] })
        );
    }

    #[tokio::test]
    async fn test_missing_session_header_is_400() {
        let response = app(Arc::new(InMemoryFavoritesStore::new()))
            .oneshot(request("GET", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_twice_equals_add_once() {
        let app = app(Arc::new(InMemoryFavoritesStore::new()));
        let payload = serde_json::json!({ "category": "professors", "item": "Jiawei Han" });

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request("POST", Some("s1"), Some(payload.clone())))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let body = json_body(
            app.oneshot(request("GET", Some("s1"), None)).await.unwrap(),
        )
        .await;
        assert_eq!(body["professors"], serde_json::json!(["Jiawei Han"]));
    }

    #[tokio::test]
    async fn test_remove_returns_snapshot_and_tolerates_absent_items() {
        let store = Arc::new(InMemoryFavoritesStore::new());
        store
            .add("s1", FavoriteCategory::Universities, "Cornell University")
            .await
            .unwrap();
        let app = app(store);

        let absent = serde_json::json!({ "category": "universities", "item": "MIT" });
        let response = app
            .clone()
            .oneshot(request("DELETE", Some("s1"), Some(absent)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["universities"],
            serde_json::json!(["Cornell University"])
        );

        let present = serde_json::json!({ "category": "universities", "item": "Cornell University" });
        let body = json_body(
            app.oneshot(request("DELETE", Some("s1"), Some(present)))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["universities"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_category_is_400() {
        let payload = serde_json::json!({ "category": "keywords", "item": "ai" });
        let response = app(Arc::new(InMemoryFavoritesStore::new()))
            .oneshot(request("POST", Some("s1"), Some(payload)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["field"], "category");
    }

    #[tokio::test]
    async fn test_missing_item_is_400_with_error_body() {
        let store = Arc::new(InMemoryFavoritesStore::new());
        let payload = serde_json::json!({ "category": "topics" });
        let response = app(store.clone())
            .oneshot(request("POST", Some("s1"), Some(payload)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "MISSING_FIELD");
        assert_eq!(body["error"]["field"], "item");
        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_category_on_remove_is_400() {
        let payload = serde_json::json!({ "item": "MIT" });
        let response = app(Arc::new(InMemoryFavoritesStore::new()))
            .oneshot(request("DELETE", Some("s1"), Some(payload)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["field"], "category");
    }

    #[tokio::test]
    async fn test_blank_item_is_400() {
        let store = Arc::new(InMemoryFavoritesStore::new());
        let payload = serde_json::json!({ "category": "topics", "item": "  " });
        let response = app(store.clone())
            .oneshot(request("POST", Some("s1"), Some(payload)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.document_count().await, 0);
    }
}
