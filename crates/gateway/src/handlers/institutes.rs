//! Institute handlers backed by the graph store

use super::ListResponse;
use academicworld_common::{
    errors::Result,
    graph::{institute_name, GraphQueries, KeywordCount},
    metrics,
};
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

/// All institutes, alphabetical
pub async fn list_institutes(
    State(graph): State<Arc<dyn GraphQueries>>,
) -> Result<Json<ListResponse<String>>> {
    let start = Instant::now();
    let result = graph.list_institutes().await;
    metrics::record_graph_query(
        "list_institutes",
        start.elapsed().as_secs_f64(),
        result.as_ref().ok().map(Vec::len),
    );

    Ok(Json(ListResponse::new(result?)))
}

/// Most common interest keywords among an institute's faculty
pub async fn top_keywords(
    State(graph): State<Arc<dyn GraphQueries>>,
    Path(name): Path<String>,
) -> Result<Json<ListResponse<KeywordCount>>> {
    let institute = institute_name(&name)?;

    let start = Instant::now();
    let result = graph.top_keywords_by_institute(institute).await;
    metrics::record_graph_query(
        "top_keywords_by_institute",
        start.elapsed().as_secs_f64(),
        result.as_ref().ok().map(Vec::len),
    );

    let counts = result?;
    tracing::info!(institute, keywords = counts.len(), "Institute keywords served");

    Ok(Json(ListResponse::new(counts)))
}
