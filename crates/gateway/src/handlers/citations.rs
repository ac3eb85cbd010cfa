//! Citation trend handlers

use super::ListResponse;
use academicworld_common::{
    errors::Result,
    graph::{CitationPoint, GraphQueries},
    metrics, Keyword,
};
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

/// Yearly citation totals for publications labeled with a keyword
pub async fn citation_trend(
    State(graph): State<Arc<dyn GraphQueries>>,
    Path(raw): Path<String>,
) -> Result<Json<ListResponse<CitationPoint>>> {
    let keyword = Keyword::parse(&raw)?;

    let start = Instant::now();
    let result = graph.citation_trend_by_keyword(&keyword).await;
    metrics::record_graph_query(
        "citation_trend_by_keyword",
        start.elapsed().as_secs_f64(),
        result.as_ref().ok().map(Vec::len),
    );

    let points = result?;
    tracing::info!(keyword = %keyword, years = points.len(), "Citation trend served");

    Ok(Json(ListResponse::new(points)))
}
