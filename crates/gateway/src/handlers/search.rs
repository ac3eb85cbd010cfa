//! Keyword ranking handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use std::time::Instant;
use validator::Validate;

use academicworld_common::{
    db::{DbPool, KeywordRankings, Repository},
    errors::{AppError, Result},
    metrics, Keyword,
};

/// Search request
#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(max = 255))]
    pub keyword: Option<String>,
}

fn outcome(result: &Result<KeywordRankings>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(AppError::KeywordNotFound { .. }) => "not_found",
        Err(e) if e.is_client_error() => "invalid",
        Err(_) => "error",
    }
}

/// Rank universities, professors, and publications for a keyword
pub async fn search(
    State(db): State<DbPool>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<KeywordRankings>> {
    let start = Instant::now();

    let Json(request) = payload?;
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("keyword".to_string()),
    })?;
    let keyword = Keyword::parse_opt(request.keyword.as_deref())?;

    let repo = Repository::new(db);
    let result = repo.run_all_keyword_queries(keyword.as_str()).await;

    let elapsed = start.elapsed();
    metrics::record_keyword_search(elapsed.as_secs_f64(), outcome(&result));

    let rankings = result?;

    tracing::info!(
        keyword = %rankings.keyword,
        universities = rankings.universities.len(),
        professors = rankings.professors.len(),
        publications = rankings.publications.len(),
        latency_ms = elapsed.as_millis() as u64,
        "Keyword search completed"
    );

    Ok(Json(rankings))
}
