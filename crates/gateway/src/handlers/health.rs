//! Health check handlers

use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use academicworld_common::errors::Result;
use serde::Serialize;
use std::future::Future;
use std::time::Instant;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub relational: CheckResult,
    pub graph: CheckResult,
    pub favorites: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    fn is_up(&self) -> bool {
        self.status == "up"
    }
}

async fn check<F>(ping: F) -> CheckResult
where
    F: Future<Output = Result<()>>,
{
    let start = Instant::now();
    match ping.await {
        Ok(()) => CheckResult {
            status: "up".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => CheckResult {
            status: "down".to_string(),
            latency_ms: None,
            error: Some(e.to_string()),
        },
    }
}

/// Liveness check - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: academicworld_common::VERSION,
    })
}

/// Readiness check - pings all three stores
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (relational, graph, favorites) = tokio::join!(
        check(state.db.ping()),
        check(state.graph.ping()),
        check(state.favorites.ping()),
    );

    let all_healthy = relational.is_up() && graph.is_up() && favorites.is_up();
    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadyResponse {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            checks: HealthChecks {
                relational,
                graph,
                favorites,
            },
        }),
    )
}
