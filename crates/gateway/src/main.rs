//! AcademicWorld API Gateway
//!
//! The JSON entry point for the dashboard.
//! Handles:
//! - Keyword rankings from the relational store
//! - Institute and citation queries against the graph store
//! - Session favorites
//! - Rate limiting
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use academicworld_common::{
    config::{AppConfig, ObservabilityConfig},
    create_favorites_store,
    db::DbPool,
    metrics, FavoritesStore, GraphClient, GraphQueries, GraphRepository,
};
use axum::{
    extract::FromRef,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub graph: Arc<dyn GraphQueries>,
    pub favorites: Arc<dyn FavoritesStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting AcademicWorld API Gateway v{}",
        academicworld_common::VERSION
    );

    // Initialize metrics
    init_metrics(&config.observability)?;
    metrics::register_metrics();

    // Connect the three stores
    let db = DbPool::new(&config.relational).await?;
    db.ensure_indexes().await;

    let graph: Arc<dyn GraphQueries> =
        Arc::new(GraphRepository::new(GraphClient::connect(&config.graph).await?));

    let favorites = create_favorites_store(&config.favorites).await?;
    info!(backend = favorites.backend(), "Favorites store ready");

    let state = AppState {
        config: config.clone(),
        db,
        graph,
        favorites,
    };

    let app = create_router(state);

    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logging {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

fn init_metrics(config: &ObservabilityConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.metrics_port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    PrometheusBuilder::new()
        .set_buckets(metrics::LATENCY_BUCKETS)?
        .with_http_listener(addr)
        .install()?;

    info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let mut api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Relational rankings
        .route("/search", post(handlers::search::search))
        // Graph queries
        .route("/institutes", get(handlers::institutes::list_institutes))
        .route(
            "/institutes/{name}/keywords",
            get(handlers::institutes::top_keywords),
        )
        .route(
            "/keywords/{keyword}/citations",
            get(handlers::citations::citation_trend),
        )
        // Sessions and favorites
        .route("/sessions", post(handlers::sessions::create_session))
        .route(
            "/favorites",
            get(handlers::favorites::get_favorites)
                .post(handlers::favorites::add_favorite)
                .delete(handlers::favorites::remove_favorite),
        )
        .route_layer(from_fn(middleware::metrics::track_requests));

    if state.config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            state.config.rate_limit.requests_per_second,
            state.config.rate_limit.burst,
        );
        api_routes = api_routes.layer(from_fn_with_state(
            limiter,
            middleware::rate_limit::rate_limit_middleware,
        ));
    } else {
        warn!("Rate limiting disabled");
    }

    Router::new()
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
