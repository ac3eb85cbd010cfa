//! Configuration management for AcademicWorld services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Legacy environment variables (SQL_DB_HOST, NEO4J_DB_USER, ...)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Relational store (MySQL) configuration
    #[serde(default)]
    pub relational: RelationalConfig,

    /// Graph store (Neo4j) configuration
    #[serde(default)]
    pub graph: GraphConfig,

    /// Favorites document store configuration
    #[serde(default)]
    pub favorites: FavoritesConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelationalConfig {
    #[serde(default = "default_sql_host")]
    pub host: String,

    #[serde(default = "default_sql_port")]
    pub port: u16,

    #[serde(default = "default_sql_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_database")]
    pub database: String,

    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of pooled connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Pool acquire timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphConfig {
    /// Bolt endpoint
    #[serde(default = "default_graph_uri")]
    pub uri: String,

    #[serde(default = "default_graph_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_graph_max_connections")]
    pub max_connections: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FavoritesConfig {
    /// Store backend: mongodb, redis, memory
    #[serde(default = "default_favorites_backend")]
    pub backend: String,

    /// MongoDB connection string
    #[serde(default = "default_mongo_url")]
    pub mongo_url: String,

    /// Redis URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Database name (MongoDB database, Redis key prefix)
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection holding one document per session
    #[serde(default = "default_collection")]
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name reported in logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second (global)
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_sql_host() -> String { "localhost".to_string() }
fn default_sql_port() -> u16 { 3306 }
fn default_sql_user() -> String { "root".to_string() }
fn default_database() -> String { "academicworld".to_string() }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_graph_uri() -> String { "bolt://localhost:7687".to_string() }
fn default_graph_user() -> String { "neo4j".to_string() }
fn default_graph_max_connections() -> usize { 16 }
fn default_favorites_backend() -> String { "mongodb".to_string() }
fn default_mongo_url() -> String { "mongodb://localhost:27017".to_string() }
fn default_redis_url() -> String { "redis://localhost:6379".to_string() }
fn default_collection() -> String { "favorites".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "academicworld".to_string() }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

/// Legacy variable names mapped onto their configuration keys
const LEGACY_ENV: &[(&str, &str)] = &[
    ("SQL_DB_HOST", "relational.host"),
    ("SQL_DB_USER", "relational.user"),
    ("SQL_DB_PASSWORD", "relational.password"),
    ("DB_NAME", "relational.database"),
    ("NEO4J_DB_USER", "graph.user"),
    ("NEO4J_DB_PASSWORD", "graph.password"),
];

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., APP__RELATIONAL__HOST=db.internal
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in LEGACY_ENV {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        builder.build()?.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl RelationalConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            host: default_sql_host(),
            port: default_sql_port(),
            user: default_sql_user(),
            password: String::new(),
            database: default_database(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_graph_uri(),
            user: default_graph_user(),
            password: String::new(),
            database: default_database(),
            max_connections: default_graph_max_connections(),
        }
    }
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            backend: default_favorites_backend(),
            mongo_url: default_mongo_url(),
            redis_url: default_redis_url(),
            database: default_database(),
            collection: default_collection(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_enabled(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            relational: RelationalConfig::default(),
            graph: GraphConfig::default(),
            favorites: FavoritesConfig::default(),
            observability: ObservabilityConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.relational.database, "academicworld");
        assert_eq!(config.relational.user, "root");
        assert_eq!(config.graph.uri, "bolt://localhost:7687");
        assert_eq!(config.favorites.collection, "favorites");
        assert_eq!(config.favorites.database, "academicworld");
        assert_eq!(config.favorites.mongo_url, "mongodb://localhost:27017");
    }

    #[test]
    fn test_empty_sources_fall_back_to_defaults() {
        let config: AppConfig = Config::builder()
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap();
        assert_eq!(config.relational.port, 3306);
        assert_eq!(config.favorites.backend, "mongodb");
        assert!(config.rate_limit.enabled);
    }

    #[test]
    fn test_partial_section_keeps_field_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("relational.host", "db.internal")
            .unwrap()
            .set_override("graph.password", "secret")
            .unwrap()
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap();
        assert_eq!(config.relational.host, "db.internal");
        assert_eq!(config.relational.user, "root");
        assert_eq!(config.graph.password, "secret");
        assert_eq!(config.graph.user, "neo4j");
    }

    #[test]
    fn test_timeouts() {
        let config = RelationalConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.idle_timeout(), Duration::from_secs(300));
    }
}
