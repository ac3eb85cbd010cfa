//! Relational store layer for AcademicWorld
//!
//! Provides:
//! - SeaORM entity models for the `academicworld` schema
//! - Repository with the keyword ranking transaction
//! - Connection pool management
//! - Idempotent startup index preparation

pub mod models;
mod repository;

pub use repository::{KeywordRankings, RankedEntity, RankedPublication, Repository, RANKING_LIMIT};

use crate::config::RelationalConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, RuntimeErr, SqlxMySqlConnector};
use sqlx::mysql::{MySqlConnectOptions, MySqlDatabaseError, MySqlPoolOptions};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// MySQL `ER_DUP_KEYNAME`: the index already exists
const ER_DUP_KEYNAME: u16 = 1061;

/// Secondary indexes backing the keyword ranking queries
pub const RANKING_INDEXES: &[(&str, &str)] = &[
    ("idx_keyword_name", "keyword(name)"),
    ("idx_faculty_keyword_keywordid", "faculty_keyword(keyword_id)"),
    ("idx_faculty_keyword_facultyid", "faculty_keyword(faculty_id)"),
    ("idx_faculty_universityid", "faculty(university_id)"),
    ("idx_publication_keyword_keywordid", "Publication_Keyword(keyword_id)"),
    ("idx_publication_keyword_pubid", "Publication_Keyword(publication_id)"),
];

/// Outcome of [`DbPool::ensure_indexes`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

/// Relational connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    conn: Arc<DatabaseConnection>,
}

impl DbPool {
    /// Create a new pool from configuration
    pub async fn new(config: &RelationalConfig) -> Result<Self> {
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Connecting to relational store..."
        );

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(config.idle_timeout())
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect to {}: {}", config.host, e),
            })?;

        info!("Relational store connection established");

        Ok(Self::from_connection(
            SqlxMySqlConnector::from_sqlx_mysql_pool(pool),
        ))
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self {
            conn: Arc::new(conn),
        }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;
        Ok(())
    }

    /// Create the ranking indexes if they are missing.
    ///
    /// Safe to run on every start: an index that already exists is counted
    /// and skipped, any other failure is logged and does not abort startup.
    pub async fn ensure_indexes(&self) -> IndexReport {
        let mut report = IndexReport::default();

        for (name, target) in RANKING_INDEXES {
            let sql = format!("CREATE INDEX {} ON {}", name, target);
            match self.conn.execute_unprepared(&sql).await {
                Ok(_) => {
                    debug!(index = name, "Index created");
                    report.created += 1;
                }
                Err(e) if is_duplicate_index(&e) => {
                    debug!(index = name, "Index already exists");
                    report.existing += 1;
                }
                Err(e) => {
                    warn!(index = name, error = %e, "Failed to create index");
                    report.failed += 1;
                }
            }
        }

        info!(
            created = report.created,
            existing = report.existing,
            failed = report.failed,
            "Ranking indexes prepared"
        );

        report
    }
}

fn is_duplicate_index(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) => db_err
            .try_downcast_ref::<MySqlDatabaseError>()
            .map(|e| e.number() == ER_DUP_KEYNAME)
            .unwrap_or(false),
        other => other.to_string().contains("Duplicate key name"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }
    }

    #[tokio::test]
    async fn test_ensure_indexes_swallows_existing() {
        let conn = MockDatabase::new(DatabaseBackend::MySql)
            .append_exec_errors([DbErr::Custom(
                "Duplicate key name 'idx_keyword_name'".to_string(),
            )])
            .append_exec_results([ok(), ok(), ok(), ok()])
            .append_exec_errors([DbErr::Custom("table 'Publication_Keyword' is locked".to_string())])
            .into_connection();

        let report = DbPool::from_connection(conn).ensure_indexes().await;

        assert_eq!(
            report,
            IndexReport {
                created: 4,
                existing: 1,
                failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_ensure_indexes_is_repeatable() {
        let conn = MockDatabase::new(DatabaseBackend::MySql)
            .append_exec_errors(RANKING_INDEXES.iter().map(|(name, _)| {
                DbErr::Custom(format!("Duplicate key name '{}'", name))
            }))
            .into_connection();

        let report = DbPool::from_connection(conn).ensure_indexes().await;

        assert_eq!(report.existing, RANKING_INDEXES.len());
        assert_eq!(report.created + report.failed, 0);
    }

    #[test]
    fn test_duplicate_index_detection() {
        assert!(is_duplicate_index(&DbErr::Custom(
            "Duplicate key name 'idx_faculty_universityid'".into()
        )));
        assert!(!is_duplicate_index(&DbErr::Custom("Access denied".into())));
    }
}
