//! Repository for keyword ranking queries
//!
//! All three rankings for a keyword are read inside one read-only
//! REPEATABLE READ transaction so they describe the same snapshot.

use crate::db::models::{
    faculty, faculty_keyword, publication_keyword, FacultyColumn, FacultyKeywordColumn,
    FacultyKeywordEntity, KeywordColumn, KeywordEntity, PublicationColumn,
    PublicationKeywordColumn, PublicationKeywordEntity, UniversityColumn,
};
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::keyword::Keyword;
use sea_orm::{
    sea_query::Expr, AccessMode, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, IsolationLevel, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Rows returned per ranking
pub const RANKING_LIMIT: u64 = 5;

/// A university or professor with its summed keyword score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromQueryResult)]
pub struct RankedEntity {
    pub name: String,
    pub score: f64,
}

/// A publication with its keyword relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromQueryResult)]
pub struct RankedPublication {
    pub title: String,
    pub score: f64,
}

/// The three rankings for one keyword, read from a single snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRankings {
    pub keyword: Keyword,
    pub universities: Vec<RankedEntity>,
    pub professors: Vec<RankedEntity>,
    pub publications: Vec<RankedPublication>,
}

/// Repository for relational data access
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    /// Check whether a keyword is part of the vocabulary
    pub async fn keyword_exists(&self, keyword: &Keyword) -> Result<bool> {
        let found = KeywordEntity::find()
            .filter(KeywordColumn::Name.eq(keyword.as_str()))
            .one(self.conn())
            .await?;

        Ok(found.is_some())
    }

    /// Run the university, professor, and publication rankings for a keyword.
    ///
    /// The keyword is normalized first. An unknown keyword fails with
    /// [`AppError::KeywordNotFound`] before any ranking query is issued.
    pub async fn run_all_keyword_queries(&self, raw: &str) -> Result<KeywordRankings> {
        let keyword = Keyword::parse(raw)?;

        if !self.keyword_exists(&keyword).await? {
            debug!(keyword = %keyword, "Keyword not in vocabulary");
            return Err(AppError::KeywordNotFound {
                keyword: keyword.to_string(),
            });
        }

        let txn = self
            .conn()
            .begin_with_config(Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
            .await
            .map_err(|e| AppError::TransactionFailed {
                message: e.to_string(),
            })?;

        let ranked = Self::rank_within(&txn, &keyword).await;

        match ranked {
            Ok((universities, professors, publications)) => {
                txn.commit().await.map_err(|e| AppError::TransactionFailed {
                    message: e.to_string(),
                })?;

                debug!(
                    keyword = %keyword,
                    universities = universities.len(),
                    professors = professors.len(),
                    publications = publications.len(),
                    "Keyword rankings loaded"
                );

                Ok(KeywordRankings {
                    keyword,
                    universities,
                    professors,
                    publications,
                })
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(AppError::TransactionFailed {
                    message: e.to_string(),
                })
            }
        }
    }

    async fn rank_within<C: ConnectionTrait>(
        conn: &C,
        keyword: &Keyword,
    ) -> std::result::Result<(Vec<RankedEntity>, Vec<RankedEntity>, Vec<RankedPublication>), DbErr>
    {
        let universities = Self::top_universities(conn, keyword).await?;
        let professors = Self::top_professors(conn, keyword).await?;
        let publications = Self::top_publications(conn, keyword).await?;
        Ok((universities, professors, publications))
    }

    async fn top_universities<C: ConnectionTrait>(
        conn: &C,
        keyword: &Keyword,
    ) -> std::result::Result<Vec<RankedEntity>, DbErr> {
        let total = Expr::col((FacultyKeywordEntity, FacultyKeywordColumn::Score)).sum();

        FacultyKeywordEntity::find()
            .select_only()
            .column_as(UniversityColumn::Name, "name")
            .column_as(total.clone(), "score")
            .join(JoinType::InnerJoin, faculty_keyword::Relation::Faculty.def())
            .join(JoinType::InnerJoin, faculty::Relation::University.def())
            .join(JoinType::InnerJoin, faculty_keyword::Relation::Keyword.def())
            .filter(KeywordColumn::Name.eq(keyword.as_str()))
            .group_by(UniversityColumn::Id)
            .order_by_desc(total)
            .order_by_asc(UniversityColumn::Name)
            .limit(RANKING_LIMIT)
            .into_model::<RankedEntity>()
            .all(conn)
            .await
    }

    async fn top_professors<C: ConnectionTrait>(
        conn: &C,
        keyword: &Keyword,
    ) -> std::result::Result<Vec<RankedEntity>, DbErr> {
        let total = Expr::col((FacultyKeywordEntity, FacultyKeywordColumn::Score)).sum();

        FacultyKeywordEntity::find()
            .select_only()
            .column_as(FacultyColumn::Name, "name")
            .column_as(total.clone(), "score")
            .join(JoinType::InnerJoin, faculty_keyword::Relation::Faculty.def())
            .join(JoinType::InnerJoin, faculty_keyword::Relation::Keyword.def())
            .filter(KeywordColumn::Name.eq(keyword.as_str()))
            .group_by(FacultyColumn::Id)
            .order_by_desc(total)
            .order_by_asc(FacultyColumn::Name)
            .limit(RANKING_LIMIT)
            .into_model::<RankedEntity>()
            .all(conn)
            .await
    }

    async fn top_publications<C: ConnectionTrait>(
        conn: &C,
        keyword: &Keyword,
    ) -> std::result::Result<Vec<RankedPublication>, DbErr> {
        // One row per publication-keyword pair, no aggregation
        PublicationKeywordEntity::find()
            .select_only()
            .column_as(PublicationColumn::Title, "title")
            .column_as(PublicationKeywordColumn::Score, "score")
            .join(JoinType::InnerJoin, publication_keyword::Relation::Publication.def())
            .join(JoinType::InnerJoin, publication_keyword::Relation::Keyword.def())
            .filter(KeywordColumn::Name.eq(keyword.as_str()))
            .order_by_desc(PublicationKeywordColumn::Score)
            .order_by_asc(PublicationColumn::Title)
            .limit(RANKING_LIMIT)
            .into_model::<RankedPublication>()
            .all(conn)
            .await
    }
}
