//! Graph store (Neo4j) access
//!
//! Three independent read-only traversals over the academic graph:
//! institutes, the interest keywords of an institute's faculty, and the
//! yearly citation totals of publications labeled with a keyword.
//!
//! Each query borrows a pooled Bolt connection that goes back to the pool
//! when its row stream is dropped, so every exit path releases it.

use crate::config::GraphConfig;
use crate::errors::{AppError, Result};
use crate::keyword::Keyword;
use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Keywords returned per institute
pub const TOP_KEYWORDS_LIMIT: i64 = 10;

const LIST_INSTITUTES: &str = "MATCH (i:INSTITUTE) RETURN i.name AS name ORDER BY name";

const TOP_KEYWORDS_BY_INSTITUTE: &str =
    "MATCH (f:FACULTY)-[:AFFILIATION_WITH]->(i:INSTITUTE {name: $institute}),
           (f)-[:INTERESTED_IN]->(k:KEYWORD)
     RETURN k.name AS keyword, count(*) AS count
     ORDER BY count DESC, keyword ASC
     LIMIT $limit";

const CITATION_TREND_BY_KEYWORD: &str =
    "MATCH (p:PUBLICATION)-[:LABEL_BY]->(k:KEYWORD)
     WHERE toLower(k.name) = toLower($keyword) AND p.year IS NOT NULL
     RETURN p.year AS year, toInteger(sum(coalesce(p.numCitations, 0))) AS totalCitations
     ORDER BY year ASC";

/// Keyword frequency among an institute's faculty interests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: i64,
}

/// Citation total for one publication year.
///
/// `total_citations` is a whole number; a float stored in the graph is
/// rounded rather than failing the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationPoint {
    pub year: i64,
    pub total_citations: i64,
}

/// Connected graph driver
#[derive(Clone)]
pub struct GraphClient {
    pub graph: Graph,
}

impl GraphClient {
    /// Connect to the graph store from configuration
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        info!(uri = %config.uri, database = %config.database, "Connecting to graph store...");

        let neo_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .build()?;

        let graph = Graph::connect(neo_config).await?;

        info!("Graph store connection established");
        Ok(Self { graph })
    }

    /// Check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.graph.run(query("RETURN 1")).await?;
        Ok(())
    }
}

/// Read-side graph operations served by the gateway
#[async_trait]
pub trait GraphQueries: Send + Sync {
    /// Check connectivity
    async fn ping(&self) -> Result<()>;

    /// All institute names, alphabetical
    async fn list_institutes(&self) -> Result<Vec<String>>;

    /// Top interest keywords among an institute's faculty
    async fn top_keywords_by_institute(&self, institute: &str) -> Result<Vec<KeywordCount>>;

    /// Citations per year for a keyword, oldest first
    async fn citation_trend_by_keyword(&self, keyword: &Keyword) -> Result<Vec<CitationPoint>>;
}

/// Read-side queries against the graph store
#[derive(Clone)]
pub struct GraphRepository {
    client: GraphClient,
}

impl GraphRepository {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GraphQueries for GraphRepository {
    async fn ping(&self) -> Result<()> {
        self.client.ping().await
    }

    async fn list_institutes(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut stream = self.client.graph.execute(query(LIST_INSTITUTES)).await?;
        while let Some(row) = stream.next().await? {
            names.push(row.get::<String>("name")?);
        }

        debug!(count = names.len(), "Institutes listed");
        Ok(names)
    }

    /// The ten most common interest keywords among an institute's faculty.
    ///
    /// An institute with no affiliated faculty (or an unknown name) yields an
    /// empty list.
    async fn top_keywords_by_institute(&self, institute: &str) -> Result<Vec<KeywordCount>> {
        let q = top_keywords_query(institute)?;

        let mut counts = Vec::new();
        let mut stream = self.client.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            counts.push(keyword_count_from_row(&row)?);
        }

        debug!(institute = institute.trim(), keywords = counts.len(), "Institute keywords loaded");
        Ok(counts)
    }

    /// Years without labeled publications are absent, not zero-filled.
    async fn citation_trend_by_keyword(&self, keyword: &Keyword) -> Result<Vec<CitationPoint>> {
        let q = query(CITATION_TREND_BY_KEYWORD).param("keyword", keyword.as_str());

        let mut points = Vec::new();
        let mut stream = self.client.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            points.push(citation_point_from_row(&row)?);
        }

        debug!(keyword = %keyword, years = points.len(), "Citation trend loaded");
        Ok(points)
    }
}

/// Normalize an institute name for lookup: trimmed, case preserved
pub fn institute_name(raw: &str) -> Result<&str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("institute", "Please select a university."));
    }
    Ok(name)
}

fn keyword_count_from_row(row: &Row) -> Result<KeywordCount> {
    Ok(KeywordCount {
        keyword: row.get::<String>("keyword")?,
        count: row.get::<i64>("count")?,
    })
}

fn citation_point_from_row(row: &Row) -> Result<CitationPoint> {
    let total_citations = match row.get::<i64>("totalCitations") {
        Ok(total) => total,
        Err(_) => row.get::<f64>("totalCitations")?.round() as i64,
    };

    Ok(CitationPoint {
        year: row.get::<i64>("year")?,
        total_citations,
    })
}

fn top_keywords_query(institute: &str) -> Result<Query> {
    let name = institute_name(institute)?;
    Ok(query(TOP_KEYWORDS_BY_INSTITUTE)
        .param("institute", name)
        .param("limit", TOP_KEYWORDS_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo4rs::{BoltList, BoltType};

    fn row(fields: &[&str], values: Vec<BoltType>) -> Row {
        let fields: Vec<BoltType> = fields.iter().map(|f| BoltType::from(*f)).collect();
        Row::new(BoltList::from(fields), BoltList::from(values))
    }

    #[test]
    fn test_keyword_count_row_mapping() {
        let r = row(
            &["keyword", "count"],
            vec![BoltType::from("machine learning"), BoltType::from(7i64)],
        );
        assert_eq!(
            keyword_count_from_row(&r).unwrap(),
            KeywordCount {
                keyword: "machine learning".to_string(),
                count: 7,
            }
        );
    }

    #[test]
    fn test_citation_point_row_mapping() {
        let r = row(
            &["year", "totalCitations"],
            vec![BoltType::from(2019i64), BoltType::from(42i64)],
        );
        assert_eq!(
            citation_point_from_row(&r).unwrap(),
            CitationPoint {
                year: 2019,
                total_citations: 42,
            }
        );
    }

    #[test]
    fn test_float_citation_total_is_rounded() {
        let r = row(
            &["year", "totalCitations"],
            vec![BoltType::from(2021i64), BoltType::from(17.0f64)],
        );
        assert_eq!(citation_point_from_row(&r).unwrap().total_citations, 17);
    }

    #[test]
    fn test_row_missing_column_is_an_error() {
        let r = row(&["year"], vec![BoltType::from(2021i64)]);
        assert!(citation_point_from_row(&r).is_err());
    }

    #[test]
    fn test_trend_sums_citations_as_integers() {
        assert!(CITATION_TREND_BY_KEYWORD
            .contains("toInteger(sum(coalesce(p.numCitations, 0))) AS totalCitations"));
    }

    #[test]
    fn test_institute_name_is_trimmed_not_lowercased() {
        assert_eq!(institute_name("  Test University ").unwrap(), "Test University");
    }

    #[test]
    fn test_blank_institute_is_rejected() {
        let err = institute_name(" \t").unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(top_keywords_query("").is_err());
    }

    #[test]
    fn test_top_keywords_query_params() {
        let q = top_keywords_query(" Test University").unwrap();
        assert!(q.has_param_key("institute"));
        assert!(q.has_param_key("limit"));
    }

    #[test]
    fn test_trend_is_ordered_by_year_without_gap_filling() {
        assert!(CITATION_TREND_BY_KEYWORD.contains("ORDER BY year ASC"));
        assert!(CITATION_TREND_BY_KEYWORD.contains("toLower(k.name) = toLower($keyword)"));
        assert!(!CITATION_TREND_BY_KEYWORD.contains("range("));
    }

    #[test]
    fn test_citation_point_wire_shape() {
        let point = CitationPoint {
            year: 2019,
            total_citations: 42,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json, serde_json::json!({ "year": 2019, "totalCitations": 42 }));
    }

    /// Needs a running server with the AcademicWorld graph loaded:
    /// `ACADEMICWORLD_TEST_NEO4J_URI=bolt://localhost:7687`
    async fn live_repository() -> Option<GraphRepository> {
        let uri = std::env::var("ACADEMICWORLD_TEST_NEO4J_URI").ok()?;
        let config = GraphConfig {
            uri,
            ..GraphConfig::default()
        };
        Some(GraphRepository::new(GraphClient::connect(&config).await.unwrap()))
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_unknown_institute_has_no_keywords() {
        let Some(repo) = live_repository().await else { return };
        let keywords = repo
            .top_keywords_by_institute("No Such Institute Anywhere")
            .await
            .unwrap();
        assert!(keywords.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_trend_years_ascend() {
        let Some(repo) = live_repository().await else { return };
        let keyword = Keyword::parse("machine learning").unwrap();
        let points = repo.citation_trend_by_keyword(&keyword).await.unwrap();
        assert!(points.windows(2).all(|w| w[0].year < w[1].year));
        assert!(repo.list_institutes().await.unwrap().windows(2).all(|w| w[0] <= w[1]));
    }
}
