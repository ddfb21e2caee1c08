//! Graph academic catalog backed by Neo4j.
//!
//! Keywords and publications are nodes linked by `LABEL_BY` relationships;
//! the only query is the per-year publication trend of a keyword.

use std::time::Duration;

use neo4rs::{ConfigBuilder, Graph, Query, query};
use thiserror::Error;

/// Publications per year for one keyword, oldest year first.
pub const TREND_QUERY: &str = "\
MATCH (k:KEYWORD {name: $keyword})<-[:LABEL_BY]-(p:PUBLICATION)
WHERE p.year IS NOT NULL
RETURN p.year AS year, $keyword AS keyword, COUNT(p) AS publication_count
ORDER BY year";

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("graph error: {0}")]
    Graph(#[from] neo4rs::Error),
    #[error("unexpected row shape: {0}")]
    Row(String),
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),
}

/// One point of a keyword trend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub year: i64,
    pub keyword: String,
    pub publication_count: i64,
}

/// Connection settings for the graph store.
#[derive(Clone)]
pub struct GraphSettings {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
}

impl std::fmt::Debug for GraphSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphSettings")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Handle to the graph store. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct GraphDatabase {
    graph: Graph,
}

impl GraphDatabase {
    /// Connect and verify the credentials, giving up after `timeout`.
    pub async fn connect(settings: &GraphSettings, timeout: Duration) -> Result<Self, GraphError> {
        let mut builder = ConfigBuilder::default()
            .uri(settings.uri.as_str())
            .user(settings.user.as_str())
            .password(settings.password.as_str());
        if let Some(db) = &settings.database {
            builder = builder.db(db.as_str());
        }
        let config = builder.build()?;

        let graph = tokio::time::timeout(timeout, Graph::connect(config))
            .await
            .map_err(|_| GraphError::Timeout(timeout))??;
        tracing::info!(uri = %settings.uri, "connected to graph store");
        Ok(Self { graph })
    }

    /// Per-year publication counts for each keyword.
    ///
    /// Keywords are queried one after another and their blocks concatenated in
    /// input order; a keyword with no node simply contributes nothing.
    pub async fn keyword_trend(&self, keywords: &[String]) -> Result<Vec<TrendPoint>, GraphError> {
        let mut points = Vec::new();
        for keyword in keywords {
            let mut stream = self.graph.execute(trend_query(keyword)).await?;
            while let Some(row) = stream.next().await? {
                points.push(TrendPoint {
                    year: row
                        .get::<i64>("year")
                        .map_err(|e| GraphError::Row(format!("year: {e}")))?,
                    keyword: row
                        .get::<String>("keyword")
                        .map_err(|e| GraphError::Row(format!("keyword: {e}")))?,
                    publication_count: row
                        .get::<i64>("publication_count")
                        .map_err(|e| GraphError::Row(format!("publication_count: {e}")))?,
                });
            }
        }
        Ok(points)
    }
}

fn trend_query(keyword: &str) -> Query {
    query(TREND_QUERY).param("keyword", keyword)
}
