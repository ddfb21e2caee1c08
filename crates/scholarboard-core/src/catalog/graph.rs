use scholarboard_graph::GraphDatabase;

use super::{Catalog, CatalogFuture, GraphCatalog, StoreKind};
use crate::TrendPoint;

/// Graph catalog backed by Neo4j.
pub struct Neo4jCatalog {
    db: GraphDatabase,
}

impl Neo4jCatalog {
    pub fn new(db: GraphDatabase) -> Self {
        Self { db }
    }
}

impl Catalog for Neo4jCatalog {
    fn store(&self) -> StoreKind {
        StoreKind::Graph
    }
}

impl GraphCatalog for Neo4jCatalog {
    fn keyword_trend<'a>(&'a self, keywords: &'a [String]) -> CatalogFuture<'a, Vec<TrendPoint>> {
        Box::pin(async move {
            let points = self.db.keyword_trend(keywords).await?;
            Ok(points
                .into_iter()
                .map(|p| TrendPoint {
                    year: p.year,
                    keyword: p.keyword,
                    publication_count: p.publication_count,
                })
                .collect())
        })
    }
}
