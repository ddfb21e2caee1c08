//! Catalog traits and the store-backed implementations behind them.
//!
//! Each store answers through a trait returning a boxed future, so the
//! dashboard can hold `Arc<dyn ...>` handles and swap real stores for the
//! offline fixture or a test double.

pub mod document;
pub mod graph;
#[cfg(test)]
pub mod mock;
pub mod relational;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::{
    Faculty, FacultyId, FacultyPublications, FacultyRank, KeywordPopularity, Publication,
    PublicationId, PublicationRow, TitleMatch, TrendPoint, UniversityCount,
};

pub use document::MongoCatalog;
pub use graph::Neo4jCatalog;
pub use relational::SqliteCatalog;

/// Which backing store a catalog call went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Relational,
    Document,
    Graph,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Relational => write!(f, "relational"),
            StoreKind::Document => write!(f, "document"),
            StoreKind::Graph => write!(f, "graph"),
        }
    }
}

/// A catalog call that could not be answered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{store} store unavailable: {message}")]
    StoreUnavailable { store: StoreKind, message: String },
    #[error("{store} store timed out after {after:?}")]
    Timeout { store: StoreKind, after: Duration },
}

impl CatalogError {
    pub fn unavailable(store: StoreKind, message: impl Into<String>) -> Self {
        CatalogError::StoreUnavailable {
            store,
            message: message.into(),
        }
    }

    pub fn store(&self) -> StoreKind {
        match self {
            CatalogError::StoreUnavailable { store, .. } | CatalogError::Timeout { store, .. } => {
                *store
            }
        }
    }
}

impl From<scholarboard_relational::RelationalError> for CatalogError {
    fn from(e: scholarboard_relational::RelationalError) -> Self {
        CatalogError::unavailable(StoreKind::Relational, e.to_string())
    }
}

impl From<scholarboard_document::DocumentError> for CatalogError {
    fn from(e: scholarboard_document::DocumentError) -> Self {
        CatalogError::unavailable(StoreKind::Document, e.to_string())
    }
}

impl From<scholarboard_graph::GraphError> for CatalogError {
    fn from(e: scholarboard_graph::GraphError) -> Self {
        CatalogError::unavailable(StoreKind::Graph, e.to_string())
    }
}

/// Boxed future returned by every catalog operation.
pub type CatalogFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'a>>;

/// Common surface of every catalog.
pub trait Catalog: Send + Sync {
    /// The store this catalog talks to, used in logs and errors.
    fn store(&self) -> StoreKind;
}

/// Aggregates over the normalized faculty/publication/keyword tables.
pub trait RelationalCatalog: Catalog {
    /// The `n` keywords with the most distinct publications since `min_year`,
    /// most popular first.
    fn top_keywords(&self, n: u32, min_year: i32) -> CatalogFuture<'_, Vec<KeywordPopularity>>;

    /// Every keyword name, ascending.
    fn all_keywords(&self) -> CatalogFuture<'_, Vec<String>>;

    /// At most five faculty ranked by total citations on publications tagged `keyword`.
    fn top_faculty_by_keyword<'a>(&'a self, keyword: &'a str)
    -> CatalogFuture<'a, Vec<FacultyRank>>;

    fn faculty_by_id(&self, id: FacultyId) -> CatalogFuture<'_, Option<Faculty>>;

    /// Overwrite a photo URL. Resolves to `false` when the store rejected the write.
    fn update_faculty_photo_url<'a>(&'a self, id: FacultyId, url: &'a str)
    -> CatalogFuture<'a, bool>;

    /// Create the keyword-name index if missing. Returns whether it was created.
    fn ensure_indexes(&self) -> CatalogFuture<'_, bool>;
}

/// Publication and faculty documents.
pub trait DocumentCatalog: Catalog {
    /// Distinct keyword names across all publications, ascending.
    fn all_keywords(&self) -> CatalogFuture<'_, Vec<String>>;

    /// Up to fifty publications tagged `keyword`, most cited first.
    fn top_publications_by_keyword<'a>(
        &'a self,
        keyword: &'a str,
    ) -> CatalogFuture<'a, Vec<PublicationRow>>;

    /// Up to fifty universities ranked by faculty interested in `keyword`.
    fn universities_by_keyword<'a>(
        &'a self,
        keyword: &'a str,
    ) -> CatalogFuture<'a, Vec<UniversityCount>>;

    fn publication_by_title<'a>(&'a self, title: &'a str) -> CatalogFuture<'a, Option<TitleMatch>>;

    fn publication_by_id<'a>(&'a self, id: &'a PublicationId)
    -> CatalogFuture<'a, Option<Publication>>;

    /// Set the citation count. Negative counts are not written and yield `false`.
    fn update_publication_citations<'a>(
        &'a self,
        id: &'a PublicationId,
        new_count: i64,
    ) -> CatalogFuture<'a, bool>;

    /// Publications for a comma-separated list of `"First Last"` names.
    fn publications_for_faculty<'a>(
        &'a self,
        names: &'a str,
    ) -> CatalogFuture<'a, FacultyPublications>;

    fn ensure_indexes(&self) -> CatalogFuture<'_, ()>;
}

/// Keyword/publication graph.
pub trait GraphCatalog: Catalog {
    /// Per-year publication counts for each keyword, concatenated in input order.
    fn keyword_trend<'a>(&'a self, keywords: &'a [String]) -> CatalogFuture<'a, Vec<TrendPoint>>;
}

/// Bound `fut` by `after`, reporting expiry as a timeout of `store`.
pub async fn with_timeout<T>(
    store: StoreKind,
    after: Duration,
    fut: CatalogFuture<'_, T>,
) -> Result<T, CatalogError> {
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(CatalogError::Timeout { store, after }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn with_timeout_reports_slow_store() {
        let slow: CatalogFuture<'_, u32> = Box::pin(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(1)
        });
        let err = with_timeout(StoreKind::Graph, Duration::from_secs(2), slow)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::Timeout {
                store: StoreKind::Graph,
                after: Duration::from_secs(2)
            }
        );
        assert_eq!(err.store(), StoreKind::Graph);
    }

    #[tokio::test]
    async fn with_timeout_passes_through_results() {
        let fast: CatalogFuture<'_, u32> = Box::pin(async { Ok(7) });
        assert_eq!(
            with_timeout(StoreKind::Document, Duration::from_secs(1), fast).await,
            Ok(7)
        );
    }

    #[test]
    fn store_errors_map_to_their_store() {
        let err: CatalogError =
            scholarboard_relational::RelationalError::Schema("missing table".into()).into();
        assert_eq!(err.store(), StoreKind::Relational);
        assert!(err.to_string().contains("missing table"));

        let err: CatalogError =
            scholarboard_document::DocumentError::Malformed("no title".into()).into();
        assert_eq!(err.store(), StoreKind::Document);
    }
}
