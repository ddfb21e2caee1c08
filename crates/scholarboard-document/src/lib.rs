//! Document academic catalog backed by MongoDB.
//!
//! Publications and faculty live in two collections with embedded keyword
//! arrays. Reads go through aggregation pipelines (see [`pipeline`]); the only
//! write is the citation count of a single publication.

mod names;
pub mod pipeline;

use std::time::Duration;

use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, IndexModel};
use thiserror::Error;

pub use names::{NameBatch, RejectedName, canonical_name, parse_faculty_names};
pub use pipeline::{TOP_PUBLICATIONS_LIMIT, UNIVERSITIES_LIMIT};

/// Database name used when none is configured.
pub const DEFAULT_DATABASE: &str = "academicworld";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Publication fields shown in keyword rankings (no identifier).
#[derive(Debug, Clone, PartialEq)]
pub struct PublicationSummary {
    pub title: String,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub num_citations: i64,
}

/// A full publication document with its store identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicationDocument {
    /// Hex form of the document's `_id`.
    pub id: String,
    pub title: String,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub num_citations: i64,
    pub keywords: Vec<String>,
}

/// Result of a title lookup. `matches` is 2 when the title is not unique.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMatch {
    pub publication: PublicationDocument,
    pub matches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversityCount {
    pub university: Option<String>,
    pub faculty_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacultyPublicationRow {
    pub faculty: String,
    pub year: Option<i32>,
    pub title: String,
}

/// Joined faculty publications plus the name entries that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacultyPublications {
    pub rows: Vec<FacultyPublicationRow>,
    pub rejected: Vec<RejectedName>,
}

/// Handle to the document store.
#[derive(Clone)]
pub struct DocumentDatabase {
    publications: Collection<Document>,
    faculty: Collection<Document>,
    database: String,
}

impl DocumentDatabase {
    /// Connect to `uri`, bounding connection and server selection by `timeout`.
    pub async fn connect(
        uri: &str,
        database: &str,
        timeout: Duration,
    ) -> Result<Self, DocumentError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some("scholarboard".to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)?;
        let db = client.database(database);
        Ok(Self {
            publications: db.collection("publications"),
            faculty: db.collection("faculty"),
            database: database.to_string(),
        })
    }

    pub fn database_name(&self) -> &str {
        &self.database
    }

    /// Create the faculty-name and publication-keyword indexes.
    /// MongoDB treats re-creating an identical index as a no-op.
    pub async fn ensure_indexes(&self) -> Result<(), DocumentError> {
        let name_index = IndexModel::builder().keys(doc! { "name": 1 }).build();
        let created = self.faculty.create_index(name_index).await?;
        tracing::debug!(index = %created.index_name, "faculty index ready");

        let keyword_index = IndexModel::builder().keys(doc! { "keywords.id": 1 }).build();
        let created = self.publications.create_index(keyword_index).await?;
        tracing::debug!(index = %created.index_name, "publication index ready");
        Ok(())
    }

    /// Distinct keyword names across all publications, ascending.
    pub async fn all_keywords(&self) -> Result<Vec<String>, DocumentError> {
        let docs = self.aggregate(&self.publications, pipeline::all_keywords()).await?;
        Ok(docs
            .iter()
            .filter_map(|d| d.get_str("_id").ok().map(str::to_string))
            .collect())
    }

    pub async fn top_publications_by_keyword(
        &self,
        keyword: &str,
    ) -> Result<Vec<PublicationSummary>, DocumentError> {
        let docs = self
            .aggregate(&self.publications, pipeline::top_publications(keyword))
            .await?;
        Ok(docs.iter().map(summary_from_document).collect())
    }

    pub async fn universities_by_keyword(
        &self,
        keyword: &str,
    ) -> Result<Vec<UniversityCount>, DocumentError> {
        let docs = self
            .aggregate(&self.faculty, pipeline::universities_by_keyword(keyword))
            .await?;
        Ok(docs
            .iter()
            .map(|d| UniversityCount {
                university: d.get_str("_id").ok().map(str::to_string),
                faculty_count: int_field(d, "facultyCount").unwrap_or(0),
            })
            .collect())
    }

    /// First publication whose title matches exactly.
    ///
    /// Titles are not unique in the collection; when more than one document
    /// matches, a warning is logged and the first one is returned.
    pub async fn publication_by_title(&self, title: &str) -> Result<Option<TitleMatch>, DocumentError> {
        let cursor = self.publications.find(doc! { "title": title }).limit(2).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        let matches = docs.len();
        let Some(first) = docs.into_iter().next() else {
            return Ok(None);
        };
        if matches > 1 {
            tracing::warn!(title, "publication title is ambiguous, using first match");
        }

        Ok(Some(TitleMatch {
            publication: publication_from_document(&first)?,
            matches,
        }))
    }

    /// Canonical lookup by the hex `_id`. An unparseable id is treated as absent.
    pub async fn publication_by_id(&self, id: &str) -> Result<Option<PublicationDocument>, DocumentError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            tracing::debug!(id, "not a valid object id");
            return Ok(None);
        };
        match self.publications.find_one(doc! { "_id": oid }).await? {
            Some(d) => Ok(Some(publication_from_document(&d)?)),
            None => Ok(None),
        }
    }

    /// Set `numCitations` on one publication. Negative counts are ignored and
    /// reported as `false`; otherwise the write is unconditional.
    pub async fn update_publication_citations(
        &self,
        id: &str,
        new_count: i64,
    ) -> Result<bool, DocumentError> {
        if new_count < 0 {
            tracing::debug!(id, new_count, "ignoring negative citation count");
            return Ok(false);
        }
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = self
            .publications
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": { "numCitations": new_count } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Publications of the faculty named in a comma-separated `"First Last"` list.
    pub async fn publications_for_faculty(
        &self,
        name_list: &str,
    ) -> Result<FacultyPublications, DocumentError> {
        let batch = parse_faculty_names(name_list);
        if !batch.rejected.is_empty() {
            tracing::info!(rejected = batch.rejected.len(), "dropped malformed faculty names");
        }
        if batch.accepted.is_empty() {
            return Ok(FacultyPublications {
                rows: vec![],
                rejected: batch.rejected,
            });
        }

        let docs = self
            .aggregate(&self.faculty, pipeline::faculty_publications(&batch.accepted))
            .await?;
        let rows = docs
            .iter()
            .map(|d| FacultyPublicationRow {
                faculty: d.get_str("faculty").unwrap_or_default().to_string(),
                year: int_field(d, "year").and_then(|y| i32::try_from(y).ok()),
                title: d.get_str("title").unwrap_or_default().to_string(),
            })
            .collect();

        Ok(FacultyPublications {
            rows,
            rejected: batch.rejected,
        })
    }

    async fn aggregate(
        &self,
        collection: &Collection<Document>,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, DocumentError> {
        let cursor = collection.aggregate(pipeline).await?;
        Ok(cursor.try_collect().await?)
    }
}

/// Read a numeric field regardless of whether it was stored as int32, int64 or double.
fn int_field(doc: &Document, key: &str) -> Option<i64> {
    match doc.get(key)? {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.is_finite() => Some(*v as i64),
        _ => None,
    }
}

fn summary_from_document(doc: &Document) -> PublicationSummary {
    PublicationSummary {
        title: doc.get_str("title").unwrap_or_default().to_string(),
        venue: doc.get_str("venue").ok().map(str::to_string),
        year: int_field(doc, "year").and_then(|y| i32::try_from(y).ok()),
        num_citations: int_field(doc, "numCitations").unwrap_or(0),
    }
}

fn publication_from_document(doc: &Document) -> Result<PublicationDocument, DocumentError> {
    let id = doc
        .get_object_id("_id")
        .map_err(|e| DocumentError::Malformed(format!("publication _id: {e}")))?;
    let keywords = doc
        .get_array("keywords")
        .map(|arr| {
            arr.iter()
                .filter_map(|k| k.as_document())
                .filter_map(|k| k.get_str("name").ok().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    let summary = summary_from_document(doc);

    Ok(PublicationDocument {
        id: id.to_hex(),
        title: summary.title,
        venue: summary.venue,
        year: summary.year,
        num_citations: summary.num_citations,
        keywords,
    })
}
