use scholarboard_document as store;
use scholarboard_document::DocumentDatabase;

use super::{Catalog, CatalogError, CatalogFuture, DocumentCatalog, StoreKind};
use crate::{
    FacultyPublication, FacultyPublications, Publication, PublicationId, PublicationRow,
    RejectedName, TitleMatch, UniversityCount,
};

/// Document catalog backed by MongoDB.
pub struct MongoCatalog {
    db: DocumentDatabase,
}

impl MongoCatalog {
    pub fn new(db: DocumentDatabase) -> Self {
        Self { db }
    }
}

impl Catalog for MongoCatalog {
    fn store(&self) -> StoreKind {
        StoreKind::Document
    }
}

impl DocumentCatalog for MongoCatalog {
    fn all_keywords(&self) -> CatalogFuture<'_, Vec<String>> {
        Box::pin(async move { Ok(self.db.all_keywords().await?) })
    }

    fn top_publications_by_keyword<'a>(
        &'a self,
        keyword: &'a str,
    ) -> CatalogFuture<'a, Vec<PublicationRow>> {
        Box::pin(async move {
            let rows = self.db.top_publications_by_keyword(keyword).await?;
            Ok(rows.into_iter().map(PublicationRow::from).collect())
        })
    }

    fn universities_by_keyword<'a>(
        &'a self,
        keyword: &'a str,
    ) -> CatalogFuture<'a, Vec<UniversityCount>> {
        Box::pin(async move {
            let rows = self.db.universities_by_keyword(keyword).await?;
            Ok(rows
                .into_iter()
                .map(|u| UniversityCount {
                    university: u.university,
                    faculty_count: u.faculty_count,
                })
                .collect())
        })
    }

    fn publication_by_title<'a>(&'a self, title: &'a str) -> CatalogFuture<'a, Option<TitleMatch>> {
        Box::pin(async move {
            Ok(self
                .db
                .publication_by_title(title)
                .await?
                .map(|m| TitleMatch {
                    publication: m.publication.into(),
                    matches: m.matches,
                }))
        })
    }

    fn publication_by_id<'a>(
        &'a self,
        id: &'a PublicationId,
    ) -> CatalogFuture<'a, Option<Publication>> {
        Box::pin(async move { Ok(self.db.publication_by_id(id.as_str()).await?.map(Publication::from)) })
    }

    fn update_publication_citations<'a>(
        &'a self,
        id: &'a PublicationId,
        new_count: i64,
    ) -> CatalogFuture<'a, bool> {
        Box::pin(async move {
            self.db
                .update_publication_citations(id.as_str(), new_count)
                .await
                .map_err(CatalogError::from)
        })
    }

    fn publications_for_faculty<'a>(
        &'a self,
        names: &'a str,
    ) -> CatalogFuture<'a, FacultyPublications> {
        Box::pin(async move { Ok(self.db.publications_for_faculty(names).await?.into()) })
    }

    fn ensure_indexes(&self) -> CatalogFuture<'_, ()> {
        Box::pin(async move { Ok(self.db.ensure_indexes().await?) })
    }
}

impl From<store::PublicationSummary> for PublicationRow {
    fn from(p: store::PublicationSummary) -> Self {
        PublicationRow {
            title: p.title,
            venue: p.venue,
            year: p.year,
            num_citations: p.num_citations,
        }
    }
}

impl From<store::PublicationDocument> for Publication {
    fn from(p: store::PublicationDocument) -> Self {
        Publication {
            id: PublicationId(p.id),
            title: p.title,
            venue: p.venue,
            year: p.year,
            num_citations: p.num_citations,
            keywords: p.keywords,
        }
    }
}

impl From<store::RejectedName> for RejectedName {
    fn from(r: store::RejectedName) -> Self {
        RejectedName {
            input: r.input,
            tokens: r.tokens,
        }
    }
}

impl From<store::FacultyPublications> for FacultyPublications {
    fn from(f: store::FacultyPublications) -> Self {
        FacultyPublications {
            rows: f
                .rows
                .into_iter()
                .map(|r| FacultyPublication {
                    faculty: r.faculty,
                    year: r.year,
                    title: r.title,
                })
                .collect(),
            rejected: f.rejected.into_iter().map(RejectedName::from).collect(),
        }
    }
}
