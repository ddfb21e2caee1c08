//! Mock catalog for testing.

use std::sync::Mutex;
use std::time::Duration;

use super::{
    Catalog, CatalogError, CatalogFuture, DocumentCatalog, GraphCatalog, RelationalCatalog,
    StoreKind,
};
use crate::{
    Faculty, FacultyId, FacultyPublications, FacultyRank, KeywordPopularity, Publication,
    PublicationId, PublicationRow, TitleMatch, TrendPoint, UniversityCount,
};

/// A hand-rolled mock implementing all three catalog traits.
///
/// Supports:
/// - One canned publication and one canned faculty record.
/// - Failing every call with a fixed message.
/// - Optional per-call latency.
/// - Recording the name of every operation invoked.
pub struct MockCatalog {
    store: StoreKind,
    publication: Option<Publication>,
    faculty: Option<Faculty>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockCatalog {
    pub fn new(store: StoreKind) -> Self {
        Self {
            store,
            publication: None,
            faculty: None,
            failure: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_publication(mut self, publication: Publication) -> Self {
        self.publication = Some(publication);
        self
    }

    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculty = Some(faculty);
        self
    }

    /// Fail every call as if the store were unreachable.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Operations invoked so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    fn respond<T: Send + 'static>(&self, op: &'static str, value: T) -> CatalogFuture<'static, T> {
        self.calls.lock().unwrap().push(op);
        let store = self.store;
        let failure = self.failure.clone();
        let delay = self.delay;
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            match failure {
                Some(message) => Err(CatalogError::unavailable(store, message)),
                None => Ok(value),
            }
        })
    }
}

/// A publication document with a fixed identifier.
pub fn sample_publication(num_citations: i64) -> Publication {
    Publication {
        id: PublicationId("64b7f0c2a1e4d93f5c2b8a10".into()),
        title: "Attention Is All You Need".into(),
        venue: Some("NeurIPS".into()),
        year: Some(2017),
        num_citations,
        keywords: vec!["nlp".into()],
    }
}

pub fn sample_faculty() -> Faculty {
    Faculty {
        id: FacultyId(42),
        name: "Agouris,Peggy".into(),
        position: Some("Professor".into()),
        research_interest: Some("Geospatial information science".into()),
        email: None,
        phone: None,
        photo_url: Some("https://img.example.org/old.jpg".into()),
        university: "George Mason University".into(),
    }
}

impl Catalog for MockCatalog {
    fn store(&self) -> StoreKind {
        self.store
    }
}

impl RelationalCatalog for MockCatalog {
    fn top_keywords(&self, _n: u32, _min_year: i32) -> CatalogFuture<'_, Vec<KeywordPopularity>> {
        self.respond("top_keywords", vec![])
    }

    fn all_keywords(&self) -> CatalogFuture<'_, Vec<String>> {
        self.respond("all_keywords", vec![])
    }

    fn top_faculty_by_keyword<'a>(
        &'a self,
        _keyword: &'a str,
    ) -> CatalogFuture<'a, Vec<FacultyRank>> {
        self.respond("top_faculty_by_keyword", vec![])
    }

    fn faculty_by_id(&self, id: FacultyId) -> CatalogFuture<'_, Option<Faculty>> {
        let found = self.faculty.clone().filter(|f| f.id == id);
        self.respond("faculty_by_id", found)
    }

    fn update_faculty_photo_url<'a>(
        &'a self,
        _id: FacultyId,
        _url: &'a str,
    ) -> CatalogFuture<'a, bool> {
        self.respond("update_faculty_photo_url", true)
    }

    fn ensure_indexes(&self) -> CatalogFuture<'_, bool> {
        self.respond("ensure_relational_indexes", false)
    }
}

impl DocumentCatalog for MockCatalog {
    fn all_keywords(&self) -> CatalogFuture<'_, Vec<String>> {
        self.respond("document_keywords", vec![])
    }

    fn top_publications_by_keyword<'a>(
        &'a self,
        _keyword: &'a str,
    ) -> CatalogFuture<'a, Vec<PublicationRow>> {
        self.respond("top_publications_by_keyword", vec![])
    }

    fn universities_by_keyword<'a>(
        &'a self,
        _keyword: &'a str,
    ) -> CatalogFuture<'a, Vec<UniversityCount>> {
        self.respond("universities_by_keyword", vec![])
    }

    fn publication_by_title<'a>(&'a self, title: &'a str) -> CatalogFuture<'a, Option<TitleMatch>> {
        let found = self
            .publication
            .clone()
            .filter(|p| p.title == title)
            .map(|publication| TitleMatch {
                publication,
                matches: 1,
            });
        self.respond("publication_by_title", found)
    }

    fn publication_by_id<'a>(
        &'a self,
        id: &'a PublicationId,
    ) -> CatalogFuture<'a, Option<Publication>> {
        let found = self.publication.clone().filter(|p| &p.id == id);
        self.respond("publication_by_id", found)
    }

    fn update_publication_citations<'a>(
        &'a self,
        _id: &'a PublicationId,
        new_count: i64,
    ) -> CatalogFuture<'a, bool> {
        self.respond("update_publication_citations", new_count >= 0)
    }

    fn publications_for_faculty<'a>(
        &'a self,
        _names: &'a str,
    ) -> CatalogFuture<'a, FacultyPublications> {
        self.respond("publications_for_faculty", FacultyPublications::default())
    }

    fn ensure_indexes(&self) -> CatalogFuture<'_, ()> {
        self.respond("ensure_document_indexes", ())
    }
}

impl GraphCatalog for MockCatalog {
    fn keyword_trend<'a>(&'a self, _keywords: &'a [String]) -> CatalogFuture<'a, Vec<TrendPoint>> {
        self.respond("keyword_trend", vec![])
    }
}
