//! Offline catalog served from a JSON dataset.
//!
//! The same dataset seeds an in-memory relational database and answers the
//! document and graph operations directly, so the dashboard runs end to end
//! without any live store.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use scholarboard_document::{TOP_PUBLICATIONS_LIMIT, UNIVERSITIES_LIMIT, parse_faculty_names};
use scholarboard_relational::{FacultyRow, RelationalDatabase, SeedBatch, UniversityRow};

use crate::catalog::{
    Catalog, CatalogError, CatalogFuture, DocumentCatalog, GraphCatalog, StoreKind,
};
use crate::{
    CoreError, FacultyPublication, FacultyPublications, Publication, PublicationId,
    PublicationRow, RejectedName, TitleMatch, TrendPoint, UniversityCount,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureDataset {
    #[serde(default)]
    pub universities: Vec<FixtureUniversity>,
    #[serde(default)]
    pub faculty: Vec<FixtureFaculty>,
    #[serde(default)]
    pub publications: Vec<FixturePublication>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureUniversity {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureFaculty {
    pub id: i64,
    /// Stored as `"Last,First"`.
    pub name: String,
    pub position: Option<String>,
    pub research_interest: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub university_id: i64,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Ids of authored publications.
    #[serde(default)]
    pub publications: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixturePublication {
    pub id: i64,
    pub title: String,
    pub venue: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub num_citations: i64,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Document identifier for a fixture publication, shaped like an ObjectId.
pub fn fixture_publication_id(id: i64) -> PublicationId {
    PublicationId(format!("{id:024x}"))
}

impl FixtureDataset {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CoreError> {
        let dataset: FixtureDataset =
            serde_json::from_str(content).map_err(|e| CoreError::Fixture(e.to_string()))?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check that every faculty member references a known university and
    /// known publications.
    pub fn validate(&self) -> Result<(), CoreError> {
        let universities: BTreeSet<i64> = self.universities.iter().map(|u| u.id).collect();
        let publications: BTreeSet<i64> = self.publications.iter().map(|p| p.id).collect();

        for f in &self.faculty {
            if !universities.contains(&f.university_id) {
                return Err(CoreError::Fixture(format!(
                    "faculty {} references unknown university {}",
                    f.id, f.university_id
                )));
            }
            if let Some(missing) = f.publications.iter().find(|p| !publications.contains(p)) {
                return Err(CoreError::Fixture(format!(
                    "faculty {} references unknown publication {missing}",
                    f.id
                )));
            }
        }
        Ok(())
    }

    /// Rows for the relational store. Keyword ids follow name order.
    pub fn relational_seed(&self) -> SeedBatch {
        let names: BTreeSet<&str> = self
            .publications
            .iter()
            .flat_map(|p| p.keywords.iter())
            .chain(self.faculty.iter().flat_map(|f| f.keywords.iter()))
            .map(String::as_str)
            .collect();
        let keyword_ids: HashMap<&str, i64> =
            names.iter().enumerate().map(|(i, n)| (*n, i as i64 + 1)).collect();

        let mut batch = SeedBatch::new();
        batch.keywords = names
            .iter()
            .map(|n| (keyword_ids[n], n.to_string()))
            .collect();
        batch.universities = self
            .universities
            .iter()
            .map(|u| UniversityRow {
                id: u.id,
                name: u.name.clone(),
            })
            .collect();

        for f in &self.faculty {
            batch.faculty.push(FacultyRow {
                id: f.id,
                name: f.name.clone(),
                position: f.position.clone(),
                research_interest: f.research_interest.clone(),
                email: f.email.clone(),
                phone: f.phone.clone(),
                photo_url: f.photo_url.clone(),
                university_id: f.university_id,
            });
            batch
                .faculty_publications
                .extend(f.publications.iter().map(|p| (f.id, *p)));
            batch
                .faculty_keywords
                .extend(f.keywords.iter().map(|k| (f.id, keyword_ids[k.as_str()])));
        }

        for p in &self.publications {
            batch.publications.push(scholarboard_relational::PublicationRow {
                id: p.id,
                title: p.title.clone(),
                venue: p.venue.clone(),
                year: p.year,
                num_citations: p.num_citations,
            });
            batch
                .publication_keywords
                .extend(p.keywords.iter().map(|k| (p.id, keyword_ids[k.as_str()])));
        }
        batch
    }

    /// A fresh in-memory relational database holding this dataset.
    pub fn open_relational(&self) -> Result<RelationalDatabase, CoreError> {
        let db = RelationalDatabase::open_in_memory()?;
        db.seed(&self.relational_seed())?;
        Ok(db)
    }

    fn publication(&self, p: &FixturePublication) -> Publication {
        Publication {
            id: fixture_publication_id(p.id),
            title: p.title.clone(),
            venue: p.venue.clone(),
            year: p.year,
            num_citations: p.num_citations,
            keywords: p.keywords.clone(),
        }
    }
}

type SharedDataset = Arc<RwLock<FixtureDataset>>;

fn read_dataset<T>(
    data: &SharedDataset,
    store: StoreKind,
    f: impl FnOnce(&FixtureDataset) -> T,
) -> CatalogFuture<'static, T>
where
    T: Send + 'static,
{
    let result = data
        .read()
        .map(|data| f(&data))
        .map_err(|e| CatalogError::unavailable(store, e.to_string()));
    Box::pin(std::future::ready(result))
}

/// Document catalog answering from a [`FixtureDataset`].
pub struct FixtureCatalog {
    data: SharedDataset,
}

impl FixtureCatalog {
    pub fn new(dataset: FixtureDataset) -> Self {
        Self {
            data: Arc::new(RwLock::new(dataset)),
        }
    }

    /// Graph catalog over the same dataset.
    pub fn graph(&self) -> FixtureGraph {
        FixtureGraph {
            data: Arc::clone(&self.data),
        }
    }

    fn read<T>(
        &self,
        store: StoreKind,
        f: impl FnOnce(&FixtureDataset) -> T,
    ) -> CatalogFuture<'static, T>
    where
        T: Send + 'static,
    {
        read_dataset(&self.data, store, f)
    }
}

impl Catalog for FixtureCatalog {
    fn store(&self) -> StoreKind {
        StoreKind::Document
    }
}

/// Graph catalog answering from a [`FixtureDataset`] shared with a
/// [`FixtureCatalog`].
pub struct FixtureGraph {
    data: SharedDataset,
}

impl Catalog for FixtureGraph {
    fn store(&self) -> StoreKind {
        StoreKind::Graph
    }
}

impl DocumentCatalog for FixtureCatalog {
    fn all_keywords(&self) -> CatalogFuture<'_, Vec<String>> {
        self.read(StoreKind::Document, |data| {
            let names: BTreeSet<&String> =
                data.publications.iter().flat_map(|p| p.keywords.iter()).collect();
            names.into_iter().cloned().collect()
        })
    }

    fn top_publications_by_keyword<'a>(
        &'a self,
        keyword: &'a str,
    ) -> CatalogFuture<'a, Vec<PublicationRow>> {
        self.read(StoreKind::Document, |data| {
            let mut tagged: Vec<&FixturePublication> = data
                .publications
                .iter()
                .filter(|p| p.keywords.iter().any(|k| k == keyword))
                .collect();
            tagged.sort_by(|a, b| b.num_citations.cmp(&a.num_citations));
            tagged
                .into_iter()
                .take(TOP_PUBLICATIONS_LIMIT as usize)
                .map(|p| PublicationRow {
                    title: p.title.clone(),
                    venue: p.venue.clone(),
                    year: p.year,
                    num_citations: p.num_citations,
                })
                .collect()
        })
    }

    fn universities_by_keyword<'a>(
        &'a self,
        keyword: &'a str,
    ) -> CatalogFuture<'a, Vec<UniversityCount>> {
        self.read(StoreKind::Document, |data| {
            let names: HashMap<i64, &str> = data
                .universities
                .iter()
                .map(|u| (u.id, u.name.as_str()))
                .collect();

            let mut counts: Vec<UniversityCount> = Vec::new();
            for f in data
                .faculty
                .iter()
                .filter(|f| f.keywords.iter().any(|k| k == keyword))
            {
                let university = names.get(&f.university_id).map(|n| n.to_string());
                match counts.iter_mut().find(|c| c.university == university) {
                    Some(c) => c.faculty_count += 1,
                    None => counts.push(UniversityCount {
                        university,
                        faculty_count: 1,
                    }),
                }
            }
            counts.sort_by(|a, b| b.faculty_count.cmp(&a.faculty_count));
            counts.truncate(UNIVERSITIES_LIMIT as usize);
            counts
        })
    }

    fn publication_by_title<'a>(&'a self, title: &'a str) -> CatalogFuture<'a, Option<TitleMatch>> {
        self.read(StoreKind::Document, |data| {
            let mut hits = data.publications.iter().filter(|p| p.title == title);
            let first = hits.next()?;
            let matches = if hits.next().is_some() { 2 } else { 1 };
            if matches > 1 {
                tracing::warn!(title, "publication title is ambiguous, using first match");
            }
            Some(TitleMatch {
                publication: data.publication(first),
                matches,
            })
        })
    }

    fn publication_by_id<'a>(
        &'a self,
        id: &'a PublicationId,
    ) -> CatalogFuture<'a, Option<Publication>> {
        self.read(StoreKind::Document, |data| {
            data.publications
                .iter()
                .find(|p| fixture_publication_id(p.id) == *id)
                .map(|p| data.publication(p))
        })
    }

    fn update_publication_citations<'a>(
        &'a self,
        id: &'a PublicationId,
        new_count: i64,
    ) -> CatalogFuture<'a, bool> {
        if new_count < 0 {
            tracing::debug!(id = %id, new_count, "ignoring negative citation count");
            return Box::pin(std::future::ready(Ok(false)));
        }
        let result = match self.data.write() {
            Ok(mut data) => Ok(data
                .publications
                .iter_mut()
                .find(|p| fixture_publication_id(p.id) == *id)
                .map(|p| p.num_citations = new_count)
                .is_some()),
            Err(e) => Err(CatalogError::unavailable(StoreKind::Document, e.to_string())),
        };
        Box::pin(std::future::ready(result))
    }

    fn publications_for_faculty<'a>(
        &'a self,
        names: &'a str,
    ) -> CatalogFuture<'a, FacultyPublications> {
        let batch = parse_faculty_names(names);
        self.read(StoreKind::Document, move |data| {
            let by_id: HashMap<i64, &FixturePublication> =
                data.publications.iter().map(|p| (p.id, p)).collect();
            let rows = data
                .faculty
                .iter()
                .filter(|f| batch.accepted.contains(&f.name))
                .flat_map(|f| {
                    f.publications
                        .iter()
                        .filter_map(|id| by_id.get(id))
                        .map(|p| FacultyPublication {
                            faculty: f.name.clone(),
                            year: p.year,
                            title: p.title.clone(),
                        })
                })
                .collect();
            FacultyPublications {
                rows,
                rejected: batch.rejected.into_iter().map(RejectedName::from).collect(),
            }
        })
    }

    fn ensure_indexes(&self) -> CatalogFuture<'_, ()> {
        Box::pin(std::future::ready(Ok(())))
    }
}

impl GraphCatalog for FixtureGraph {
    fn keyword_trend<'a>(&'a self, keywords: &'a [String]) -> CatalogFuture<'a, Vec<TrendPoint>> {
        read_dataset(&self.data, StoreKind::Graph, |data| {
            let mut points = Vec::new();
            for keyword in keywords {
                let mut per_year: BTreeMap<i32, i64> = BTreeMap::new();
                for p in data
                    .publications
                    .iter()
                    .filter(|p| p.keywords.iter().any(|k| k == keyword))
                {
                    if let Some(year) = p.year {
                        *per_year.entry(year).or_default() += 1;
                    }
                }
                points.extend(per_year.into_iter().map(|(year, count)| TrendPoint {
                    year: i64::from(year),
                    keyword: keyword.clone(),
                    publication_count: count,
                }));
            }
            points
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../fixtures/sample.json");

    fn catalog() -> FixtureCatalog {
        FixtureCatalog::new(FixtureDataset::from_json(SAMPLE).unwrap())
    }

    #[test]
    fn fixture_ids_look_like_object_ids() {
        let id = fixture_publication_id(10);
        assert_eq!(id.as_str().len(), 24);
        assert_eq!(id.as_str(), "00000000000000000000000a");
    }

    #[test]
    fn dangling_references_are_rejected() {
        let json = r#"{
            "universities": [{"id": 1, "name": "MIT"}],
            "faculty": [{"id": 1, "name": "Doe,Jane", "universityId": 2}]
        }"#;
        match FixtureDataset::from_json(json) {
            Err(CoreError::Fixture(msg)) => assert!(msg.contains("unknown university")),
            other => panic!("expected fixture error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_fixture_error() {
        assert!(matches!(
            FixtureDataset::from_json("{ not json"),
            Err(CoreError::Fixture(_))
        ));
    }

    #[tokio::test]
    async fn title_lookup_flags_duplicates() {
        let catalog = catalog();
        let hit = catalog
            .publication_by_title("Attention Is All You Need")
            .await
            .unwrap()
            .unwrap();
        assert!(hit.is_ambiguous());
        assert_eq!(hit.publication.year, Some(2020));

        let unique = catalog
            .publication_by_title("Tokenization Revisited")
            .await
            .unwrap()
            .unwrap();
        assert!(!unique.is_ambiguous());
        assert!(catalog.publication_by_title("Nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn graph_view_reports_graph_store() {
        let documents = catalog();
        let graph = documents.graph();
        assert_eq!(documents.store(), StoreKind::Document);
        assert_eq!(graph.store(), StoreKind::Graph);

        let points = graph.keyword_trend(&["vision".to_string()]).await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].publication_count, 1);
    }

    #[tokio::test]
    async fn citation_update_round_trips_through_id() {
        let catalog = catalog();
        let id = fixture_publication_id(7);
        assert!(catalog.update_publication_citations(&id, 12).await.unwrap());
        let p = catalog.publication_by_id(&id).await.unwrap().unwrap();
        assert_eq!(p.num_citations, 12);

        assert!(!catalog.update_publication_citations(&id, -1).await.unwrap());
        let p = catalog.publication_by_id(&id).await.unwrap().unwrap();
        assert_eq!(p.num_citations, 12);

        let unknown = PublicationId("ffffffffffffffffffffffff".into());
        assert!(!catalog.update_publication_citations(&unknown, 1).await.unwrap());
    }

    #[tokio::test]
    async fn universities_rank_by_faculty_count() {
        let rows = catalog().universities_by_keyword("nlp").await.unwrap();
        assert_eq!(
            rows[0].university.as_deref(),
            Some("University of Illinois Urbana-Champaign")
        );
        assert_eq!(rows[0].faculty_count, 2);
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn trend_skips_publications_without_year() {
        let points = catalog().graph().keyword_trend(&["nlp".to_string()]).await.unwrap();
        let total: i64 = points.iter().map(|p| p.publication_count).sum();
        assert_eq!(total, 6);
        assert!(points.windows(2).all(|w| w[0].year < w[1].year));
    }

    #[test]
    fn relational_seed_links_every_keyword() {
        let dataset = FixtureDataset::from_json(SAMPLE).unwrap();
        let batch = dataset.relational_seed();
        assert_eq!(batch.keywords.len(), 5);
        assert_eq!(batch.keywords[0], (1, "databases".to_string()));
        let tagged: usize = dataset.publications.iter().map(|p| p.keywords.len()).sum();
        assert_eq!(batch.publication_keywords.len(), tagged);
    }
}
