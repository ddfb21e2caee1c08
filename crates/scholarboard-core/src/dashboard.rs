//! Dashboard orchestration: one handler per user action.
//!
//! Handlers never fail. Store errors and timeouts are logged and turned into
//! empty results or a `false` success flag.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use scholarboard_document::{DocumentDatabase, parse_faculty_names};
use scholarboard_graph::GraphDatabase;
use scholarboard_relational::RelationalDatabase;

use crate::catalog::{
    CatalogError, CatalogFuture, DocumentCatalog, GraphCatalog, MongoCatalog, Neo4jCatalog,
    RelationalCatalog, SqliteCatalog, StoreKind, with_timeout,
};
use crate::selection::{
    CancelRequest, ProfessorDraft, ProfessorEditTrigger, ProfessorSaveRequest, PublicationDraft,
    PublicationEditTrigger, PublicationSaveRequest, PublicationTarget, SelectionState,
    is_user_click,
};
use crate::{
    Config, CoreError, FacultyId, FacultyPublications, FacultyRank, FixtureCatalog,
    FixtureDataset, KeywordPopularity, PublicationId, PublicationRow, RejectedName, TrendPoint,
    UniversityCount,
};

pub const MIN_TOP_KEYWORDS: u32 = 5;
pub const MAX_TOP_KEYWORDS: u32 = 50;
pub const DEFAULT_TOP_KEYWORDS: u32 = 10;

const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Rows for a chart or table plus the title to show above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartTable<T> {
    pub title: String,
    pub rows: Vec<T>,
}

impl<T> ChartTable<T> {
    fn new(title: impl Into<String>, rows: Vec<T>) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }
}

/// Top professor cards, or the message shown instead of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessorCards {
    pub cards: Vec<FacultyRank>,
    pub message: Option<String>,
}

/// Contents of the publication edit dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationEditForm {
    pub id: PublicationId,
    pub title: String,
    pub venue: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "numCitations")]
    pub num_citations: i64,
    /// Another publication shares this title.
    pub ambiguous: bool,
}

/// Contents of the professor edit dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessorEditForm {
    pub id: FacultyId,
    pub name: String,
    pub research_interest: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    /// A store write was issued and accepted.
    pub saved: bool,
    /// Keyword whose view should be re-queried.
    pub refresh_keyword: Option<String>,
}

/// Clamp a requested keyword count to the slider range.
pub fn clamp_top_keywords(n: u32) -> u32 {
    n.clamp(MIN_TOP_KEYWORDS, MAX_TOP_KEYWORDS)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The orchestration layer over the three catalogs.
pub struct Dashboard {
    relational: Arc<dyn RelationalCatalog>,
    documents: Arc<dyn DocumentCatalog>,
    graph: Arc<dyn GraphCatalog>,
    store_timeout: Duration,
    min_year: i32,
}

impl Dashboard {
    pub fn new(
        relational: Arc<dyn RelationalCatalog>,
        documents: Arc<dyn DocumentCatalog>,
        graph: Arc<dyn GraphCatalog>,
    ) -> Self {
        Self {
            relational,
            documents,
            graph,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            min_year: scholarboard_relational::DEFAULT_MIN_YEAR,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_min_year(mut self, min_year: i32) -> Self {
        self.min_year = min_year;
        self
    }

    /// Serve every catalog from `dataset`.
    pub fn from_fixture(dataset: FixtureDataset) -> Result<Self, CoreError> {
        let relational = dataset.open_relational()?;
        let documents = FixtureCatalog::new(dataset);
        let graph = documents.graph();
        Ok(Self::new(
            Arc::new(SqliteCatalog::new(relational)),
            Arc::new(documents),
            Arc::new(graph),
        ))
    }

    /// Open the stores named by `config`, or its fixture when one is set.
    pub async fn connect(config: &Config) -> Result<Self, CoreError> {
        let dashboard = if let Some(path) = &config.fixture_path {
            tracing::info!(path = %path.display(), "serving from fixture dataset");
            Self::from_fixture(FixtureDataset::load(path)?)?
        } else {
            let sqlite_path = config.sqlite_path.as_ref().ok_or_else(|| {
                CoreError::Config(
                    "no relational database configured (set SCHOLARBOARD_SQLITE_PATH)".into(),
                )
            })?;
            let relational = RelationalDatabase::open(sqlite_path)?;
            tracing::info!(path = %sqlite_path.display(), "opened relational store");

            let documents = DocumentDatabase::connect(
                &config.mongodb_uri,
                &config.mongodb_database,
                config.store_timeout,
            )
            .await?;
            tracing::info!(database = %documents.database_name(), "connected to document store");

            let graph = GraphDatabase::connect(&config.graph_settings(), config.store_timeout).await?;

            Self::new(
                Arc::new(SqliteCatalog::new(relational)),
                Arc::new(MongoCatalog::new(documents)),
                Arc::new(Neo4jCatalog::new(graph)),
            )
        };
        Ok(dashboard
            .with_store_timeout(config.store_timeout)
            .with_min_year(config.min_year))
    }

    /// Create the store indexes the queries rely on. Safe to run on every start.
    pub async fn bootstrap_indexes(&self) {
        if let Ok(created) = self
            .call(StoreKind::Relational, "ensure_indexes", self.relational.ensure_indexes())
            .await
        {
            tracing::info!(created, "relational indexes ready");
        }
        if self
            .call(StoreKind::Document, "ensure_indexes", self.documents.ensure_indexes())
            .await
            .is_ok()
        {
            tracing::info!("document indexes ready");
        }
    }

    async fn call<T>(
        &self,
        store: StoreKind,
        operation: &'static str,
        fut: CatalogFuture<'_, T>,
    ) -> Result<T, CatalogError> {
        let result = with_timeout(store, self.store_timeout, fut).await;
        if let Err(e) = &result {
            tracing::warn!(operation, store = %e.store(), error = %e, "catalog call failed");
        }
        result
    }

    /// Keyword names for the pickers backed by the relational store.
    pub async fn keyword_options(&self) -> Vec<String> {
        self.call(StoreKind::Relational, "all_keywords", self.relational.all_keywords())
            .await
            .unwrap_or_default()
    }

    /// Keyword names spelled as the document store tags publications.
    pub async fn publication_keyword_options(&self) -> Vec<String> {
        self.call(StoreKind::Document, "all_keywords", self.documents.all_keywords())
            .await
            .unwrap_or_default()
    }

    pub async fn keyword_popularity(&self, n: u32) -> ChartTable<KeywordPopularity> {
        let n = clamp_top_keywords(n);
        let rows = self
            .call(
                StoreKind::Relational,
                "top_keywords",
                self.relational.top_keywords(n, self.min_year),
            )
            .await
            .unwrap_or_default();
        ChartTable::new(format!("Top {n} Keywords (Since {})", self.min_year), rows)
    }

    pub async fn keyword_trend(&self, keywords: &[String]) -> ChartTable<TrendPoint> {
        if keywords.is_empty() {
            return ChartTable::new("Select keyword(s) to display trends", vec![]);
        }
        let rows = self
            .call(StoreKind::Graph, "keyword_trend", self.graph.keyword_trend(keywords))
            .await
            .unwrap_or_default();
        if rows.is_empty() {
            return ChartTable::new("No data found for selected keywords", rows);
        }
        ChartTable::new("Keyword Trend Over Time", rows)
    }

    pub async fn publication_table(&self, keyword: Option<&str>) -> Vec<PublicationRow> {
        let Some(keyword) = non_blank(keyword) else {
            return vec![];
        };
        self.call(
            StoreKind::Document,
            "top_publications_by_keyword",
            self.documents.top_publications_by_keyword(keyword),
        )
        .await
        .unwrap_or_default()
    }

    /// `None` when the search was not a real click.
    pub async fn university_table(
        &self,
        keyword: Option<&str>,
        n_clicks: Option<u32>,
    ) -> Option<ChartTable<UniversityCount>> {
        if !is_user_click(n_clicks) {
            return None;
        }
        let Some(keyword) = non_blank(keyword) else {
            return Some(ChartTable::new("No keyword selected", vec![]));
        };
        let rows = self
            .call(
                StoreKind::Document,
                "universities_by_keyword",
                self.documents.universities_by_keyword(keyword),
            )
            .await
            .unwrap_or_default();
        if rows.is_empty() {
            return Some(ChartTable::new(format!("No results for '{keyword}'"), rows));
        }
        Some(ChartTable::new(format!("Faculty Count for '{keyword}'"), rows))
    }

    pub async fn professor_cards(&self, keyword: Option<&str>) -> ProfessorCards {
        let Some(keyword) = non_blank(keyword) else {
            return ProfessorCards {
                cards: vec![],
                message: Some("No keyword selected.".into()),
            };
        };
        let cards = self
            .call(
                StoreKind::Relational,
                "top_faculty_by_keyword",
                self.relational.top_faculty_by_keyword(keyword),
            )
            .await
            .unwrap_or_default();
        let message = cards.is_empty().then(|| "No professors found.".to_string());
        ProfessorCards { cards, message }
    }

    /// `None` when the search was not a real click.
    pub async fn faculty_publications(
        &self,
        names: Option<&str>,
        n_clicks: Option<u32>,
    ) -> Option<FacultyPublications> {
        if !is_user_click(n_clicks) {
            return None;
        }
        let Some(names) = non_blank(names) else {
            return Some(FacultyPublications::default());
        };
        let result = match self
            .call(
                StoreKind::Document,
                "publications_for_faculty",
                self.documents.publications_for_faculty(names),
            )
            .await
        {
            Ok(result) => result,
            // Name validation does not need the store.
            Err(_) => FacultyPublications {
                rows: Vec::new(),
                rejected: parse_faculty_names(names)
                    .rejected
                    .into_iter()
                    .map(RejectedName::from)
                    .collect(),
            },
        };
        if !result.rejected.is_empty() {
            tracing::info!(rejected = result.rejected.len(), "some faculty names were not First Last");
        }
        Some(result)
    }

    /// Resolve the trigger and open the publication dialog.
    ///
    /// Returns `None`, leaving the dialog as it was, for non-clicks and
    /// lookups that find nothing.
    pub async fn open_publication_edit(
        &self,
        state: &SelectionState,
        trigger: &PublicationEditTrigger,
    ) -> Option<PublicationEditForm> {
        if !is_user_click(trigger.n_clicks) {
            return None;
        }
        let (publication, ambiguous) = match &trigger.target {
            PublicationTarget::Title(title) => {
                let found = self
                    .call(
                        StoreKind::Document,
                        "publication_by_title",
                        self.documents.publication_by_title(title),
                    )
                    .await
                    .ok()
                    .flatten()?;
                let ambiguous = found.is_ambiguous();
                (found.publication, ambiguous)
            }
            PublicationTarget::Id(id) => {
                let found = self
                    .call(
                        StoreKind::Document,
                        "publication_by_id",
                        self.documents.publication_by_id(id),
                    )
                    .await
                    .ok()
                    .flatten()?;
                (found, false)
            }
        };

        state.publication().await.open(PublicationDraft {
            id: publication.id.clone(),
            title: publication.title.clone(),
            num_citations: publication.num_citations,
        });
        tracing::debug!(id = %publication.id, "publication edit opened");

        Some(PublicationEditForm {
            id: publication.id,
            title: publication.title,
            venue: publication.venue,
            year: publication.year,
            num_citations: publication.num_citations,
            ambiguous,
        })
    }

    /// Write the new citation count if it differs from the stored one.
    /// The dialog is closed whether or not anything was written.
    pub async fn save_publication_edit(
        &self,
        state: &SelectionState,
        request: &PublicationSaveRequest,
    ) -> SaveOutcome {
        if !is_user_click(request.n_clicks) {
            return SaveOutcome::default();
        }
        let Some(draft) = state.publication().await.take() else {
            return SaveOutcome::default();
        };
        let refresh_keyword = request.current_keyword.clone();
        let Some(new_count) = request.new_citations else {
            return SaveOutcome {
                saved: false,
                refresh_keyword,
            };
        };

        let stored = match self
            .call(
                StoreKind::Document,
                "publication_by_id",
                self.documents.publication_by_id(&draft.id),
            )
            .await
        {
            Ok(Some(p)) => p,
            Ok(None) => {
                tracing::info!(id = %draft.id, "publication disappeared before save");
                return SaveOutcome {
                    saved: false,
                    refresh_keyword,
                };
            }
            Err(_) => {
                return SaveOutcome {
                    saved: false,
                    refresh_keyword,
                };
            }
        };

        if stored.num_citations == new_count {
            tracing::debug!(id = %draft.id, "citation count unchanged");
            return SaveOutcome {
                saved: false,
                refresh_keyword,
            };
        }

        let saved = self
            .call(
                StoreKind::Document,
                "update_publication_citations",
                self.documents.update_publication_citations(&draft.id, new_count),
            )
            .await
            .unwrap_or(false);
        if saved {
            tracing::info!(
                id = %draft.id,
                old = stored.num_citations,
                new = new_count,
                "updated publication citations"
            );
        }
        SaveOutcome {
            saved,
            refresh_keyword,
        }
    }

    /// Close the publication dialog. Returns whether the click was honored.
    pub async fn cancel_publication_edit(
        &self,
        state: &SelectionState,
        request: &CancelRequest,
    ) -> bool {
        if !is_user_click(request.n_clicks) {
            return false;
        }
        state.publication().await.take();
        true
    }

    pub async fn open_professor_edit(
        &self,
        state: &SelectionState,
        trigger: &ProfessorEditTrigger,
    ) -> Option<ProfessorEditForm> {
        if !is_user_click(trigger.n_clicks) {
            return None;
        }
        let faculty = self
            .call(
                StoreKind::Relational,
                "faculty_by_id",
                self.relational.faculty_by_id(trigger.faculty_id),
            )
            .await
            .ok()
            .flatten()?;

        state.professor().await.open(ProfessorDraft {
            id: faculty.id,
            name: faculty.name.clone(),
            photo_url: faculty.photo_url.clone(),
        });
        tracing::debug!(faculty_id = %faculty.id, "professor edit opened");

        Some(ProfessorEditForm {
            id: faculty.id,
            name: faculty.name,
            research_interest: faculty.research_interest,
            photo_url: faculty.photo_url,
        })
    }

    /// Store the new photo URL when one was given. The dialog always closes.
    pub async fn save_professor_edit(
        &self,
        state: &SelectionState,
        request: &ProfessorSaveRequest,
    ) -> SaveOutcome {
        if !is_user_click(request.n_clicks) {
            return SaveOutcome::default();
        }
        let Some(draft) = state.professor().await.take() else {
            return SaveOutcome::default();
        };
        let Some(url) = non_blank(request.photo_url.as_deref()).map(str::trim) else {
            return SaveOutcome::default();
        };

        let saved = self
            .call(
                StoreKind::Relational,
                "update_faculty_photo_url",
                self.relational.update_faculty_photo_url(draft.id, url),
            )
            .await
            .unwrap_or(false);
        if saved {
            tracing::info!(faculty_id = %draft.id, "updated faculty photo url");
        }
        SaveOutcome {
            saved,
            refresh_keyword: request.current_keyword.clone(),
        }
    }

    pub async fn cancel_professor_edit(
        &self,
        state: &SelectionState,
        request: &CancelRequest,
    ) -> bool {
        if !is_user_click(request.n_clicks) {
            return false;
        }
        state.professor().await.take();
        true
    }
}
