use std::sync::{Arc, Mutex};

use scholarboard_relational::{RelationalDatabase, RelationalError};

use super::{Catalog, CatalogError, CatalogFuture, RelationalCatalog, StoreKind};
use crate::{Faculty, FacultyId, FacultyRank, KeywordPopularity};

/// Relational catalog backed by a local SQLite database.
///
/// `rusqlite` is synchronous, so every call runs on the blocking pool.
pub struct SqliteCatalog {
    pub db: Arc<Mutex<RelationalDatabase>>,
}

impl SqliteCatalog {
    pub fn new(db: RelationalDatabase) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    fn run<T, F>(&self, f: F) -> CatalogFuture<'static, T>
    where
        T: Send + 'static,
        F: FnOnce(&RelationalDatabase) -> Result<T, RelationalError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let db = db
                    .lock()
                    .map_err(|e| CatalogError::unavailable(StoreKind::Relational, e.to_string()))?;
                f(&db).map_err(CatalogError::from)
            })
            .await
            .map_err(|e| CatalogError::unavailable(StoreKind::Relational, e.to_string()))?
        })
    }
}

impl Catalog for SqliteCatalog {
    fn store(&self) -> StoreKind {
        StoreKind::Relational
    }
}

impl RelationalCatalog for SqliteCatalog {
    fn top_keywords(&self, n: u32, min_year: i32) -> CatalogFuture<'_, Vec<KeywordPopularity>> {
        self.run(move |db| {
            Ok(db
                .top_keywords(n, min_year)?
                .into_iter()
                .map(|k| KeywordPopularity {
                    keyword: k.keyword,
                    popularity: k.popularity,
                })
                .collect())
        })
    }

    fn all_keywords(&self) -> CatalogFuture<'_, Vec<String>> {
        self.run(|db| db.all_keywords())
    }

    fn top_faculty_by_keyword<'a>(
        &'a self,
        keyword: &'a str,
    ) -> CatalogFuture<'a, Vec<FacultyRank>> {
        let keyword = keyword.to_string();
        self.run(move |db| {
            Ok(db
                .top_faculty_by_keyword(&keyword)?
                .into_iter()
                .map(|f| FacultyRank {
                    id: FacultyId(f.id),
                    name: f.name,
                    photo_url: f.photo_url,
                    university: f.university,
                    position: f.position,
                    research_interest: f.research_interest,
                    email: f.email,
                    phone: f.phone,
                    total_citations: f.total_citations,
                })
                .collect())
        })
    }

    fn faculty_by_id(&self, id: FacultyId) -> CatalogFuture<'_, Option<Faculty>> {
        self.run(move |db| {
            Ok(db.faculty_by_id(id.0)?.map(|f| Faculty {
                id: FacultyId(f.id),
                name: f.name,
                position: f.position,
                research_interest: f.research_interest,
                email: f.email,
                phone: f.phone,
                photo_url: f.photo_url,
                university: f.university,
            }))
        })
    }

    fn update_faculty_photo_url<'a>(
        &'a self,
        id: FacultyId,
        url: &'a str,
    ) -> CatalogFuture<'a, bool> {
        let url = url.to_string();
        self.run(move |db| match db.update_faculty_photo_url(id.0, &url) {
            Ok(changed) => {
                if changed == 0 {
                    tracing::debug!(faculty_id = id.0, "photo update matched no faculty");
                }
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(faculty_id = id.0, error = %e, "photo update failed");
                Ok(false)
            }
        })
    }

    fn ensure_indexes(&self) -> CatalogFuture<'_, bool> {
        self.run(|db| db.ensure_keyword_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholarboard_relational::{FacultyRow, SeedBatch, UniversityRow};

    fn seeded() -> SqliteCatalog {
        let db = RelationalDatabase::open_in_memory().unwrap();
        let mut batch = SeedBatch::new();
        batch.universities.push(UniversityRow {
            id: 1,
            name: "George Mason University".into(),
        });
        batch.faculty.push(FacultyRow {
            id: 7,
            name: "Agouris,Peggy".into(),
            position: Some("Professor".into()),
            research_interest: None,
            email: None,
            phone: None,
            photo_url: None,
            university_id: 1,
        });
        db.seed(&batch).unwrap();
        SqliteCatalog::new(db)
    }

    #[tokio::test]
    async fn faculty_lookup_runs_on_blocking_pool() {
        let catalog = seeded();
        let faculty = catalog.faculty_by_id(FacultyId(7)).await.unwrap().unwrap();
        assert_eq!(faculty.name, "Agouris,Peggy");
        assert_eq!(faculty.university, "George Mason University");
        assert!(catalog.faculty_by_id(FacultyId(8)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn photo_update_is_visible_to_next_read() {
        let catalog = seeded();
        assert!(
            catalog
                .update_faculty_photo_url(FacultyId(7), "https://img.example.org/p.jpg")
                .await
                .unwrap()
        );
        let faculty = catalog.faculty_by_id(FacultyId(7)).await.unwrap().unwrap();
        assert_eq!(
            faculty.photo_url.as_deref(),
            Some("https://img.example.org/p.jpg")
        );
    }

    #[tokio::test]
    async fn index_bootstrap_is_idempotent() {
        let catalog = seeded();
        assert!(catalog.ensure_indexes().await.unwrap());
        assert!(!catalog.ensure_indexes().await.unwrap());
        assert_eq!(catalog.store(), StoreKind::Relational);
    }
}
