//! Relational academic catalog backed by SQLite.
//!
//! Holds the normalized faculty/university/publication/keyword tables and
//! answers the aggregate queries of the dashboard: keyword popularity,
//! top faculty per keyword, single-faculty lookup, and the photo URL update.

mod db;
mod query;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

pub use db::{FacultyRow, PublicationRow, SeedBatch, UniversityRow};
pub use query::{DEFAULT_MIN_YEAR, TOP_FACULTY_LIMIT};

/// How long a statement waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum RelationalError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("schema error: {0}")]
    Schema(String),
}

/// One row of the keyword popularity ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordPopularity {
    pub keyword: String,
    pub popularity: i64,
}

/// A faculty member ranked by citations of their publications for a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacultyRank {
    pub id: i64,
    pub name: String,
    pub photo_url: Option<String>,
    pub university: String,
    pub position: Option<String>,
    pub research_interest: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub total_citations: i64,
}

/// A single faculty record joined with its university name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacultyRecord {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
    pub research_interest: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub university: String,
}

/// Handle to an opened relational catalog database.
pub struct RelationalDatabase {
    conn: Connection,
    path: Option<PathBuf>,
}

impl RelationalDatabase {
    /// Open an existing, pre-populated database.
    ///
    /// Verifies that the core tables exist.
    pub fn open(path: &Path) -> Result<Self, RelationalError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;

        for table in ["faculty", "publication", "keyword", "university"] {
            if !db::table_exists(&conn, table)? {
                return Err(RelationalError::Schema(format!(
                    "missing table `{table}` in {}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a fresh in-memory database with the schema created and empty.
    pub fn open_in_memory() -> Result<Self, RelationalError> {
        let conn = Connection::open_in_memory()?;
        db::init_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Create the keyword-name index if it is missing. Returns `true` when
    /// the index was created by this call.
    pub fn ensure_keyword_index(&self) -> Result<bool, RelationalError> {
        db::ensure_keyword_index(&self.conn)
    }

    /// Insert a batch of rows in one transaction.
    pub fn seed(&self, batch: &SeedBatch) -> Result<(), RelationalError> {
        db::insert_batch(&self.conn, batch)
    }

    /// Keywords ranked by the number of distinct publications since `min_year`.
    pub fn top_keywords(
        &self,
        n: u32,
        min_year: i32,
    ) -> Result<Vec<KeywordPopularity>, RelationalError> {
        query::top_keywords(&self.conn, n, min_year)
    }

    /// All keyword names in ascending order.
    pub fn all_keywords(&self) -> Result<Vec<String>, RelationalError> {
        query::all_keywords(&self.conn)
    }

    /// The five faculty with the most citations on publications tagged `keyword`.
    pub fn top_faculty_by_keyword(&self, keyword: &str) -> Result<Vec<FacultyRank>, RelationalError> {
        query::top_faculty_by_keyword(&self.conn, keyword)
    }

    pub fn faculty_by_id(&self, id: i64) -> Result<Option<FacultyRecord>, RelationalError> {
        query::faculty_by_id(&self.conn, id)
    }

    /// Overwrite a faculty member's photo URL. Returns the number of rows changed.
    pub fn update_faculty_photo_url(&self, id: i64, url: &str) -> Result<usize, RelationalError> {
        query::update_faculty_photo_url(&self.conn, id, url)
    }

    /// Path the database was opened from, if on disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_database_without_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path).unwrap();

        match RelationalDatabase::open(&path) {
            Err(RelationalError::Schema(msg)) => assert!(msg.contains("faculty")),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected schema error"),
        }
    }

    #[test]
    fn open_accepts_initialized_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let conn = Connection::open(&path).unwrap();
            db::init_schema(&conn).unwrap();
        }

        let db = RelationalDatabase::open(&path).unwrap();
        assert_eq!(db.path(), Some(path.as_path()));
        assert!(db.all_keywords().unwrap().is_empty());
    }

    #[test]
    fn in_memory_database_has_no_path() {
        let db = RelationalDatabase::open_in_memory().unwrap();
        assert!(db.path().is_none());
    }
}
