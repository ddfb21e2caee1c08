//! Schema, index bootstrap and bulk seeding for the relational catalog.

use rusqlite::{Connection, OptionalExtension, params};

use crate::RelationalError;

const KEYWORD_INDEX: &str = "idx_keyword_name";

/// Create the catalog tables if they do not exist.
///
/// Production databases arrive pre-populated; this is used for fixtures and tests.
pub fn init_schema(conn: &Connection) -> Result<(), RelationalError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS university (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            photo_url TEXT
        );

        CREATE TABLE IF NOT EXISTS faculty (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            position TEXT,
            research_interest TEXT,
            email TEXT,
            phone TEXT,
            photo_url TEXT,
            university_id INTEGER REFERENCES university(id)
        );

        CREATE TABLE IF NOT EXISTS publication (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            venue TEXT,
            year INTEGER,
            num_citations INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS keyword (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS publication_keyword (
            publication_id INTEGER NOT NULL,
            keyword_id INTEGER NOT NULL,
            score REAL,
            PRIMARY KEY (publication_id, keyword_id)
        );

        CREATE TABLE IF NOT EXISTS faculty_publication (
            faculty_id INTEGER NOT NULL,
            publication_id INTEGER NOT NULL,
            PRIMARY KEY (faculty_id, publication_id)
        );

        CREATE TABLE IF NOT EXISTS faculty_keyword (
            faculty_id INTEGER NOT NULL,
            keyword_id INTEGER NOT NULL,
            score REAL,
            PRIMARY KEY (faculty_id, keyword_id)
        );
        "#,
    )?;
    Ok(())
}

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, RelationalError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Create `idx_keyword_name` on `keyword(name)` unless it already exists.
pub fn ensure_keyword_index(conn: &Connection) -> Result<bool, RelationalError> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name = ?1",
            params![KEYWORD_INDEX],
            |row| row.get(0),
        )
        .optional()?;

    if existing.is_some() {
        return Ok(false);
    }

    conn.execute_batch(&format!("CREATE INDEX {KEYWORD_INDEX} ON keyword(name);"))?;
    tracing::info!(index = KEYWORD_INDEX, "created keyword name index");
    Ok(true)
}

#[derive(Debug, Clone)]
pub struct UniversityRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct FacultyRow {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
    pub research_interest: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub university_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PublicationRow {
    pub id: i64,
    pub title: String,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub num_citations: i64,
}

/// Batch of rows to insert into the catalog.
#[derive(Debug, Default)]
pub struct SeedBatch {
    pub universities: Vec<UniversityRow>,
    pub faculty: Vec<FacultyRow>,
    pub publications: Vec<PublicationRow>,
    pub keywords: Vec<(i64, String)>,              // (id, name)
    pub publication_keywords: Vec<(i64, i64)>,     // (publication_id, keyword_id)
    pub faculty_publications: Vec<(i64, i64)>,     // (faculty_id, publication_id)
    pub faculty_keywords: Vec<(i64, i64)>,         // (faculty_id, keyword_id)
}

impl SeedBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.universities.is_empty()
            && self.faculty.is_empty()
            && self.publications.is_empty()
            && self.keywords.is_empty()
            && self.publication_keywords.is_empty()
            && self.faculty_publications.is_empty()
            && self.faculty_keywords.is_empty()
    }
}

/// Insert a batch using UPSERT semantics for entity rows and
/// insert-or-ignore for link rows.
pub fn insert_batch(conn: &Connection, batch: &SeedBatch) -> Result<(), RelationalError> {
    let tx = conn.unchecked_transaction()?;

    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO university (id, name) VALUES (?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )?;
        for u in &batch.universities {
            stmt.execute(params![u.id, u.name])?;
        }
    }

    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO faculty (id, name, position, research_interest, email, phone, photo_url, university_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, position = excluded.position, \
             research_interest = excluded.research_interest, email = excluded.email, \
             phone = excluded.phone, photo_url = excluded.photo_url, university_id = excluded.university_id",
        )?;
        for f in &batch.faculty {
            stmt.execute(params![
                f.id,
                f.name,
                f.position,
                f.research_interest,
                f.email,
                f.phone,
                f.photo_url,
                f.university_id
            ])?;
        }
    }

    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO publication (id, title, venue, year, num_citations) VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, venue = excluded.venue, \
             year = excluded.year, num_citations = excluded.num_citations",
        )?;
        for p in &batch.publications {
            stmt.execute(params![p.id, p.title, p.venue, p.year, p.num_citations])?;
        }
    }

    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO keyword (id, name) VALUES (?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )?;
        for (id, name) in &batch.keywords {
            stmt.execute(params![id, name])?;
        }
    }

    {
        let mut stmt = tx.prepare_cached(
            "INSERT OR IGNORE INTO publication_keyword (publication_id, keyword_id) VALUES (?1, ?2)",
        )?;
        for (publication_id, keyword_id) in &batch.publication_keywords {
            stmt.execute(params![publication_id, keyword_id])?;
        }
    }

    {
        let mut stmt = tx.prepare_cached(
            "INSERT OR IGNORE INTO faculty_publication (faculty_id, publication_id) VALUES (?1, ?2)",
        )?;
        for (faculty_id, publication_id) in &batch.faculty_publications {
            stmt.execute(params![faculty_id, publication_id])?;
        }
    }

    {
        let mut stmt = tx.prepare_cached(
            "INSERT OR IGNORE INTO faculty_keyword (faculty_id, keyword_id) VALUES (?1, ?2)",
        )?;
        for (faculty_id, keyword_id) in &batch.faculty_keywords {
            stmt.execute(params![faculty_id, keyword_id])?;
        }
    }

    tx.commit()?;
    Ok(())
}
