//! Aggregate queries over the relational catalog.

use rusqlite::{Connection, OptionalExtension, params};

use crate::{FacultyRank, FacultyRecord, KeywordPopularity, RelationalError};

/// Publications older than this year do not count towards keyword popularity.
pub const DEFAULT_MIN_YEAR: i32 = 2012;

/// Size of the top-faculty ranking.
pub const TOP_FACULTY_LIMIT: u32 = 5;

/// Count distinct publications per keyword since `min_year`, most popular first.
///
/// Ties are ordered by keyword name so repeated calls return the same rows.
/// The caller is responsible for keeping `n` in a sensible range.
pub fn top_keywords(
    conn: &Connection,
    n: u32,
    min_year: i32,
) -> Result<Vec<KeywordPopularity>, RelationalError> {
    let mut stmt = conn.prepare_cached(
        "SELECT k.name AS keyword, COUNT(DISTINCT pk.publication_id) AS popularity \
         FROM publication_keyword pk \
         JOIN publication p ON pk.publication_id = p.id \
         JOIN keyword k ON pk.keyword_id = k.id \
         WHERE p.year >= ?1 \
         GROUP BY k.name \
         ORDER BY popularity DESC, k.name ASC \
         LIMIT ?2",
    )?;

    let rows = stmt
        .query_map(params![min_year, i64::from(n)], |row| {
            Ok(KeywordPopularity {
                keyword: row.get(0)?,
                popularity: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn all_keywords(conn: &Connection) -> Result<Vec<String>, RelationalError> {
    let mut stmt = conn.prepare_cached("SELECT DISTINCT name FROM keyword ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Rank faculty by the summed citations of their publications tagged `keyword`.
pub fn top_faculty_by_keyword(
    conn: &Connection,
    keyword: &str,
) -> Result<Vec<FacultyRank>, RelationalError> {
    let mut stmt = conn.prepare_cached(
        "SELECT f.id, f.name, f.photo_url, u.name AS university, f.position, \
                f.research_interest, f.email, f.phone, \
                SUM(p.num_citations) AS total_citations \
         FROM faculty f \
         JOIN faculty_publication fp ON f.id = fp.faculty_id \
         JOIN publication p ON fp.publication_id = p.id \
         JOIN publication_keyword pk ON p.id = pk.publication_id \
         JOIN keyword k ON pk.keyword_id = k.id \
         JOIN university u ON f.university_id = u.id \
         WHERE k.name = ?1 \
         GROUP BY f.id \
         ORDER BY total_citations DESC, f.id ASC \
         LIMIT ?2",
    )?;

    let rows = stmt
        .query_map(params![keyword, i64::from(TOP_FACULTY_LIMIT)], |row| {
            Ok(FacultyRank {
                id: row.get(0)?,
                name: row.get(1)?,
                photo_url: row.get(2)?,
                university: row.get(3)?,
                position: row.get(4)?,
                research_interest: row.get(5)?,
                email: row.get(6)?,
                phone: row.get(7)?,
                total_citations: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn faculty_by_id(conn: &Connection, id: i64) -> Result<Option<FacultyRecord>, RelationalError> {
    let mut stmt = conn.prepare_cached(
        "SELECT f.id, f.name, f.position, f.research_interest, f.email, f.phone, f.photo_url, \
                u.name AS university \
         FROM faculty f \
         JOIN university u ON f.university_id = u.id \
         WHERE f.id = ?1",
    )?;

    let record = stmt
        .query_row(params![id], |row| {
            Ok(FacultyRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                position: row.get(2)?,
                research_interest: row.get(3)?,
                email: row.get(4)?,
                phone: row.get(5)?,
                photo_url: row.get(6)?,
                university: row.get(7)?,
            })
        })
        .optional()?;
    Ok(record)
}

pub fn update_faculty_photo_url(
    conn: &Connection,
    id: i64,
    url: &str,
) -> Result<usize, RelationalError> {
    let changed = conn.execute(
        "UPDATE faculty SET photo_url = ?1 WHERE id = ?2",
        params![url, id],
    )?;
    Ok(changed)
}
