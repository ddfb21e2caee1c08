//! Aggregation pipelines for the publication and faculty collections.
//!
//! Kept as pure builders so the stage layout can be checked without a server.

use mongodb::bson::{Document, doc};

/// Cap on rows returned by the publication ranking.
pub const TOP_PUBLICATIONS_LIMIT: i64 = 50;

/// Cap on rows returned by the university ranking.
pub const UNIVERSITIES_LIMIT: i64 = 50;

/// Distinct keyword names across all publications, ascending.
pub fn all_keywords() -> Vec<Document> {
    vec![
        doc! { "$unwind": "$keywords" },
        doc! { "$group": { "_id": "$keywords.name" } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

/// Most-cited publications carrying `keyword`. The identifier is projected out.
pub fn top_publications(keyword: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "keywords.name": keyword } },
        doc! { "$sort": { "numCitations": -1 } },
        doc! { "$limit": TOP_PUBLICATIONS_LIMIT },
        doc! { "$project": {
            "_id": 0,
            "title": 1,
            "venue": 1,
            "year": 1,
            "numCitations": 1,
        } },
    ]
}

/// Faculty counts per affiliation for faculty tagged with `keyword`.
pub fn universities_by_keyword(keyword: &str) -> Vec<Document> {
    vec![
        doc! { "$unwind": "$keywords" },
        doc! { "$match": { "keywords.name": keyword } },
        doc! { "$group": {
            "_id": "$affiliation.name",
            "totalCitations": { "$sum": "$numCitations" },
            "facultyCount": { "$sum": 1 },
        } },
        doc! { "$sort": { "facultyCount": -1 } },
        doc! { "$limit": UNIVERSITIES_LIMIT },
    ]
}

/// Publications of the faculty whose stored names are in `names`.
pub fn faculty_publications(names: &[String]) -> Vec<Document> {
    vec![
        doc! { "$match": { "name": { "$in": names } } },
        doc! { "$unwind": "$publications" },
        doc! { "$lookup": {
            "from": "publications",
            "localField": "publications",
            "foreignField": "id",
            "as": "pub_details",
        } },
        doc! { "$unwind": "$pub_details" },
        doc! { "$project": {
            "_id": 0,
            "faculty": "$name",
            "year": "$pub_details.year",
            "title": "$pub_details.title",
        } },
    ]
}
