use serde::{Deserialize, Serialize};

// ── Requests ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PopularityQuery {
    pub n: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Search-button request carrying the button's click count.
#[derive(Debug, Deserialize)]
pub struct UniversityRequest {
    pub keyword: Option<String>,
    pub n_clicks: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct FacultyPublicationsRequest {
    pub names: Option<String>,
    pub n_clicks: Option<u32>,
}

// ── Responses ────────────────────────────────────────────────────────────

/// Result of an open-edit request. `form` is absent when nothing opened.
#[derive(Debug, Serialize)]
pub struct OpenResponse<T> {
    pub open: bool,
    pub form: Option<T>,
}

impl<T> From<Option<T>> for OpenResponse<T> {
    fn from(form: Option<T>) -> Self {
        Self {
            open: form.is_some(),
            form,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub closed: bool,
}
