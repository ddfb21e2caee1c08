use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use scholarboard_core::{ProfessorCards, PublicationRow};

use crate::models::{FacultyPublicationsRequest, KeywordQuery, UniversityRequest};
use crate::state::AppState;

pub async fn publications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeywordQuery>,
) -> Json<Vec<PublicationRow>> {
    Json(state.dashboard.publication_table(query.keyword.as_deref()).await)
}

/// 204 when the search button was not actually clicked.
pub async fn universities(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UniversityRequest>,
) -> Response {
    match state
        .dashboard
        .university_table(req.keyword.as_deref(), req.n_clicks)
        .await
    {
        Some(chart) => Json(chart).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn professors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeywordQuery>,
) -> Json<ProfessorCards> {
    Json(state.dashboard.professor_cards(query.keyword.as_deref()).await)
}

pub async fn faculty_publications(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FacultyPublicationsRequest>,
) -> Response {
    match state
        .dashboard
        .faculty_publications(req.names.as_deref(), req.n_clicks)
        .await
    {
        Some(result) => Json(result).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
