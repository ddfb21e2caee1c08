use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use scholarboard_core::{
    CancelRequest, ProfessorEditForm, ProfessorEditTrigger, ProfessorSaveRequest,
    PublicationEditTrigger, PublicationSaveRequest, PublicationTarget, SaveOutcome,
};

use crate::models::{CancelResponse, OpenResponse};
use crate::state::{AppState, session_id};

pub async fn open_publication(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(trigger): Json<PublicationEditTrigger>,
) -> Response {
    let blank = match &trigger.target {
        PublicationTarget::Title(title) => title.trim().is_empty(),
        PublicationTarget::Id(id) => id.as_str().trim().is_empty(),
    };
    if blank {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Publication title or id is required" })),
        )
            .into_response();
    }

    let id = session_id(&headers);
    let form = {
        let session = state.session(&id);
        state
            .dashboard
            .open_publication_edit(&session, &trigger)
            .await
    };
    state.release_if_idle(&id);
    Json(OpenResponse::from(form)).into_response()
}

pub async fn save_publication(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<PublicationSaveRequest>,
) -> Json<SaveOutcome> {
    let id = session_id(&headers);
    let outcome = {
        let session = state.existing_session(&id).unwrap_or_default();
        state.dashboard.save_publication_edit(&session, &req).await
    };
    state.release_if_idle(&id);
    Json(outcome)
}

pub async fn cancel_publication(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CancelRequest>,
) -> Json<CancelResponse> {
    let id = session_id(&headers);
    let closed = {
        let session = state.existing_session(&id).unwrap_or_default();
        state.dashboard.cancel_publication_edit(&session, &req).await
    };
    state.release_if_idle(&id);
    Json(CancelResponse { closed })
}

pub async fn open_professor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(trigger): Json<ProfessorEditTrigger>,
) -> Json<OpenResponse<ProfessorEditForm>> {
    let id = session_id(&headers);
    let form = {
        let session = state.session(&id);
        state.dashboard.open_professor_edit(&session, &trigger).await
    };
    state.release_if_idle(&id);
    Json(OpenResponse::from(form))
}

pub async fn save_professor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ProfessorSaveRequest>,
) -> Json<SaveOutcome> {
    let id = session_id(&headers);
    let outcome = {
        let session = state.existing_session(&id).unwrap_or_default();
        state.dashboard.save_professor_edit(&session, &req).await
    };
    state.release_if_idle(&id);
    Json(outcome)
}

pub async fn cancel_professor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CancelRequest>,
) -> Json<CancelResponse> {
    let id = session_id(&headers);
    let closed = {
        let session = state.existing_session(&id).unwrap_or_default();
        state.dashboard.cancel_professor_edit(&session, &req).await
    };
    state.release_if_idle(&id);
    Json(CancelResponse { closed })
}
