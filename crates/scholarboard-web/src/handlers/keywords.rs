use axum::Json;
use axum::extract::{Query, State};
use std::sync::Arc;

use scholarboard_core::dashboard::DEFAULT_TOP_KEYWORDS;
use scholarboard_core::{ChartTable, KeywordPopularity, TrendPoint};

use crate::models::{PopularityQuery, TrendRequest};
use crate::state::AppState;

/// Keyword names for the relational-backed pickers.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.dashboard.keyword_options().await)
}

/// Keyword names for the publications table picker.
pub async fn publication_keywords(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.dashboard.publication_keyword_options().await)
}

pub async fn popularity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PopularityQuery>,
) -> Json<ChartTable<KeywordPopularity>> {
    let n = query.n.unwrap_or(DEFAULT_TOP_KEYWORDS);
    Json(state.dashboard.keyword_popularity(n).await)
}

pub async fn trend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TrendRequest>,
) -> Json<ChartTable<TrendPoint>> {
    Json(state.dashboard.keyword_trend(&req.keywords).await)
}
