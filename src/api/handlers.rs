use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{RecommendationResponse, RecommendedItem, UserId},
};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    /// Maximum number of recommendations to return
    pub count: Option<usize>,
}

/// Handler for the recommendations endpoint
///
/// The id is validated before anything else runs: a malformed Steam ID must
/// be rejected without touching the roster file or issuing a network call.
pub async fn recommend(
    State(state): State<AppState>,
    Path(steam_id): Path<String>,
    Query(query): Query<RecommendQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let user = UserId::parse(&steam_id)?;
    let top_n = query.count.unwrap_or(state.default_top_n);

    let predictions = state.recommender.recommend(&user, top_n).await?;

    Ok(Json(RecommendationResponse {
        steam_id: user,
        generated_at: Utc::now(),
        recommendations: predictions.into_iter().map(RecommendedItem::from).collect(),
    }))
}
