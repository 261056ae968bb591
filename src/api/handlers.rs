use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::engine::{SimilarFilm, SimilarityDebug, TrendingEntry, DEFAULT_GENRE_LIMIT};
use crate::error::{AppError, AppResult};
use crate::models::Film;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub success: bool,
    pub trending: Vec<TrendingEntry>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub success: bool,
    pub recommendations: Vec<Film>,
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub success: bool,
    pub similar: Vec<SimilarFilm>,
    pub total_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<SimilarityDebug>,
}

#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    pub limit: Option<i64>,
}

// Handlers

/// Current trending ranking, rebuilding a stale cache first
pub async fn trending(State(state): State<AppState>) -> AppResult<Json<TrendingResponse>> {
    let snapshot = state.engine.trending().await?;
    Ok(Json(TrendingResponse {
        success: true,
        trending: snapshot.entries.clone(),
        last_updated: snapshot.last_update,
    }))
}

/// Forces a trending-cache rebuild (admin-triggered)
pub async fn refresh_trending(
    State(state): State<AppState>,
) -> AppResult<Json<RefreshResponse>> {
    let snapshot = state.engine.refresh_trending().await?;
    Ok(Json(RefreshResponse {
        success: true,
        message: "Trending cache refreshed successfully".to_string(),
        last_updated: snapshot.last_update,
    }))
}

/// Personalized recommendations for a user
pub async fn personalized(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<RecommendationsResponse>> {
    let recommendations = state.engine.personalized(user_id).await?;
    Ok(Json(RecommendationsResponse {
        success: true,
        recommendations,
    }))
}

/// Most popular films for a genre
pub async fn by_genre(
    State(state): State<AppState>,
    Path(genre_id): Path<Uuid>,
    Query(query): Query<GenreQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_GENRE_LIMIT as i64);
    if limit < 1 {
        return Err(AppError::InvalidInput(format!(
            "limit must be a positive integer, got {limit}"
        )));
    }

    let recommendations = state
        .engine
        .recommendations_by_genre(genre_id, limit as usize)
        .await?;
    Ok(Json(RecommendationsResponse {
        success: true,
        recommendations,
    }))
}

/// Films similar to the given one
pub async fn similar(
    State(state): State<AppState>,
    Path(film_id): Path<Uuid>,
) -> AppResult<Json<SimilarResponse>> {
    let content = state.engine.similar(film_id, state.debug_responses).await?;
    let message = content
        .similar
        .is_empty()
        .then(|| "No similar content found".to_string());

    Ok(Json(SimilarResponse {
        success: true,
        total_found: content.similar.len(),
        similar: content.similar,
        message,
        debug: content.debug,
    }))
}
