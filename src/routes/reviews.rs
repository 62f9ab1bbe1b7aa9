use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, AppResult},
    models::{MAX_REVIEW_TEXT_LEN, PageParams, ReviewWrite},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReview {
    pub movie_id: i32,
    pub rating: i32,
    pub review_text: Option<String>,
}

/// Create or replace the caller's review. Validation runs before any store
/// access; the movie existence check and the write are two separate store
/// calls with an accepted race window (a movie deleted in between surfaces
/// as an internal error, not a second review).
pub async fn submit(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    payload: Result<Json<SubmitReview>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    // A malformed body (say, a fractional rating) is a validation failure,
    // not a transport-level 422.
    let Json(req) = payload.map_err(|e| ApiError::validation(e.body_text()))?;

    if !(1..=5).contains(&req.rating) {
        return Err(ApiError::validation("rating must be between 1 and 5"));
    }
    if let Some(text) = &req.review_text {
        if text.chars().count() > MAX_REVIEW_TEXT_LEN {
            return Err(ApiError::validation(format!(
                "review text must be at most {MAX_REVIEW_TEXT_LEN} characters"
            )));
        }
    }

    state.catalog.get(req.movie_id).await?.ok_or(ApiError::NotFound("movie"))?;

    let outcome =
        state.reviews.upsert(req.movie_id, user.user_id, req.rating, req.review_text).await?;

    Ok(match outcome {
        ReviewWrite::Created => {
            (StatusCode::CREATED, Json(json!({ "message": "review created" })))
        }
        ReviewWrite::Updated => (StatusCode::OK, Json(json!({ "message": "review updated" }))),
    })
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(movie_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.reviews.delete(movie_id, user.user_id).await?;
    Ok(Json(json!({ "message": "review deleted" })))
}

pub async fn for_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(state.reviews.for_movie(movie_id, &page).await?))
}

pub async fn for_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(state.reviews.for_user(user_id, &page).await?))
}

pub async fn user_review(
    State(state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(i32, i32)>,
) -> AppResult<impl IntoResponse> {
    let review = state.reviews.find(movie_id, user_id).await?;
    Ok(Json(json!({ "review": review })))
}
