use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    AppState,
    entities::movie,
    error::{ApiError, AppResult},
    models::{MovieListQuery, RatingSummary},
};

#[derive(Debug, Serialize)]
struct MovieDetail {
    #[serde(flatten)]
    movie: movie::Model,
    #[serde(flatten)]
    summary: RatingSummary,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MovieListQuery>,
) -> AppResult<Json<Value>> {
    let movies = state.catalog.list(&query).await?;
    Ok(Json(json!({ "movies": movies })))
}

/// Movie detail carries the derived rating aggregate, recomputed on every
/// fetch so it always reflects the latest review state.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    let movie = state.catalog.get(id).await?.ok_or(ApiError::NotFound("movie"))?;
    let summary = state.reviews.rating_summary(id).await?;
    Ok(Json(serde_json::to_value(MovieDetail { movie, summary }).map_err(anyhow::Error::new)?))
}

pub async fn genres(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let genres = state.catalog.genres().await?;
    Ok(Json(json!({ "genres": genres })))
}

pub async fn years(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let years = state.catalog.years().await?;
    Ok(Json(json!({ "years": years })))
}
