//! Movie catalog routes: listing with search/filter, lookup, and the
//! guarded mutations

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use crate::database::models::{Movie, MovieInput};
use crate::database::store::{MovieFilter, MovieStore};
use crate::error::ApiError;
use crate::routes::parse_id;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive title substring
    pub q: Option<String>,
    /// Streaming provider filter
    pub provider: Option<String>,
}

/// GET /api/movies
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let filter = MovieFilter {
        q: query.q,
        provider: query.provider,
    };
    let movies = state.db.list_movies(&filter).await?;
    Ok(Json(movies))
}

/// GET /api/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Movie>, ApiError> {
    let movie = fetch_movie(state.db.as_ref(), &id).await?;
    Ok(Json(movie))
}

/// POST /api/movies
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<MovieInput>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = create_movie(state.db.as_ref(), input).await?;
    tracing::info!("created movie {} ({})", movie.title, movie.id);
    Ok((StatusCode::CREATED, Json(movie)))
}

/// PUT /api/movies/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MovieInput>,
) -> Result<Json<Movie>, ApiError> {
    let movie = update_movie(state.db.as_ref(), &id, input).await?;
    Ok(Json(movie))
}

/// DELETE /api/movies/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_movie(state.db.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_movie(store: &dyn MovieStore, id_raw: &str) -> Result<Movie, ApiError> {
    let id = parse_id(id_raw)?;
    store
        .get_movie(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("movie not found".to_string()))
}

async fn create_movie(store: &dyn MovieStore, input: MovieInput) -> Result<Movie, ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    Ok(store.create_movie(&input).await?)
}

async fn update_movie(
    store: &dyn MovieStore,
    id_raw: &str,
    input: MovieInput,
) -> Result<Movie, ApiError> {
    let id = parse_id(id_raw)?;
    input.validate().map_err(ApiError::Validation)?;
    store
        .update_movie(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound("movie not found".to_string()))
}

async fn delete_movie(store: &dyn MovieStore, id_raw: &str) -> Result<(), ApiError> {
    let id = parse_id(id_raw)?;
    if !store.delete_movie(id).await? {
        return Err(ApiError::NotFound("movie not found".to_string()));
    }
    Ok(())
}
